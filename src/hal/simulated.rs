//! Simulated backend for running without hardware.
//!
//! Every pseudo-device call is logged and appended to a shared, bounded
//! [`CallHistory`]. Nothing can fail: simulated operations always return `Ok`.
//!
//! # Example
//!
//! ```rust
//! use rigctl::hal::{Call, Op, SimulatedBackend};
//! use rigctl::traits::DigitalOutput;
//! use rigctl::Device;
//!
//! let backend = SimulatedBackend::new();
//! let mut direction = backend.device(Device::Direction);
//! direction.on().unwrap();
//!
//! assert_eq!(
//!     backend.history().calls(),
//!     vec![Call::new(Device::Direction, Op::On)]
//! );
//! ```

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use heapless::HistoryBuffer;

use crate::error::ActuationError;
use crate::traits::{Device, DigitalOutput, PwmOutput};

/// Calls retained by a [`CallHistory`] before the oldest are evicted.
pub const HISTORY_CAPACITY: usize = 256;

/// Log target for simulated calls.
pub const LOG_TARGET: &str = "rigctl::simulated";

/// One primitive operation on a pseudo-device.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Op {
    /// Logical on.
    On,
    /// Logical off.
    Off,
    /// PWM start at a duty cycle.
    Start(u8),
    /// PWM stop.
    Stop,
    /// PWM frequency change.
    ChangeFrequency(u32),
    /// PWM duty cycle change.
    ChangeDutyCycle(u8),
}

/// A recorded pseudo-device call.
///
/// Displays as `device.op(args)`, e.g. `motor.change_frequency(500)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Call {
    /// Target device.
    pub device: Device,
    /// Operation performed.
    pub op: Op,
}

impl Call {
    /// Create a call record.
    pub const fn new(device: Device, op: Op) -> Self {
        Self { device, op }
    }
}

impl fmt::Display for Call {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.op {
            Op::On => write!(f, "{}.on()", self.device),
            Op::Off => write!(f, "{}.off()", self.device),
            Op::Start(duty) => write!(f, "{}.start({})", self.device, duty),
            Op::Stop => write!(f, "{}.stop()", self.device),
            Op::ChangeFrequency(hz) => write!(f, "{}.change_frequency({})", self.device, hz),
            Op::ChangeDutyCycle(duty) => {
                write!(f, "{}.change_duty_cycle({})", self.device, duty)
            }
        }
    }
}

/// Shared, bounded, ordered record of simulated calls.
///
/// Cloning shares the same underlying buffer.
#[derive(Clone, Default)]
pub struct CallHistory {
    inner: Arc<Mutex<HistoryBuffer<Call, HISTORY_CAPACITY>>>,
}

impl CallHistory {
    /// Create an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, call: Call) {
        log::info!(target: LOG_TARGET, "{}", call);
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .write(call);
    }

    /// Recorded calls, oldest first.
    pub fn calls(&self) -> Vec<Call> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .oldest_ordered()
            .copied()
            .collect()
    }

    /// Number of retained calls.
    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns true if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Forget all recorded calls.
    pub fn clear(&self) {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl fmt::Debug for CallHistory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.calls()).finish()
    }
}

/// A pseudo-device supporting both PWM and digital operations.
#[derive(Clone, Debug)]
pub struct SimulatedDevice {
    device: Device,
    history: CallHistory,
}

impl SimulatedDevice {
    /// Which device this stands in for.
    #[inline]
    pub fn device(&self) -> Device {
        self.device
    }

    fn record(&self, op: Op) -> Result<(), ActuationError> {
        self.history.record(Call::new(self.device, op));
        Ok(())
    }
}

impl PwmOutput for SimulatedDevice {
    fn start(&mut self, duty_percent: u8) -> Result<(), ActuationError> {
        self.record(Op::Start(duty_percent))
    }

    fn stop(&mut self) -> Result<(), ActuationError> {
        self.record(Op::Stop)
    }

    fn change_duty_cycle(&mut self, duty_percent: u8) -> Result<(), ActuationError> {
        self.record(Op::ChangeDutyCycle(duty_percent))
    }

    fn change_frequency(&mut self, frequency_hz: u32) -> Result<(), ActuationError> {
        self.record(Op::ChangeFrequency(frequency_hz))
    }
}

impl DigitalOutput for SimulatedDevice {
    fn on(&mut self) -> Result<(), ActuationError> {
        self.record(Op::On)
    }

    fn off(&mut self) -> Result<(), ActuationError> {
        self.record(Op::Off)
    }
}

/// Factory for the four pseudo-devices sharing one history.
#[derive(Clone, Debug, Default)]
pub struct SimulatedBackend {
    history: CallHistory,
}

impl SimulatedBackend {
    /// Create a backend with an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// A handle to one pseudo-device.
    pub fn device(&self, device: Device) -> SimulatedDevice {
        SimulatedDevice {
            device,
            history: self.history.clone(),
        }
    }

    /// The shared call history.
    #[inline]
    pub fn history(&self) -> &CallHistory {
        &self.history
    }
}
