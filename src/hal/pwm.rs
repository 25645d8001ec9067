//! Hardware PWM channel with export-race handling.
//!
//! Exporting a sysfs PWM channel creates its attribute files owned by root.
//! A udev rule then fixes up their permissions, but asynchronously: the first
//! write after export can fail with `EACCES` even though the operation is
//! valid. [`acquire_with_retry`] masks that race and nothing else.
//!
//! Once a [`PwmChannel`] exists, its operations are plain pass-through writes.

use std::io;
use std::thread;
use std::time::Duration;

use crate::error::{AcquisitionError, AcquisitionErrorKind, ActuationError};
use crate::traits::{Device, PwmDriver, PwmOutput};

/// Bounded fixed-delay retry for the permission race.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Wait between attempts in milliseconds.
    pub delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            delay_ms: 100,
        }
    }
}

impl RetryPolicy {
    /// Create a policy.
    pub const fn new(max_attempts: u32, delay_ms: u64) -> Self {
        Self {
            max_attempts,
            delay_ms,
        }
    }

    /// Wait between attempts.
    #[inline]
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    /// Worst-case time spent sleeping before giving up.
    pub fn worst_case(&self) -> Duration {
        self.delay() * self.max_attempts.saturating_sub(1)
    }
}

/// Run `attempt` until it succeeds, fails with a non-race error, or the
/// policy runs out of attempts.
///
/// `attempt` receives the 1-based attempt number. Only
/// [`AcquisitionErrorKind::PermissionRace`] is retried; there is no sleep
/// after the final attempt.
pub fn acquire_with_retry<T, F>(
    device: Device,
    policy: RetryPolicy,
    mut attempt: F,
) -> Result<T, AcquisitionError>
where
    F: FnMut(u32) -> Result<T, AcquisitionErrorKind>,
{
    let max_attempts = policy.max_attempts.max(1);

    for n in 1..=max_attempts {
        match attempt(n) {
            Ok(value) => {
                if n > 1 {
                    log::info!("{} acquired after {} attempts", device, n);
                }
                return Ok(value);
            }
            Err(kind) if kind.is_permission_race() => {
                log::warn!(
                    "{} attempt {}/{}: {}",
                    device,
                    n,
                    max_attempts,
                    kind
                );
                if n < max_attempts {
                    thread::sleep(policy.delay());
                }
            }
            Err(kind) => return Err(AcquisitionError::new(device, kind)),
        }
    }

    Err(AcquisitionError::new(
        device,
        AcquisitionErrorKind::RetriesExhausted {
            attempts: max_attempts,
        },
    ))
}

/// One acquired PWM channel.
///
/// Tracks the last duty cycle so frequency changes can be written as a
/// single period-plus-duty update.
pub struct PwmChannel<D: PwmDriver> {
    device: Device,
    driver: D,
    duty_percent: u8,
    frequency_hz: u32,
}

impl<D: PwmDriver> PwmChannel<D> {
    /// Export and configure a channel.
    ///
    /// `open` performs one export-and-configure attempt and should leave the
    /// output disabled at `frequency_hz` with 0% duty. It is retried on
    /// `PermissionDenied` according to `policy`.
    pub fn acquire<F>(
        device: Device,
        frequency_hz: u32,
        policy: RetryPolicy,
        mut open: F,
    ) -> Result<Self, AcquisitionError>
    where
        F: FnMut() -> io::Result<D>,
    {
        let driver = acquire_with_retry(device, policy, |_| {
            open().map_err(AcquisitionErrorKind::from_io)
        })?;

        Ok(Self {
            device,
            driver,
            duty_percent: 0,
            frequency_hz,
        })
    }

    /// Last commanded duty cycle.
    #[inline]
    pub fn duty_percent(&self) -> u8 {
        self.duty_percent
    }

    /// Last commanded frequency.
    #[inline]
    pub fn frequency_hz(&self) -> u32 {
        self.frequency_hz
    }

    /// Borrow the underlying driver.
    #[inline]
    pub fn driver(&self) -> &D {
        &self.driver
    }

    fn fail(&self) -> impl FnOnce(io::Error) -> ActuationError {
        let device = self.device;
        move |err| ActuationError::new(device, err)
    }
}

#[inline]
fn fraction(duty_percent: u8) -> f64 {
    f64::from(duty_percent.min(100)) / 100.0
}

impl<D: PwmDriver> PwmOutput for PwmChannel<D> {
    fn start(&mut self, duty_percent: u8) -> Result<(), ActuationError> {
        self.driver
            .set_duty_cycle(fraction(duty_percent))
            .map_err(self.fail())?;
        self.duty_percent = duty_percent;
        self.driver.enable().map_err(self.fail())
    }

    fn stop(&mut self) -> Result<(), ActuationError> {
        self.driver.disable().map_err(self.fail())
    }

    fn change_duty_cycle(&mut self, duty_percent: u8) -> Result<(), ActuationError> {
        self.driver
            .set_duty_cycle(fraction(duty_percent))
            .map_err(self.fail())?;
        self.duty_percent = duty_percent;
        Ok(())
    }

    fn change_frequency(&mut self, frequency_hz: u32) -> Result<(), ActuationError> {
        self.driver
            .set_frequency(f64::from(frequency_hz), fraction(self.duty_percent))
            .map_err(self.fail())?;
        self.frequency_hz = frequency_hz;
        Ok(())
    }
}
