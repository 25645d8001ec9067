//! Hardware abstraction traits for PWM channels, GPIO outputs, and resource acquisition.
//!
//! This module defines the capability set the command layer is written against.
//! Both the physical Raspberry Pi backend and the simulated backend implement
//! these traits, so [`MotorController`] and [`LightController`] never know which
//! one they are driving.
//!
//! # Key Traits
//!
//! | Trait | Purpose |
//! |-------|---------|
//! | [`PwmOutput`] | Start/stop a PWM channel, change duty cycle and frequency |
//! | [`DigitalOutput`] | Logical on/off of a GPIO output line |
//! | [`OutputLine`] | Raw physical level of a GPIO line (polarity-unaware) |
//! | [`PwmDriver`] | Raw sysfs-style PWM channel writes |
//! | [`HardwareProvider`] | Opens channels and pins once at startup |
//!
//! # Example
//!
//! ```rust
//! use rigctl::traits::{DigitalOutput, PwmOutput};
//! use rigctl::hal::SimulatedBackend;
//!
//! let backend = SimulatedBackend::new();
//! let mut motor = backend.device(rigctl::Device::Motor);
//! motor.start(50).unwrap();
//! motor.change_frequency(500).unwrap();
//!
//! let calls = backend.history().calls();
//! assert_eq!(calls[0].to_string(), "motor.start(50)");
//! ```
//!
//! [`MotorController`]: crate::MotorController
//! [`LightController`]: crate::LightController

use std::io;

use crate::error::{AcquisitionError, ActuationError};

/// The four actuators of the rig.
///
/// Every PWM channel and GPIO line is addressed by exactly one of these for
/// the process lifetime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Device {
    /// Light dimmer PWM channel.
    Light,
    /// Motor step PWM channel.
    Motor,
    /// Motor driver enable line.
    MotorEnable,
    /// Motor driver direction line.
    Direction,
}

impl Device {
    /// All devices, in acquisition order.
    pub const ALL: [Device; 4] = [
        Device::Light,
        Device::Motor,
        Device::MotorEnable,
        Device::Direction,
    ];

    /// Returns the device name as used in logs and call history.
    ///
    /// ```
    /// use rigctl::Device;
    ///
    /// assert_eq!(Device::MotorEnable.as_str(), "motor_enable");
    /// ```
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Device::Light => "light",
            Device::Motor => "motor",
            Device::MotorEnable => "motor_enable",
            Device::Direction => "direction",
        }
    }
}

impl core::fmt::Display for Device {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rotation direction of the stepper motor.
///
/// The direction line is logically ON for counterclockwise and OFF for
/// clockwise.
///
/// # Default
///
/// Defaults to [`Clockwise`](Self::Clockwise), the state of a freshly
/// configured (logically off) direction line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Direction {
    /// Direction line off.
    #[default]
    Clockwise,
    /// Direction line on.
    CounterClockwise,
}

impl Direction {
    /// Direction encoded by the sign of a motor frequency.
    ///
    /// Zero counts as non-negative.
    ///
    /// ```
    /// use rigctl::Direction;
    ///
    /// assert_eq!(Direction::from_frequency(-1), Direction::CounterClockwise);
    /// assert_eq!(Direction::from_frequency(0), Direction::Clockwise);
    /// assert_eq!(Direction::from_frequency(500), Direction::Clockwise);
    /// ```
    #[inline]
    pub const fn from_frequency(frequency: i32) -> Self {
        if frequency < 0 {
            Direction::CounterClockwise
        } else {
            Direction::Clockwise
        }
    }

    /// Sign applied to a frequency magnitude for this direction.
    #[inline]
    pub const fn signum(&self) -> i32 {
        match self {
            Direction::Clockwise => 1,
            Direction::CounterClockwise => -1,
        }
    }

    /// Returns the direction as a lowercase string.
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Direction::Clockwise => "clockwise",
            Direction::CounterClockwise => "counter_clockwise",
        }
    }
}

/// A PWM output as seen by the command layer.
///
/// Duty cycles are whole percentages in `0..=100`; frequencies are positive
/// Hz. Implementations perform the I/O directly and never retry.
pub trait PwmOutput: Send {
    /// Start the output at the given duty cycle.
    fn start(&mut self, duty_percent: u8) -> Result<(), ActuationError>;

    /// Stop the output.
    fn stop(&mut self) -> Result<(), ActuationError>;

    /// Change the duty cycle without changing the running state.
    fn change_duty_cycle(&mut self, duty_percent: u8) -> Result<(), ActuationError>;

    /// Change the PWM frequency, keeping the current duty cycle.
    fn change_frequency(&mut self, frequency_hz: u32) -> Result<(), ActuationError>;
}

/// A GPIO output line in logical on/off terms.
///
/// Polarity is an implementation detail: callers never invert.
pub trait DigitalOutput: Send {
    /// Assert the line.
    fn on(&mut self) -> Result<(), ActuationError>;

    /// De-assert the line.
    fn off(&mut self) -> Result<(), ActuationError>;
}

/// Raw physical GPIO line.
///
/// `set_level(true)` drives the line high, regardless of what "on" means for
/// the device attached to it.
pub trait OutputLine: Send {
    /// Drive the line to the given electrical level.
    fn set_level(&mut self, high: bool) -> io::Result<()>;
}

/// Raw PWM channel writes, with duty cycle as a fraction in `0.0..=1.0`.
pub trait PwmDriver: Send {
    /// Set period and duty cycle together.
    fn set_frequency(&mut self, frequency_hz: f64, duty_cycle: f64) -> io::Result<()>;

    /// Set duty cycle, keeping the period.
    fn set_duty_cycle(&mut self, duty_cycle: f64) -> io::Result<()>;

    /// Enable the output.
    fn enable(&mut self) -> io::Result<()>;

    /// Disable the output.
    fn disable(&mut self) -> io::Result<()>;
}

/// Opens the rig's physical resources.
///
/// Called exactly once per resource during backend construction. A provider
/// is free to retry internally (the PWM export race does), but must return an
/// [`AcquisitionError`] rather than a half-configured handle.
pub trait HardwareProvider {
    /// Export and configure a PWM channel at the given frequency, output disabled.
    fn open_pwm(
        &mut self,
        device: Device,
        channel: u8,
        frequency_hz: u32,
    ) -> Result<Box<dyn PwmOutput>, AcquisitionError>;

    /// Configure a GPIO line as an output with the given polarity.
    fn open_pin(
        &mut self,
        device: Device,
        pin: u8,
        active_high: bool,
    ) -> Result<Box<dyn DigitalOutput>, AcquisitionError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // Direction Tests
    // =========================================================================

    #[test]
    fn direction_default_is_clockwise() {
        assert_eq!(Direction::default(), Direction::Clockwise);
    }

    #[test]
    fn direction_from_frequency_sign() {
        assert_eq!(Direction::from_frequency(-1999), Direction::CounterClockwise);
        assert_eq!(Direction::from_frequency(-1), Direction::CounterClockwise);
        assert_eq!(Direction::from_frequency(0), Direction::Clockwise);
        assert_eq!(Direction::from_frequency(1), Direction::Clockwise);
        assert_eq!(Direction::from_frequency(2000), Direction::Clockwise);
    }

    #[test]
    fn direction_signum() {
        assert_eq!(Direction::Clockwise.signum(), 1);
        assert_eq!(Direction::CounterClockwise.signum(), -1);
    }

    // =========================================================================
    // Device Tests
    // =========================================================================

    #[test]
    fn device_names() {
        assert_eq!(Device::Light.as_str(), "light");
        assert_eq!(Device::Motor.as_str(), "motor");
        assert_eq!(Device::MotorEnable.as_str(), "motor_enable");
        assert_eq!(Device::Direction.as_str(), "direction");
        assert_eq!(Device::Direction.to_string(), "direction");
    }

    #[test]
    fn device_all_in_acquisition_order() {
        assert_eq!(
            Device::ALL,
            [
                Device::Light,
                Device::Motor,
                Device::MotorEnable,
                Device::Direction
            ]
        );
    }
}
