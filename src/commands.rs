//! Command types for the motor and light.
//!
//! Commands are transient values built once per request. Both constructors
//! validate their argument, so a [`MotorCommand`] or [`LightCommand`] that
//! reaches a controller is always in range.
//!
//! # Ranges
//!
//! | Command | Field | Accepted |
//! |---------|-------|----------|
//! | [`MotorCommand`] | `frequency` | `(-2000, 2000]` |
//! | [`LightCommand`] | `brightness` | `[0, 100]` |
//!
//! # Example
//!
//! ```rust
//! use rigctl::{Direction, LightCommand, MotorCommand};
//!
//! let cmd = MotorCommand::new(-500).unwrap();
//! assert_eq!(cmd.direction(), Direction::CounterClockwise);
//! assert_eq!(cmd.step_frequency_hz(), 500);
//!
//! assert!(MotorCommand::new(-2000).is_err());
//! assert!(MotorCommand::new(2000).is_ok());
//!
//! assert!(LightCommand::new(100).is_ok());
//! assert!(LightCommand::new(101).is_err());
//! ```

use crate::error::ValidationError;
use crate::traits::Direction;

/// Lowest accepted motor frequency is one above this.
pub const MOTOR_FREQUENCY_MIN_EXCLUSIVE: i32 = -2000;

/// Highest accepted motor frequency.
pub const MOTOR_FREQUENCY_MAX: i32 = 2000;

/// Highest accepted light brightness.
pub const BRIGHTNESS_MAX: u8 = 100;

/// Motor frequency used when a request omits it.
pub const DEFAULT_MOTOR_FREQUENCY: i32 = 200;

/// Light brightness used when a request omits it.
pub const DEFAULT_BRIGHTNESS: u8 = 10;

/// A validated motor command.
///
/// The sign encodes direction, the magnitude the step frequency in Hz, and
/// zero means stop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MotorCommand {
    frequency: i32,
}

impl MotorCommand {
    /// Validate a frequency into a command.
    ///
    /// Takes `i64` so the caller does not have to narrow untrusted input first.
    pub fn new(frequency: impl Into<i64>) -> Result<Self, ValidationError> {
        let frequency = frequency.into();
        if frequency <= MOTOR_FREQUENCY_MIN_EXCLUSIVE as i64
            || frequency > MOTOR_FREQUENCY_MAX as i64
        {
            return Err(ValidationError::FrequencyOutOfRange(frequency));
        }
        Ok(Self {
            frequency: frequency as i32,
        })
    }

    /// The canonical stop command.
    #[inline]
    pub const fn stop() -> Self {
        Self { frequency: 0 }
    }

    /// Signed frequency as given.
    #[inline]
    pub const fn frequency(&self) -> i32 {
        self.frequency
    }

    /// Returns true for the zero-frequency stop command.
    #[inline]
    pub const fn is_stop(&self) -> bool {
        self.frequency == 0
    }

    /// Direction encoded by the sign.
    #[inline]
    pub const fn direction(&self) -> Direction {
        Direction::from_frequency(self.frequency)
    }

    /// Frequency magnitude in Hz.
    #[inline]
    pub const fn step_frequency_hz(&self) -> u32 {
        self.frequency.unsigned_abs()
    }
}

impl Default for MotorCommand {
    fn default() -> Self {
        Self {
            frequency: DEFAULT_MOTOR_FREQUENCY,
        }
    }
}

impl TryFrom<i64> for MotorCommand {
    type Error = ValidationError;

    fn try_from(frequency: i64) -> Result<Self, Self::Error> {
        Self::new(frequency)
    }
}

/// A validated light command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LightCommand {
    brightness: u8,
}

impl LightCommand {
    /// Validate a brightness percentage into a command.
    pub fn new(brightness: impl Into<i64>) -> Result<Self, ValidationError> {
        let brightness = brightness.into();
        if !(0..=BRIGHTNESS_MAX as i64).contains(&brightness) {
            return Err(ValidationError::BrightnessOutOfRange(brightness));
        }
        Ok(Self {
            brightness: brightness as u8,
        })
    }

    /// Brightness as a duty-cycle percentage.
    #[inline]
    pub const fn brightness(&self) -> u8 {
        self.brightness
    }
}

impl Default for LightCommand {
    fn default() -> Self {
        Self {
            brightness: DEFAULT_BRIGHTNESS,
        }
    }
}

impl TryFrom<i64> for LightCommand {
    type Error = ValidationError;

    fn try_from(brightness: i64) -> Result<Self, Self::Error> {
        Self::new(brightness)
    }
}
