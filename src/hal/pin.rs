//! GPIO output with configurable active polarity.
//!
//! Motor drivers commonly assert their enable input with a low signal. The
//! inversion lives here, set once at construction, so the command layer only
//! ever says `on()` or `off()`.

use crate::error::ActuationError;
use crate::traits::{Device, DigitalOutput, OutputLine};

/// One GPIO line configured as an output.
///
/// # Example
///
/// ```rust
/// use rigctl::hal::DigitalPin;
/// use rigctl::traits::{DigitalOutput, OutputLine};
/// use rigctl::Device;
///
/// struct Line(bool);
///
/// impl OutputLine for Line {
///     fn set_level(&mut self, high: bool) -> std::io::Result<()> {
///         self.0 = high;
///         Ok(())
///     }
/// }
///
/// // Active-low enable line
/// let mut enable = DigitalPin::new(Device::MotorEnable, Line(true), false);
/// enable.on().unwrap();
/// assert!(!enable.line().0);
/// ```
pub struct DigitalPin<L: OutputLine> {
    device: Device,
    line: L,
    active_high: bool,
    is_on: bool,
}

impl<L: OutputLine> DigitalPin<L> {
    /// Wrap an output line.
    ///
    /// The line is not driven until the first `on()`/`off()`.
    pub fn new(device: Device, line: L, active_high: bool) -> Self {
        Self {
            device,
            line,
            active_high,
            is_on: false,
        }
    }

    /// Whether logical on drives the line high.
    #[inline]
    pub fn is_active_high(&self) -> bool {
        self.active_high
    }

    /// Last logical state written.
    #[inline]
    pub fn is_on(&self) -> bool {
        self.is_on
    }

    /// Borrow the underlying line.
    #[inline]
    pub fn line(&self) -> &L {
        &self.line
    }

    fn drive(&mut self, on: bool) -> Result<(), ActuationError> {
        // XNOR: high when on and active-high, or off and active-low
        let high = on == self.active_high;
        self.line
            .set_level(high)
            .map_err(|err| ActuationError::new(self.device, err))?;
        self.is_on = on;
        Ok(())
    }
}

impl<L: OutputLine> DigitalOutput for DigitalPin<L> {
    fn on(&mut self) -> Result<(), ActuationError> {
        self.drive(true)
    }

    fn off(&mut self) -> Result<(), ActuationError> {
        self.drive(false)
    }
}
