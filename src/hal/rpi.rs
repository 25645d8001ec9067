//! Raspberry Pi hardware backend using `rppal`.
//!
//! PWM goes through the kernel's sysfs PWM interface (`/sys/class/pwm`), which
//! requires the `pwm-2chan` device tree overlay. GPIO goes through
//! `/dev/gpiomem`.
//!
//! # Hardware Setup
//!
//! | Resource | Default | Notes |
//! |----------|---------|-------|
//! | Light PWM | channel 0 @ 1000 Hz | GPIO18 with `pwm-2chan` |
//! | Motor step PWM | channel 1 @ 100 Hz | GPIO13 with `pwm-2chan,pin2=13,func2=4` |
//! | Motor enable | GPIO26 | active low |
//! | Direction | GPIO6 | active high |

use std::io;

use rppal::gpio::{self, Gpio, OutputPin};
use rppal::pwm::{self, Channel, Polarity, Pwm};

use crate::error::{AcquisitionError, AcquisitionErrorKind};
use crate::hal::{DigitalPin, PwmChannel, RetryPolicy};
use crate::traits::{Device, DigitalOutput, HardwareProvider, OutputLine, PwmDriver, PwmOutput};

fn pwm_io(err: pwm::Error) -> io::Error {
    match err {
        pwm::Error::Io(err) => err,
        other => io::Error::new(io::ErrorKind::Unsupported, other.to_string()),
    }
}

fn gpio_io(err: gpio::Error) -> io::Error {
    match err {
        gpio::Error::Io(err) => err,
        other => io::Error::new(io::ErrorKind::Other, other.to_string()),
    }
}

/// sysfs PWM channel driver.
pub struct RpiPwm(Pwm);

impl PwmDriver for RpiPwm {
    fn set_frequency(&mut self, frequency_hz: f64, duty_cycle: f64) -> io::Result<()> {
        self.0.set_frequency(frequency_hz, duty_cycle).map_err(pwm_io)
    }

    fn set_duty_cycle(&mut self, duty_cycle: f64) -> io::Result<()> {
        self.0.set_duty_cycle(duty_cycle).map_err(pwm_io)
    }

    fn enable(&mut self) -> io::Result<()> {
        self.0.enable().map_err(pwm_io)
    }

    fn disable(&mut self) -> io::Result<()> {
        self.0.disable().map_err(pwm_io)
    }
}

/// GPIO output line.
pub struct RpiLine(OutputPin);

impl OutputLine for RpiLine {
    fn set_level(&mut self, high: bool) -> io::Result<()> {
        if high {
            self.0.set_high();
        } else {
            self.0.set_low();
        }
        Ok(())
    }
}

/// Opens the rig's resources on a Raspberry Pi.
///
/// PWM exports are retried on the udev permission race according to the
/// configured [`RetryPolicy`]. GPIO lines are not retried.
pub struct RpiProvider {
    policy: RetryPolicy,
    gpio: Option<Gpio>,
}

impl RpiProvider {
    /// Create a provider. No hardware is touched until the first `open_*`.
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy, gpio: None }
    }

    fn gpio(&mut self) -> Result<&Gpio, io::Error> {
        if self.gpio.is_none() {
            self.gpio = Some(Gpio::new().map_err(gpio_io)?);
        }
        self.gpio
            .as_ref()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "gpio unavailable"))
    }
}

impl HardwareProvider for RpiProvider {
    fn open_pwm(
        &mut self,
        device: Device,
        channel: u8,
        frequency_hz: u32,
    ) -> Result<Box<dyn PwmOutput>, AcquisitionError> {
        let channel = match channel {
            0 => Channel::Pwm0,
            1 => Channel::Pwm1,
            other => {
                return Err(AcquisitionError::new(
                    device,
                    AcquisitionErrorKind::Unavailable(io::Error::new(
                        io::ErrorKind::InvalidInput,
                        format!("no PWM channel {}", other),
                    )),
                ))
            }
        };

        let pwm = PwmChannel::acquire(device, frequency_hz, self.policy, || {
            Pwm::with_frequency(
                channel,
                f64::from(frequency_hz),
                0.0,
                Polarity::Normal,
                false,
            )
            .map(RpiPwm)
            .map_err(pwm_io)
        })?;

        log::debug!("{} on PWM {:?} @ {} Hz", device, channel, frequency_hz);
        Ok(Box::new(pwm))
    }

    fn open_pin(
        &mut self,
        device: Device,
        pin: u8,
        active_high: bool,
    ) -> Result<Box<dyn DigitalOutput>, AcquisitionError> {
        let unavailable = move |err: io::Error| {
            AcquisitionError::new(device, AcquisitionErrorKind::Unavailable(err))
        };

        let gpio = self.gpio().map_err(unavailable)?;
        let raw = gpio.get(pin).map_err(gpio_io).map_err(unavailable)?;

        // Start at the logically-off level
        let output = if active_high {
            raw.into_output_low()
        } else {
            raw.into_output_high()
        };

        log::debug!(
            "{} on GPIO{} (active {})",
            device,
            pin,
            if active_high { "high" } else { "low" }
        );
        Ok(Box::new(DigitalPin::new(device, RpiLine(output), active_high)))
    }
}
