//! The actuator set and backend construction.
//!
//! An [`ActuatorSet`] is the rig's four actuators behind two locks: the motor
//! group (step PWM, enable line, direction line) and the light channel. The
//! command layer only ever talks to an `ActuatorSet`; whether the devices
//! inside are physical or simulated is decided once, in [`ActuatorSet::connect`].
//!
//! # Construction
//!
//! ```text
//! connect(provider, config)
//!   ├─ HardwareBackend::acquire
//!   │    ├─ open light PWM     ─┐
//!   │    ├─ open motor PWM      │ any failure abandons the lot
//!   │    ├─ open enable pin     │
//!   │    ├─ open direction pin ─┘
//!   │    └─ rest state: enable off, motor stop, light start(default duty)
//!   └─ on error: log, substitute SimulatedBackend
//! ```

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::config::HardwareConfig;
use crate::error::{AcquisitionError, AcquisitionErrorKind, ActuationError};
use crate::hal::{CallHistory, SimulatedBackend};
use crate::traits::{Device, DigitalOutput, Direction, HardwareProvider, PwmOutput};

/// Which backend an [`ActuatorSet`] was built on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum BackendKind {
    /// Real PWM channels and GPIO lines.
    Physical,
    /// Logging pseudo-devices.
    Simulated,
}

/// Last commanded state of the motor group.
///
/// Never read back from hardware; this is what was written, nothing more.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MotorState {
    /// Enable line asserted.
    pub enabled: bool,
    /// Direction line state.
    pub direction: Direction,
    /// Step PWM running.
    pub running: bool,
    /// Last step frequency written, 0 if never set.
    pub frequency_hz: u32,
}

/// Snapshot of everything the rig was last told to do.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActuatorState {
    /// Motor enable line asserted.
    pub motor_enabled: bool,
    /// Motor direction.
    pub direction: Direction,
    /// Motor step PWM running.
    pub motor_running: bool,
    /// Last motor step frequency in Hz.
    pub motor_frequency_hz: u32,
    /// Light duty cycle in percent.
    pub light_duty: u8,
}

impl ActuatorState {
    /// Signed frequency equivalent to the current motor state.
    ///
    /// Zero when the motor is not both running and enabled.
    pub fn signed_frequency(&self) -> i32 {
        if self.motor_enabled && self.motor_running {
            self.direction.signum() * self.motor_frequency_hz as i32
        } else {
            0
        }
    }
}

/// Step PWM, enable line, and direction line, locked together.
///
/// Each primitive updates [`MotorState`] only after the write succeeds.
pub struct MotorGroup {
    pwm: Box<dyn PwmOutput>,
    enable: Box<dyn DigitalOutput>,
    direction: Box<dyn DigitalOutput>,
    state: MotorState,
}

impl MotorGroup {
    /// Drive the direction line.
    pub fn set_direction(&mut self, direction: Direction) -> Result<(), ActuationError> {
        match direction {
            Direction::CounterClockwise => self.direction.on()?,
            Direction::Clockwise => self.direction.off()?,
        }
        self.state.direction = direction;
        Ok(())
    }

    /// Start the step PWM.
    pub fn start(&mut self, duty_percent: u8) -> Result<(), ActuationError> {
        self.pwm.start(duty_percent)?;
        self.state.running = true;
        Ok(())
    }

    /// Stop the step PWM.
    ///
    /// If the channel refuses to stop, its duty cycle is dropped to zero,
    /// which also ends the step pulses. The stop error is still returned.
    pub fn stop(&mut self) -> Result<(), ActuationError> {
        let result = self.pwm.stop();
        if result.is_err() && self.pwm.change_duty_cycle(0).is_err() {
            return result;
        }
        self.state.running = false;
        result
    }

    /// Set the step frequency.
    pub fn set_frequency(&mut self, frequency_hz: u32) -> Result<(), ActuationError> {
        self.pwm.change_frequency(frequency_hz)?;
        self.state.frequency_hz = frequency_hz;
        Ok(())
    }

    /// Assert the enable line.
    pub fn enable(&mut self) -> Result<(), ActuationError> {
        self.enable.on()?;
        self.state.enabled = true;
        Ok(())
    }

    /// De-assert the enable line.
    pub fn disable(&mut self) -> Result<(), ActuationError> {
        self.enable.off()?;
        self.state.enabled = false;
        Ok(())
    }

    /// Last commanded state.
    #[inline]
    pub fn state(&self) -> MotorState {
        self.state
    }

    /// Run sequence: direction, PWM start, frequency, then enable.
    ///
    /// On failure the group is settled before the error is returned.
    pub fn run(
        &mut self,
        direction: Direction,
        duty_percent: u8,
        frequency_hz: u32,
    ) -> Result<(), ActuationError> {
        let result = self
            .set_direction(direction)
            .and_then(|()| self.start(duty_percent))
            .and_then(|()| self.set_frequency(frequency_hz))
            .and_then(|()| self.enable());
        self.settle(result)
    }

    /// Stop sequence: enable off, then PWM stop. Direction is left alone.
    ///
    /// On failure the group is settled before the error is returned.
    pub fn halt(&mut self) -> Result<(), ActuationError> {
        let result = self.disable().and_then(|()| self.stop());
        self.settle(result)
    }

    /// After a failed sequence, leave the group disabled and stopped.
    ///
    /// If the enable line cannot be released the step PWM is left running,
    /// so an asserted enable never sits on a stopped or half-configured
    /// channel.
    fn settle(&mut self, result: Result<(), ActuationError>) -> Result<(), ActuationError> {
        if let Err(err) = &result {
            log::error!("motor sequence failed, disabling: {}", err);
            if let Err(err) = self.disable() {
                log::error!("{}", err);
            }
            if !self.state.enabled {
                if let Err(err) = self.stop() {
                    log::error!("{}", err);
                }
            }
        }
        result
    }
}

/// The light dimmer PWM channel.
pub struct LightChannel {
    pwm: Box<dyn PwmOutput>,
    duty: u8,
}

impl LightChannel {
    /// Start the channel at a duty cycle.
    pub fn start(&mut self, duty_percent: u8) -> Result<(), ActuationError> {
        self.pwm.start(duty_percent)?;
        self.duty = duty_percent;
        Ok(())
    }

    /// Change the duty cycle.
    pub fn set_duty_cycle(&mut self, duty_percent: u8) -> Result<(), ActuationError> {
        self.pwm.change_duty_cycle(duty_percent)?;
        self.duty = duty_percent;
        Ok(())
    }

    /// Last commanded duty cycle.
    #[inline]
    pub fn duty(&self) -> u8 {
        self.duty
    }
}

/// The rig's actuators, shared across request handlers.
///
/// # Thread Safety
///
/// - The motor group and the light channel have separate locks, so a light
///   change never waits behind a motor command and vice versa.
/// - A poisoned lock is recovered: the guarded state is only ever written
///   after a successful primitive, so it is still what was last commanded.
pub struct ActuatorSet {
    kind: BackendKind,
    motor: Mutex<MotorGroup>,
    light: Mutex<LightChannel>,
    history: Option<CallHistory>,
}

impl ActuatorSet {
    /// Assemble an actuator set from already-acquired devices.
    pub fn new(
        kind: BackendKind,
        light: Box<dyn PwmOutput>,
        motor: Box<dyn PwmOutput>,
        motor_enable: Box<dyn DigitalOutput>,
        direction: Box<dyn DigitalOutput>,
    ) -> Self {
        Self {
            kind,
            motor: Mutex::new(MotorGroup {
                pwm: motor,
                enable: motor_enable,
                direction,
                state: MotorState::default(),
            }),
            light: Mutex::new(LightChannel {
                pwm: light,
                duty: 0,
            }),
            history: None,
        }
    }

    /// An actuator set of pseudo-devices recording into the backend's history.
    pub fn simulated(backend: SimulatedBackend) -> Self {
        let mut set = Self::new(
            BackendKind::Simulated,
            Box::new(backend.device(Device::Light)),
            Box::new(backend.device(Device::Motor)),
            Box::new(backend.device(Device::MotorEnable)),
            Box::new(backend.device(Device::Direction)),
        );
        set.history = Some(backend.history().clone());
        set
    }

    /// Acquire hardware through `provider`, falling back to simulation.
    ///
    /// The result is either fully physical or fully simulated. Acquisition
    /// failures are logged here and not returned.
    pub fn connect<P: HardwareProvider + ?Sized>(
        provider: &mut P,
        config: &HardwareConfig,
    ) -> Self {
        match HardwareBackend::acquire(provider, config) {
            Ok(set) => {
                log::info!("hardware backend ready");
                set
            }
            Err(err) => {
                log::error!("{}", err);
                log::warn!("no usable hardware, falling back to simulated backend");
                Self::simulated(SimulatedBackend::new())
            }
        }
    }

    /// Which backend this set runs on.
    #[inline]
    pub fn kind(&self) -> BackendKind {
        self.kind
    }

    /// Returns true when running on pseudo-devices.
    #[inline]
    pub fn is_simulated(&self) -> bool {
        self.kind == BackendKind::Simulated
    }

    /// Call history of the simulated backend, `None` on hardware.
    #[inline]
    pub fn history(&self) -> Option<&CallHistory> {
        self.history.as_ref()
    }

    /// Lock the motor group for the duration of `f`.
    pub fn with_motor<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&mut MotorGroup) -> R,
    {
        let mut guard = lock(&self.motor);
        f(&mut guard)
    }

    /// Lock the light channel for the duration of `f`.
    pub fn with_light<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&mut LightChannel) -> R,
    {
        let mut guard = lock(&self.light);
        f(&mut guard)
    }

    /// Snapshot of the last commanded state.
    ///
    /// The two groups are read under their own locks, one after the other.
    pub fn state(&self) -> ActuatorState {
        let motor = lock(&self.motor).state();
        let light_duty = lock(&self.light).duty();
        ActuatorState {
            motor_enabled: motor.enabled,
            direction: motor.direction,
            motor_running: motor.running,
            motor_frequency_hz: motor.frequency_hz,
            light_duty,
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl From<ActuationError> for AcquisitionError {
    fn from(err: ActuationError) -> Self {
        AcquisitionError::new(err.device, AcquisitionErrorKind::Unavailable(err.source))
    }
}

/// One-shot acquisition of the physical actuator set.
pub struct HardwareBackend;

impl HardwareBackend {
    /// Acquire all four resources and put them in the rest state.
    ///
    /// Returns the first error; anything acquired before it is dropped.
    pub fn acquire<P: HardwareProvider + ?Sized>(
        provider: &mut P,
        config: &HardwareConfig,
    ) -> Result<ActuatorSet, AcquisitionError> {
        let light = provider.open_pwm(
            Device::Light,
            config.light_channel,
            config.light_frequency_hz,
        )?;
        let motor = provider.open_pwm(
            Device::Motor,
            config.motor_channel,
            config.motor_frequency_hz,
        )?;
        let motor_enable = provider.open_pin(
            Device::MotorEnable,
            config.motor_enable_pin,
            config.motor_enable_active_high,
        )?;
        let direction = provider.open_pin(
            Device::Direction,
            config.direction_pin,
            config.direction_active_high,
        )?;

        let set = ActuatorSet::new(BackendKind::Physical, light, motor, motor_enable, direction);

        set.with_motor(MotorGroup::halt)?;
        set.with_light(|light| light.start(config.light_default_duty))?;

        Ok(set)
    }
}
