//! The rig: one actuator set plus the command entry points.
//!
//! A [`Rig`] is built once at startup and shared as `Arc<Rig>` with every
//! request handler. It is the only thing the front end needs from the core.
//!
//! # Example
//!
//! ```rust
//! use rigctl::{LightCommand, MotorCommand, Rig};
//!
//! let rig = Rig::simulated();
//! assert!(rig.backend_is_simulated());
//!
//! rig.apply_motor(MotorCommand::new(300).unwrap()).unwrap();
//! rig.apply_light(LightCommand::new(80).unwrap()).unwrap();
//!
//! let state = rig.state();
//! assert!(state.motor_enabled);
//! assert_eq!(state.motor_frequency_hz, 300);
//! assert_eq!(state.light_duty, 80);
//! ```

use crate::backend::{ActuatorSet, ActuatorState, BackendKind};
use crate::commands::{LightCommand, MotorCommand};
use crate::config::HardwareConfig;
use crate::controller::{LightController, MotorController};
use crate::error::ActuationError;
use crate::hal::{CallHistory, SimulatedBackend};
use crate::traits::HardwareProvider;

/// Shared handle to the rig's actuators.
pub struct Rig {
    actuators: ActuatorSet,
}

impl Rig {
    /// Wrap an existing actuator set.
    pub fn new(actuators: ActuatorSet) -> Self {
        Self { actuators }
    }

    /// Acquire the Raspberry Pi hardware, falling back to simulation.
    ///
    /// Blocks for up to the retry policy's worst case while the PWM export
    /// race settles.
    #[cfg(feature = "rpi")]
    pub fn from_config(config: &HardwareConfig) -> Self {
        let mut provider = crate::hal::RpiProvider::new(config.retry);
        Self::with_provider(&mut provider, config)
    }

    /// Without the `rpi` feature there is no hardware to acquire.
    #[cfg(not(feature = "rpi"))]
    pub fn from_config(_config: &HardwareConfig) -> Self {
        log::warn!("built without `rpi` support, using simulated backend");
        Self::simulated()
    }

    /// Acquire through an arbitrary provider, falling back to simulation.
    pub fn with_provider<P: HardwareProvider + ?Sized>(
        provider: &mut P,
        config: &HardwareConfig,
    ) -> Self {
        Self::new(ActuatorSet::connect(provider, config))
    }

    /// A rig on a fresh simulated backend.
    pub fn simulated() -> Self {
        Self::new(ActuatorSet::simulated(SimulatedBackend::new()))
    }

    /// Apply a motor command.
    pub fn apply_motor(&self, cmd: MotorCommand) -> Result<(), ActuationError> {
        MotorController::new(&self.actuators).apply(cmd)
    }

    /// Apply a light command.
    pub fn apply_light(&self, cmd: LightCommand) -> Result<(), ActuationError> {
        LightController::new(&self.actuators).apply(cmd)
    }

    /// Restart the motor at its last commanded speed and direction.
    ///
    /// Uses the default frequency if the motor has never been given one.
    /// The last state is read and the sequence issued under one hold of the
    /// motor lock.
    pub fn resume_motor(&self) -> Result<MotorCommand, ActuationError> {
        self.actuators.with_motor(|motor| {
            let state = motor.state();
            let cmd = match state.frequency_hz {
                0 => MotorCommand::default(),
                hz => MotorCommand::new(state.direction.signum() as i64 * hz as i64)
                    .unwrap_or_default(),
            };
            MotorController::drive(motor, cmd)?;
            Ok(cmd)
        })
    }

    /// Whether the rig fell back to (or was built on) the simulated backend.
    #[inline]
    pub fn backend_is_simulated(&self) -> bool {
        self.actuators.is_simulated()
    }

    /// Which backend the rig runs on.
    #[inline]
    pub fn backend_kind(&self) -> BackendKind {
        self.actuators.kind()
    }

    /// Last commanded state.
    pub fn state(&self) -> ActuatorState {
        self.actuators.state()
    }

    /// Simulated call history, `None` on hardware.
    pub fn history(&self) -> Option<&CallHistory> {
        self.actuators.history()
    }

    /// The underlying actuator set.
    #[inline]
    pub fn actuators(&self) -> &ActuatorSet {
        &self.actuators
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::Direction;

    #[test]
    fn resume_without_history_uses_default() {
        let rig = Rig::simulated();
        let cmd = rig.resume_motor().unwrap();
        assert_eq!(cmd.frequency(), 200);
        assert!(rig.state().motor_enabled);
    }

    #[test]
    fn resume_after_stop_restores_speed_and_direction() {
        let rig = Rig::simulated();
        rig.apply_motor(MotorCommand::new(-640).unwrap()).unwrap();
        rig.apply_motor(MotorCommand::stop()).unwrap();
        assert!(!rig.state().motor_running);

        let cmd = rig.resume_motor().unwrap();
        assert_eq!(cmd.frequency(), -640);

        let state = rig.state();
        assert!(state.motor_running);
        assert!(state.motor_enabled);
        assert_eq!(state.direction, Direction::CounterClockwise);
    }

    #[cfg(not(feature = "rpi"))]
    #[test]
    fn from_config_without_rpi_is_simulated() {
        let rig = Rig::from_config(&HardwareConfig::default());
        assert!(rig.backend_is_simulated());
    }

    #[test]
    fn rig_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Rig>();
    }
}
