//! Command interpretation: validated commands to backend primitives.
//!
//! # Motor Policy
//!
//! | Command | Sequence |
//! |---------|----------|
//! | `frequency == 0` | enable off, PWM stop (direction untouched) |
//! | `frequency < 0` | direction on, PWM start(50), PWM frequency `-f`, enable on |
//! | `frequency > 0` | direction off, PWM start(50), PWM frequency `f`, enable on |
//!
//! Enable is always the last step when starting and the first when stopping,
//! so the driver never sees enable without a defined step frequency. The whole
//! sequence runs under the motor-group lock.
//!
//! # Example
//!
//! ```rust
//! use rigctl::hal::SimulatedBackend;
//! use rigctl::{ActuatorSet, MotorCommand, MotorController};
//!
//! let actuators = ActuatorSet::simulated(SimulatedBackend::new());
//! let motor = MotorController::new(&actuators);
//!
//! motor.apply(MotorCommand::new(-500).unwrap()).unwrap();
//!
//! let log: Vec<String> = actuators
//!     .history()
//!     .unwrap()
//!     .calls()
//!     .iter()
//!     .map(|c| c.to_string())
//!     .collect();
//! assert_eq!(
//!     log,
//!     [
//!         "direction.on()",
//!         "motor.start(50)",
//!         "motor.change_frequency(500)",
//!         "motor_enable.on()",
//!     ]
//! );
//! ```

use crate::backend::{ActuatorSet, MotorGroup};
use crate::commands::{LightCommand, MotorCommand};
use crate::error::ActuationError;

/// Step PWM duty cycle while running.
///
/// The driver only reacts to edges, so any value strictly between 0 and 100
/// works.
pub const MOTOR_DUTY_PERCENT: u8 = 50;

/// Applies [`MotorCommand`]s to an actuator set.
#[derive(Clone, Copy)]
pub struct MotorController<'a> {
    actuators: &'a ActuatorSet,
}

impl<'a> MotorController<'a> {
    /// Create a controller over an actuator set.
    pub fn new(actuators: &'a ActuatorSet) -> Self {
        Self { actuators }
    }

    /// Apply a command atomically with respect to other motor commands.
    ///
    /// On error the motor is left disabled and stopped (or, if the enable
    /// line itself is stuck, still running) and the failing write is
    /// returned.
    pub fn apply(&self, cmd: MotorCommand) -> Result<(), ActuationError> {
        self.actuators.with_motor(|motor| Self::drive(motor, cmd))
    }

    /// Apply a command to an already-locked motor group.
    pub fn drive(motor: &mut MotorGroup, cmd: MotorCommand) -> Result<(), ActuationError> {
        log::debug!("motor command: frequency={}", cmd.frequency());

        if cmd.is_stop() {
            motor.halt()
        } else {
            motor.run(cmd.direction(), MOTOR_DUTY_PERCENT, cmd.step_frequency_hz())
        }
    }
}

/// Applies [`LightCommand`]s to an actuator set.
#[derive(Clone, Copy)]
pub struct LightController<'a> {
    actuators: &'a ActuatorSet,
}

impl<'a> LightController<'a> {
    /// Create a controller over an actuator set.
    pub fn new(actuators: &'a ActuatorSet) -> Self {
        Self { actuators }
    }

    /// Set the light duty cycle to the commanded brightness.
    pub fn apply(&self, cmd: LightCommand) -> Result<(), ActuationError> {
        log::debug!("light command: brightness={}", cmd.brightness());
        self.actuators
            .with_light(|light| light.set_duty_cycle(cmd.brightness()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::{Call, Op, SimulatedBackend};
    use crate::traits::{Device, Direction};

    fn simulated() -> ActuatorSet {
        ActuatorSet::simulated(SimulatedBackend::new())
    }

    fn calls(set: &ActuatorSet) -> Vec<Call> {
        set.history().unwrap().calls()
    }

    fn motor(freq: i32) -> MotorCommand {
        MotorCommand::new(freq).unwrap()
    }

    // =========================================================================
    // Motor Sequence Tests
    // =========================================================================

    #[test]
    fn negative_frequency_sequence() {
        let set = simulated();
        MotorController::new(&set).apply(motor(-500)).unwrap();

        assert_eq!(
            calls(&set),
            vec![
                Call::new(Device::Direction, Op::On),
                Call::new(Device::Motor, Op::Start(50)),
                Call::new(Device::Motor, Op::ChangeFrequency(500)),
                Call::new(Device::MotorEnable, Op::On),
            ]
        );
    }

    #[test]
    fn positive_frequency_sequence() {
        let set = simulated();
        MotorController::new(&set).apply(motor(1200)).unwrap();

        assert_eq!(
            calls(&set),
            vec![
                Call::new(Device::Direction, Op::Off),
                Call::new(Device::Motor, Op::Start(50)),
                Call::new(Device::Motor, Op::ChangeFrequency(1200)),
                Call::new(Device::MotorEnable, Op::On),
            ]
        );
    }

    #[test]
    fn stop_sequence_leaves_direction_alone() {
        let set = simulated();
        let controller = MotorController::new(&set);
        controller.apply(motor(-500)).unwrap();
        set.history().unwrap().clear();

        controller.apply(MotorCommand::stop()).unwrap();

        assert_eq!(
            calls(&set),
            vec![
                Call::new(Device::MotorEnable, Op::Off),
                Call::new(Device::Motor, Op::Stop),
            ]
        );
        let state = set.state();
        assert!(!state.motor_enabled);
        assert!(!state.motor_running);
        assert_eq!(state.direction, Direction::CounterClockwise);
    }

    #[test]
    fn stop_on_fresh_backend() {
        let set = simulated();
        MotorController::new(&set).apply(MotorCommand::stop()).unwrap();
        assert_eq!(calls(&set).len(), 2);
        assert!(!set.state().motor_running);
    }

    #[test]
    fn repeated_command_is_idempotent() {
        let once = simulated();
        MotorController::new(&once).apply(motor(-750)).unwrap();

        let twice = simulated();
        let controller = MotorController::new(&twice);
        controller.apply(motor(-750)).unwrap();
        controller.apply(motor(-750)).unwrap();

        assert_eq!(once.state(), twice.state());
    }

    #[test]
    fn reversing_updates_direction() {
        let set = simulated();
        let controller = MotorController::new(&set);
        controller.apply(motor(-10)).unwrap();
        controller.apply(motor(10)).unwrap();

        let state = set.state();
        assert_eq!(state.direction, Direction::Clockwise);
        assert_eq!(state.motor_frequency_hz, 10);
    }

    // =========================================================================
    // Light Tests
    // =========================================================================

    #[test]
    fn light_sets_exact_duty_and_nothing_else() {
        for brightness in [0u8, 1, 15, 50, 99, 100] {
            let set = simulated();
            LightController::new(&set)
                .apply(LightCommand::new(brightness).unwrap())
                .unwrap();

            assert_eq!(
                calls(&set),
                vec![Call::new(Device::Light, Op::ChangeDutyCycle(brightness))]
            );
            assert_eq!(set.state().light_duty, brightness);
        }
    }
}
