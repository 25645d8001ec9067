//! # rigctl
//!
//! Controls a stepper motor and a dimmable light over Raspberry Pi GPIO and
//! hardware PWM, with a web API in front.
//!
//! ## Features
//!
//! - **Safe acquisition**: PWM channels are exported with a bounded retry that
//!   masks the udev permission race, and nothing else
//! - **Simulated fallback**: if any resource cannot be acquired, the whole rig
//!   runs on logging pseudo-devices instead
//! - **Command mapping**: signed frequency to direction/enable/step PWM, with a
//!   fixed ordering and a canonical stop
//! - **Per-group locking**: motor commands never interleave; light commands
//!   never wait behind them
//!
//! ## Architecture
//!
//! - `traits` - Hardware capabilities (`PwmOutput`, `DigitalOutput`, ...)
//! - `hal` - PWM channel, GPIO pin, simulated and Raspberry Pi implementations
//! - `backend` - The actuator set and hardware-or-simulated construction
//! - `commands` - Validated motor and light commands
//! - `controller` - Command to primitive-call translation
//! - `rig` - The shared handle the front end holds
//! - `services` - Axum HTTP API (requires `web` feature)
//!
//! ## Example
//!
//! ```rust
//! use rigctl::{MotorCommand, Rig};
//!
//! let rig = Rig::simulated();
//! rig.apply_motor(MotorCommand::new(-500).unwrap()).unwrap();
//! rig.apply_motor(MotorCommand::stop()).unwrap();
//!
//! let history = rig.history().unwrap().calls();
//! assert_eq!(history.last().unwrap().to_string(), "motor.stop()");
//! ```

#![warn(missing_docs)]

/// The actuator set and backend construction.
pub mod backend;
/// Validated motor and light commands.
pub mod commands;
/// Configuration with environment overrides.
pub mod config;
/// Command interpretation layer.
pub mod controller;
/// Error types.
pub mod error;
/// Hardware abstraction layer implementations.
pub mod hal;
/// Logger setup.
pub mod logging;
/// The shared rig handle.
pub mod rig;
/// Core traits for hardware abstraction.
pub mod traits;

/// HTTP front end (feature-gated).
#[cfg(feature = "web")]
pub mod services;

// Re-exports for convenience
pub use backend::{ActuatorSet, ActuatorState, BackendKind, HardwareBackend, MotorState};
pub use commands::{LightCommand, MotorCommand};
pub use config::{Config, HardwareConfig, LogConfig, WebConfig};
pub use controller::{LightController, MotorController};
pub use error::{AcquisitionError, AcquisitionErrorKind, ActuationError, ValidationError};
pub use rig::Rig;
pub use traits::{
    Device, DigitalOutput, Direction, HardwareProvider, OutputLine, PwmDriver, PwmOutput,
};
