//! Hardware Abstraction Layer implementations.
//!
//! This module contains concrete implementations of the traits
//! defined in [`crate::traits`].
//!
//! # Available Implementations
//!
//! - `pwm`: [`PwmChannel`] and the export-race retry loop
//! - `pin`: [`DigitalPin`] with polarity inversion
//! - `simulated`: logging pseudo-devices for running without hardware
//! - `rpi`: Raspberry Pi provider over `rppal` (requires `rpi` feature)

pub mod pin;
pub mod pwm;
pub mod simulated;

#[cfg(feature = "rpi")]
pub mod rpi;

pub use pin::*;
pub use pwm::*;
pub use simulated::*;

#[cfg(feature = "rpi")]
pub use rpi::*;
