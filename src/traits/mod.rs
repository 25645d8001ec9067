//! Trait definitions for hardware abstraction.
//!
//! This module defines the core abstractions that allow rigctl to run on a
//! Raspberry Pi or with no hardware at all, with the same command layer.
//!
//! # Hardware Abstraction
//!
//! The command layer sees two capabilities:
//!
//! - [`PwmOutput`]: start/stop, duty cycle, frequency
//! - [`DigitalOutput`]: logical on/off
//!
//! Below them, [`PwmDriver`] and [`OutputLine`] are the raw writes a physical
//! channel or pin is built from, and [`HardwareProvider`] opens them.

pub mod hardware;

pub use hardware::*;
