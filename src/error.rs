//! Error types for resource acquisition, command validation, and live actuation.
//!
//! The three families never mix:
//!
//! - [`AcquisitionError`] only happens during backend construction and is
//!   handled there by falling back to the simulated backend.
//! - [`ValidationError`] is raised by the command constructors, before any
//!   backend is involved.
//! - [`ActuationError`] is a failed write on an already-acquired resource and
//!   is returned to whoever issued the command.

use std::io;

use thiserror::Error;

use crate::traits::Device;

/// Why a resource could not be acquired.
#[derive(Debug, Error)]
pub enum AcquisitionErrorKind {
    /// The export succeeded but the permission fixup had not run yet.
    ///
    /// This is the only retried condition.
    #[error("permission denied (export race): {0}")]
    PermissionRace(#[source] io::Error),

    /// The resource does not exist or cannot be configured.
    #[error("hardware unavailable: {0}")]
    Unavailable(#[source] io::Error),

    /// Every attempt hit the permission race.
    #[error("still permission denied after {attempts} attempts")]
    RetriesExhausted {
        /// Attempts made before giving up.
        attempts: u32,
    },
}

impl AcquisitionErrorKind {
    /// Classify an I/O failure from an export or configure write.
    pub fn from_io(err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::PermissionDenied {
            AcquisitionErrorKind::PermissionRace(err)
        } else {
            AcquisitionErrorKind::Unavailable(err)
        }
    }

    /// Returns true if this failure is worth another attempt.
    #[inline]
    pub fn is_permission_race(&self) -> bool {
        matches!(self, AcquisitionErrorKind::PermissionRace(_))
    }
}

/// A resource of the actuator set could not be acquired.
#[derive(Debug, Error)]
#[error("failed to acquire {device}: {kind}")]
pub struct AcquisitionError {
    /// The resource that failed.
    pub device: Device,
    /// What went wrong.
    #[source]
    pub kind: AcquisitionErrorKind,
}

impl AcquisitionError {
    /// Create an acquisition error for a device.
    pub fn new(device: Device, kind: AcquisitionErrorKind) -> Self {
        Self { device, kind }
    }
}

/// A command argument was outside its accepted range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Motor frequency must be in `(-2000, 2000]`.
    #[error("frequency {0} out of range: must be greater than -2000 and at most 2000")]
    FrequencyOutOfRange(i64),

    /// Light brightness must be in `[0, 100]`.
    #[error("brightness {0} out of range: must be between 0 and 100")]
    BrightnessOutOfRange(i64),
}

/// A write to an acquired resource failed.
#[derive(Debug, Error)]
#[error("{device} actuation failed: {source}")]
pub struct ActuationError {
    /// The resource the write was aimed at.
    pub device: Device,
    /// Underlying I/O failure.
    #[source]
    pub source: io::Error,
}

impl ActuationError {
    /// Create an actuation error for a device.
    pub fn new(device: Device, source: io::Error) -> Self {
        Self { device, source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permission_denied_is_race_class() {
        let kind = AcquisitionErrorKind::from_io(io::Error::from(io::ErrorKind::PermissionDenied));
        assert!(kind.is_permission_race());
    }

    #[test]
    fn other_io_errors_are_not_retried() {
        for err_kind in [
            io::ErrorKind::NotFound,
            io::ErrorKind::Unsupported,
            io::ErrorKind::InvalidInput,
        ] {
            let kind = AcquisitionErrorKind::from_io(io::Error::from(err_kind));
            assert!(!kind.is_permission_race(), "{:?} must not be retried", err_kind);
        }
    }

    #[test]
    fn acquisition_error_names_device() {
        let err = AcquisitionError::new(
            Device::MotorEnable,
            AcquisitionErrorKind::RetriesExhausted { attempts: 10 },
        );
        let msg = err.to_string();
        assert!(msg.contains("motor_enable"));
    }

    #[test]
    fn validation_error_messages() {
        assert_eq!(
            ValidationError::BrightnessOutOfRange(101).to_string(),
            "brightness 101 out of range: must be between 0 and 100"
        );
        assert!(ValidationError::FrequencyOutOfRange(-2000)
            .to_string()
            .contains("-2000"));
    }
}
