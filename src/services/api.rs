//! API request and response types for the HTTP front end.

use serde::{Deserialize, Serialize};

use crate::backend::{ActuatorState, BackendKind};
use crate::commands::{DEFAULT_BRIGHTNESS, DEFAULT_MOTOR_FREQUENCY};
use crate::traits::Direction;

// ============================================================================
// Request Types
// ============================================================================

/// Body of `POST /api/motor`.
///
/// Integer only: floats and strings fail to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MotorRequest {
    /// Signed step frequency in Hz
    #[serde(default = "default_frequency")]
    pub frequency: i64,
}

impl Default for MotorRequest {
    fn default() -> Self {
        Self {
            frequency: default_frequency(),
        }
    }
}

fn default_frequency() -> i64 {
    DEFAULT_MOTOR_FREQUENCY as i64
}

/// Body of `POST /api/light`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LightRequest {
    /// Duty cycle percentage
    #[serde(default = "default_brightness")]
    pub brightness: i64,
}

impl Default for LightRequest {
    fn default() -> Self {
        Self {
            brightness: default_brightness(),
        }
    }
}

fn default_brightness() -> i64 {
    DEFAULT_BRIGHTNESS as i64
}

// ============================================================================
// Response Types
// ============================================================================

/// API response wrapper for consistent JSON structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Whether the request was successful
    pub success: bool,
    /// Response data (present when success=true)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Error message (present when success=false)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Create a successful response with data
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    /// Create an error response
    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Current actuator state response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateResponse {
    /// Backend in use
    pub backend: BackendKind,
    /// Whether the backend is simulated
    pub simulated: bool,
    /// Motor enable line asserted
    pub motor_enabled: bool,
    /// Motor step PWM running
    pub motor_running: bool,
    /// Motor direction
    pub direction: Direction,
    /// Last motor step frequency in Hz
    pub motor_frequency_hz: u32,
    /// Signed frequency equivalent, 0 when stopped
    pub frequency: i32,
    /// Light duty cycle in percent
    pub light_duty: u8,
}

impl StateResponse {
    /// Build from a state snapshot and the backend kind.
    pub fn new(state: &ActuatorState, backend: BackendKind) -> Self {
        Self {
            backend,
            simulated: backend == BackendKind::Simulated,
            motor_enabled: state.motor_enabled,
            motor_running: state.motor_running,
            direction: state.direction,
            motor_frequency_hz: state.motor_frequency_hz,
            frequency: state.signed_frequency(),
            light_duty: state.light_duty,
        }
    }
}

/// Command result response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandResponse {
    /// Whether the command was accepted
    pub accepted: bool,
    /// Result details
    pub result: String,
}

impl CommandResponse {
    /// An accepted command.
    pub fn accepted(result: impl Into<String>) -> Self {
        Self {
            accepted: true,
            result: result.into(),
        }
    }
}

/// System version response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemVersionResponse {
    /// `HEAD` commit of the deployed checkout
    pub commit_hash: String,
    /// Whether the backend is simulated
    pub simulated: bool,
}
