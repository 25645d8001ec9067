//! Configuration for hardware assignment, the web server, and logging.
//!
//! Every field has a default matching the reference wiring, and every field
//! can be overridden from the environment via [`Config::from_env`].
//!
//! # Example
//!
//! ```rust
//! use rigctl::config::{Config, HardwareConfig, WebConfig};
//!
//! // Use defaults
//! let config = Config::default();
//! assert_eq!(config.hardware.motor_enable_pin, 26);
//!
//! // Or customize
//! let config = Config::default()
//!     .with_hardware(HardwareConfig::default().with_direction_pin(5))
//!     .with_web(WebConfig::default().with_port(3000));
//! assert_eq!(config.web.port, 3000);
//! ```
//!
//! # Environment
//!
//! | Variable | Field | Default |
//! |----------|-------|---------|
//! | `RIG_MOTOR_ENABLE_PIN` | `hardware.motor_enable_pin` | 26 |
//! | `RIG_MOTOR_STEP_PIN` | `hardware.motor_step_pin` | 13 |
//! | `RIG_DIRECTION_PIN` | `hardware.direction_pin` | 6 |
//! | `RIG_LIGHT_CHANNEL` | `hardware.light_channel` | 0 |
//! | `RIG_LIGHT_FREQUENCY` | `hardware.light_frequency_hz` | 1000 |
//! | `RIG_MOTOR_CHANNEL` | `hardware.motor_channel` | 1 |
//! | `RIG_MOTOR_FREQUENCY` | `hardware.motor_frequency_hz` | 100 |
//! | `RIG_LIGHT_DEFAULT_DUTY` | `hardware.light_default_duty` | 15 |
//! | `RIG_MAX_RETRIES` | `hardware.retry.max_attempts` | 10 |
//! | `RIG_RETRY_DELAY_MS` | `hardware.retry.delay_ms` | 100 |
//! | `RIG_PORT` | `web.port` | 8000 |
//! | `RIG_REPO_DIR` | `web.repo_dir` | `.` |
//! | `RIG_LOG_LEVEL` | `log.level` | `info` |

use std::path::PathBuf;
use std::str::FromStr;

use log::LevelFilter;

use crate::hal::RetryPolicy;

// ============================================================================
// Main Config
// ============================================================================

/// Complete application configuration
#[derive(Clone, Debug, Default)]
pub struct Config {
    /// Pin and channel assignment
    pub hardware: HardwareConfig,
    /// Web server configuration
    pub web: WebConfig,
    /// Logging configuration
    pub log: LogConfig,
}

impl Config {
    /// Set hardware configuration
    pub fn with_hardware(mut self, hardware: HardwareConfig) -> Self {
        self.hardware = hardware;
        self
    }

    /// Set web configuration
    pub fn with_web(mut self, web: WebConfig) -> Self {
        self.web = web;
        self
    }

    /// Set logging configuration
    pub fn with_log(mut self, log: LogConfig) -> Self {
        self.log = log;
        self
    }

    /// Defaults overridden by `RIG_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each `RIG_*` key.
    ///
    /// Values that fail to parse keep their default and are logged.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let hw = &mut config.hardware;

        override_from(&lookup, "RIG_MOTOR_ENABLE_PIN", &mut hw.motor_enable_pin);
        override_from(&lookup, "RIG_MOTOR_STEP_PIN", &mut hw.motor_step_pin);
        override_from(&lookup, "RIG_DIRECTION_PIN", &mut hw.direction_pin);
        override_from(&lookup, "RIG_LIGHT_CHANNEL", &mut hw.light_channel);
        override_from(&lookup, "RIG_LIGHT_FREQUENCY", &mut hw.light_frequency_hz);
        override_from(&lookup, "RIG_MOTOR_CHANNEL", &mut hw.motor_channel);
        override_from(&lookup, "RIG_MOTOR_FREQUENCY", &mut hw.motor_frequency_hz);
        override_from(&lookup, "RIG_LIGHT_DEFAULT_DUTY", &mut hw.light_default_duty);
        override_from(&lookup, "RIG_MAX_RETRIES", &mut hw.retry.max_attempts);
        override_from(&lookup, "RIG_RETRY_DELAY_MS", &mut hw.retry.delay_ms);

        if hw.light_default_duty > 100 {
            log::warn!(
                "RIG_LIGHT_DEFAULT_DUTY={} is above 100, using 100",
                hw.light_default_duty
            );
            hw.light_default_duty = 100;
        }

        override_from(&lookup, "RIG_PORT", &mut config.web.port);
        override_from(&lookup, "RIG_REPO_DIR", &mut config.web.repo_dir);
        override_from(&lookup, "RIG_LOG_LEVEL", &mut config.log.level);

        config
    }
}

fn override_from<T, F>(lookup: &F, key: &str, target: &mut T)
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return;
    };
    match raw.trim().parse() {
        Ok(value) => *target = value,
        Err(_) => log::warn!("ignoring {}={:?}: not a valid value", key, raw),
    }
}

// ============================================================================
// Hardware Config
// ============================================================================

/// Pin and channel assignment for the rig
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HardwareConfig {
    /// GPIO (BCM) for the motor driver enable input
    pub motor_enable_pin: u8,
    /// GPIO (BCM) carrying the motor step PWM; informational, the channel is
    /// routed by the device tree overlay
    pub motor_step_pin: u8,
    /// GPIO (BCM) for the motor driver direction input
    pub direction_pin: u8,
    /// PWM channel for the light
    pub light_channel: u8,
    /// Light PWM frequency in Hz
    pub light_frequency_hz: u32,
    /// PWM channel for the motor step signal
    pub motor_channel: u8,
    /// Motor PWM frequency in Hz at acquisition
    pub motor_frequency_hz: u32,
    /// Light duty cycle after startup, in percent
    pub light_default_duty: u8,
    /// Whether the enable input is asserted by a high level
    pub motor_enable_active_high: bool,
    /// Whether counterclockwise is a high level on the direction input
    pub direction_active_high: bool,
    /// PWM export race retry policy
    pub retry: RetryPolicy,
}

impl Default for HardwareConfig {
    fn default() -> Self {
        Self {
            motor_enable_pin: 26,
            motor_step_pin: 13,
            direction_pin: 6,
            light_channel: 0,
            light_frequency_hz: 1000,
            motor_channel: 1,
            motor_frequency_hz: 100,
            light_default_duty: 15,
            motor_enable_active_high: false,
            direction_active_high: true,
            retry: RetryPolicy::default(),
        }
    }
}

impl HardwareConfig {
    /// Set the motor enable GPIO
    pub fn with_motor_enable_pin(mut self, pin: u8) -> Self {
        self.motor_enable_pin = pin;
        self
    }

    /// Set the direction GPIO
    pub fn with_direction_pin(mut self, pin: u8) -> Self {
        self.direction_pin = pin;
        self
    }

    /// Set the light channel and frequency
    pub fn with_light(mut self, channel: u8, frequency_hz: u32) -> Self {
        self.light_channel = channel;
        self.light_frequency_hz = frequency_hz;
        self
    }

    /// Set the motor channel and frequency
    pub fn with_motor(mut self, channel: u8, frequency_hz: u32) -> Self {
        self.motor_channel = channel;
        self.motor_frequency_hz = frequency_hz;
        self
    }

    /// Set the light duty cycle applied at startup
    pub fn with_light_default_duty(mut self, duty: u8) -> Self {
        self.light_default_duty = duty.min(100);
        self
    }

    /// Set the export retry policy
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

// ============================================================================
// Web Config
// ============================================================================

/// Web server configuration
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WebConfig {
    /// Port to listen on
    pub port: u16,
    /// Whether to enable CORS for all origins
    pub cors_permissive: bool,
    /// Git checkout reported by the version endpoint
    pub repo_dir: PathBuf,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            port: 8000,
            cors_permissive: true,
            repo_dir: PathBuf::from("."),
        }
    }
}

impl WebConfig {
    /// Set the port
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set CORS permissiveness
    pub fn with_cors(mut self, permissive: bool) -> Self {
        self.cors_permissive = permissive;
        self
    }

    /// Set the git checkout directory
    pub fn with_repo_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.repo_dir = dir.into();
        self
    }
}

// ============================================================================
// Log Config
// ============================================================================

/// Logging configuration
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogConfig {
    /// Maximum level written
    pub level: LevelFilter,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LevelFilter::Info,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_wiring() {
        let config = Config::default();
        let hw = &config.hardware;
        assert_eq!(hw.motor_enable_pin, 26);
        assert_eq!(hw.motor_step_pin, 13);
        assert_eq!(hw.direction_pin, 6);
        assert_eq!((hw.light_channel, hw.light_frequency_hz), (0, 1000));
        assert_eq!((hw.motor_channel, hw.motor_frequency_hz), (1, 100));
        assert_eq!(hw.light_default_duty, 15);
        assert!(!hw.motor_enable_active_high);
        assert!(hw.direction_active_high);
        assert_eq!(hw.retry, RetryPolicy::new(10, 100));
        assert_eq!(config.log.level, LevelFilter::Info);
    }

    #[test]
    fn empty_environment_gives_defaults() {
        let config = Config::from_lookup(|_| None);
        assert_eq!(config.hardware, HardwareConfig::default());
        assert_eq!(config.web, WebConfig::default());
    }

    #[test]
    fn environment_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("RIG_MOTOR_ENABLE_PIN", "17"),
            ("RIG_DIRECTION_PIN", " 5 "),
            ("RIG_MOTOR_FREQUENCY", "250"),
            ("RIG_MAX_RETRIES", "3"),
            ("RIG_RETRY_DELAY_MS", "20"),
            ("RIG_PORT", "9090"),
            ("RIG_REPO_DIR", "/opt/rig"),
            ("RIG_LOG_LEVEL", "debug"),
        ]));

        assert_eq!(config.hardware.motor_enable_pin, 17);
        assert_eq!(config.hardware.direction_pin, 5);
        assert_eq!(config.hardware.motor_frequency_hz, 250);
        assert_eq!(config.hardware.retry, RetryPolicy::new(3, 20));
        assert_eq!(config.web.port, 9090);
        assert_eq!(config.web.repo_dir, PathBuf::from("/opt/rig"));
        assert_eq!(config.log.level, LevelFilter::Debug);
    }

    #[test]
    fn invalid_values_keep_defaults() {
        let config = Config::from_lookup(lookup(&[
            ("RIG_MOTOR_ENABLE_PIN", "twenty-six"),
            ("RIG_PORT", "-1"),
            ("RIG_LOG_LEVEL", "loud"),
        ]));
        assert_eq!(config.hardware.motor_enable_pin, 26);
        assert_eq!(config.web.port, 8000);
        assert_eq!(config.log.level, LevelFilter::Info);
    }

    #[test]
    fn light_default_duty_is_capped() {
        let config = Config::from_lookup(lookup(&[("RIG_LIGHT_DEFAULT_DUTY", "150")]));
        assert_eq!(config.hardware.light_default_duty, 100);

        let hw = HardwareConfig::default().with_light_default_duty(200);
        assert_eq!(hw.light_default_duty, 100);
    }

    #[test]
    fn builders() {
        let hw = HardwareConfig::default()
            .with_motor_enable_pin(4)
            .with_light(1, 500)
            .with_motor(0, 50)
            .with_retry(RetryPolicy::new(2, 0));
        assert_eq!(hw.motor_enable_pin, 4);
        assert_eq!((hw.light_channel, hw.light_frequency_hz), (1, 500));
        assert_eq!((hw.motor_channel, hw.motor_frequency_hz), (0, 50));
        assert_eq!(hw.retry.max_attempts, 2);

        let web = WebConfig::default().with_cors(false).with_repo_dir("/srv");
        assert!(!web.cors_permissive);
        assert_eq!(web.repo_dir, PathBuf::from("/srv"));
    }
}
