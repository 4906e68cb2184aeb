//! Dashboard Configuration
//!
//! Retention window, tick cadence and display thresholds.

use serde::{Deserialize, Serialize};

use crate::constants;

/// Configuration error
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// Dashboard configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Retention duration in minutes (WINDOW_SIZE)
    pub window_size_minutes: u32,

    /// Advisory re-evaluation step in minutes (SLIDE_STEP)
    pub slide_step_minutes: u32,

    /// How long the processing thread waits for data per tick
    pub tick_interval_ms: u64,

    /// Supply voltage for power = motor_current * voltage
    pub voltage: f64,

    /// Upper bound of the normal temperature band
    pub temperature_normal_max: f64,

    /// Upper bound of the warning temperature band
    pub temperature_warning_max: f64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            window_size_minutes: constants::DEFAULT_WINDOW_SIZE_MINUTES,
            slide_step_minutes: constants::DEFAULT_SLIDE_STEP_MINUTES,
            tick_interval_ms: constants::DEFAULT_TICK_INTERVAL_MS,
            voltage: constants::DEFAULT_VOLTAGE,
            temperature_normal_max: constants::DEFAULT_TEMP_NORMAL_MAX,
            temperature_warning_max: constants::DEFAULT_TEMP_WARNING_MAX,
        }
    }
}

impl DashboardConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            window_size_minutes: constants::get_window_size_minutes(),
            slide_step_minutes: constants::get_slide_step_minutes(),
            tick_interval_ms: constants::get_tick_interval_ms(),
            voltage: constants::get_voltage(),
            temperature_normal_max: constants::env_or(
                "TEMP_NORMAL_MAX",
                constants::DEFAULT_TEMP_NORMAL_MAX,
            ),
            temperature_warning_max: constants::env_or(
                "TEMP_WARNING_MAX",
                constants::DEFAULT_TEMP_WARNING_MAX,
            ),
        }
    }

    /// Window size with a custom retention (minutes)
    pub fn with_window_minutes(minutes: u32) -> Self {
        Self {
            window_size_minutes: minutes,
            ..Default::default()
        }
    }

    /// Retention as a chrono duration
    pub fn window_duration(&self) -> chrono::Duration {
        chrono::Duration::minutes(i64::from(self.window_size_minutes))
    }

    /// Tick as a std duration
    pub fn tick_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.tick_interval_ms)
    }

    /// Check the configuration for values the core cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window_size_minutes == 0 {
            return Err(ConfigError::InvalidValue {
                field: "window_size_minutes",
                reason: "must be at least 1 minute".to_string(),
            });
        }
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "tick_interval_ms",
                reason: "must be positive".to_string(),
            });
        }
        if !(self.voltage.is_finite() && self.voltage > 0.0) {
            return Err(ConfigError::InvalidValue {
                field: "voltage",
                reason: format!("must be a positive number, got {}", self.voltage),
            });
        }
        if self.temperature_normal_max > self.temperature_warning_max {
            return Err(ConfigError::InvalidValue {
                field: "temperature_normal_max",
                reason: format!(
                    "{} exceeds temperature_warning_max {}",
                    self.temperature_normal_max, self.temperature_warning_max
                ),
            });
        }
        if self.slide_step_minutes > self.window_size_minutes {
            log::warn!(
                "SLIDE_STEP ({} min) exceeds WINDOW_SIZE ({} min)",
                self.slide_step_minutes,
                self.window_size_minutes
            );
        }
        Ok(())
    }
}
