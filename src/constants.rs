//! Central Configuration Constants
//!
//! Single source of truth for all configuration defaults.
//! To change a default, only edit this file.

/// Default retention window (minutes)
pub const DEFAULT_WINDOW_SIZE_MINUTES: u32 = 60;

/// Default slide step (minutes). Advisory only.
pub const DEFAULT_SLIDE_STEP_MINUTES: u32 = 5;

/// Default processing tick (milliseconds)
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 1000;

/// Supply voltage used to derive power from motor current
pub const DEFAULT_VOLTAGE: f64 = 220.0;

/// Temperatures below this are normal
pub const DEFAULT_TEMP_NORMAL_MAX: f64 = 60.0;

/// Temperatures below this (and at least normal max) are a warning.
/// Anything above is danger.
pub const DEFAULT_TEMP_WARNING_MAX: f64 = 80.0;

/// Seconds per hour, for watt-second -> watt-hour conversion
pub const SECONDS_PER_HOUR: f64 = 3600.0;

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// App name
pub const APP_NAME: &str = "Machine Monitor";

// ============================================
// Helper functions to read from env with fallback
// ============================================

/// Read a parseable value from the environment, or use the default
pub fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(raw) => match raw.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                log::warn!("Ignoring unparseable {}={:?}, using default", key, raw);
                default
            }
        },
        Err(_) => default,
    }
}

/// Get window size (minutes) from environment or use default
pub fn get_window_size_minutes() -> u32 {
    env_or("WINDOW_SIZE", DEFAULT_WINDOW_SIZE_MINUTES)
}

/// Get slide step (minutes) from environment or use default
pub fn get_slide_step_minutes() -> u32 {
    env_or("SLIDE_STEP", DEFAULT_SLIDE_STEP_MINUTES)
}

/// Get tick interval (ms) from environment or use default
pub fn get_tick_interval_ms() -> u64 {
    env_or("TICK_INTERVAL_MS", DEFAULT_TICK_INTERVAL_MS)
}

/// Get supply voltage from environment or use default
pub fn get_voltage() -> f64 {
    env_or("VOLTAGE", DEFAULT_VOLTAGE)
}

/// Get model path from environment, if any
pub fn get_model_path() -> Option<String> {
    std::env::var("MODEL_PATH").ok().filter(|s| !s.trim().is_empty())
}

/// Check if a classifier should be bound at all
pub fn is_classifier_enabled() -> bool {
    std::env::var("CLASSIFIER")
        .map(|s| !s.eq_ignore_ascii_case("none") && s != "0")
        .unwrap_or(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_or_fallbacks() {
        std::env::remove_var("MACHINE_MONITOR_TEST_UNSET");
        assert_eq!(env_or("MACHINE_MONITOR_TEST_UNSET", 7u32), 7);

        std::env::set_var("MACHINE_MONITOR_TEST_BAD", "not-a-number");
        assert_eq!(env_or("MACHINE_MONITOR_TEST_BAD", 3u64), 3);

        std::env::set_var("MACHINE_MONITOR_TEST_GOOD", " 42 ");
        assert_eq!(env_or("MACHINE_MONITOR_TEST_GOOD", 3u64), 42);
    }
}
