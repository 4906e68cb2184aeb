//! Feature Layout - Centralized Feature Definition
//!
//! **This file controls the classifier input schema**
//!
//! ## Rules:
//! 1. Add feature → increment FEATURE_VERSION
//! 2. Change order → increment FEATURE_VERSION
//! 3. Remove feature → increment FEATURE_VERSION
//!
//! A trained model is only valid for the layout it was exported with.

use crc32fast::Hasher;

use crate::logic::record::SensorField;

// ============================================================================
// FEATURE VERSION
// ============================================================================

/// Current feature layout version
pub const FEATURE_VERSION: u8 = 1;

// ============================================================================
// FEATURE LAYOUT (Authoritative source)
// ============================================================================

/// Record fields in the exact order they appear in the vector
pub const FEATURE_FIELDS: [SensorField; FEATURE_COUNT] = [
    SensorField::Temperature,   // 0
    SensorField::Vibration,     // 1
    SensorField::Pressure,      // 2
    SensorField::MotorCurrent,  // 3
];

/// Feature names in vector order
pub const FEATURE_LAYOUT: &[&str] = &[
    "temperature",
    "vibration",
    "pressure",
    "motor_current",
];

/// Total number of features
/// Must match FEATURE_LAYOUT.len()
pub const FEATURE_COUNT: usize = 4;

// ============================================================================
// LAYOUT HASH
// ============================================================================

/// CRC32 of the version and the ordered feature names
pub fn layout_hash() -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(&[FEATURE_VERSION]);

    for name in FEATURE_LAYOUT {
        hasher.update(name.as_bytes());
        hasher.update(&[0]);
    }

    hasher.finalize()
}

// ============================================================================
// LAYOUT VALIDATION
// ============================================================================

/// Feature layout doesn't match the current one
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("feature layout mismatch: expected v{expected_version} ({expected_hash:08x}), got v{actual_version} ({actual_hash:08x})")]
pub struct LayoutMismatchError {
    pub expected_version: u8,
    pub expected_hash: u32,
    pub actual_version: u8,
    pub actual_hash: u32,
}

/// Validate that incoming data matches current layout
pub fn validate_layout(version: u8, hash: u32) -> Result<(), LayoutMismatchError> {
    let current_hash = layout_hash();

    if version != FEATURE_VERSION || hash != current_hash {
        return Err(LayoutMismatchError {
            expected_version: FEATURE_VERSION,
            expected_hash: current_hash,
            actual_version: version,
            actual_hash: hash,
        });
    }

    Ok(())
}

/// Get feature index by name
pub fn feature_index(name: &str) -> Option<usize> {
    FEATURE_LAYOUT.iter().position(|&n| n == name)
}
