//! Feature Vector - Classifier input
//!
//! Built from the latest record only; older window records are not fed
//! to the classifier.

use serde::{Deserialize, Serialize};

use super::layout::{
    layout_hash, validate_layout, LayoutMismatchError, FEATURE_COUNT, FEATURE_FIELDS,
    FEATURE_LAYOUT, FEATURE_VERSION,
};
use crate::logic::record::Record;

// ============================================================================
// ERROR HANDLING
// ============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FeatureError {
    #[error("record is missing required feature fields: {}", .missing.join(", "))]
    IncompleteRecord { missing: Vec<&'static str> },
}

// ============================================================================
// VERSIONED FEATURE VECTOR
// ============================================================================

/// Versioned feature vector with layout metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub version: u8,
    pub layout_hash: u32,
    /// Values in the order defined by FEATURE_LAYOUT
    pub values: [f64; FEATURE_COUNT],
}

impl FeatureVector {
    /// Create from raw values with current version
    pub fn from_values(values: [f64; FEATURE_COUNT]) -> Self {
        Self {
            version: FEATURE_VERSION,
            layout_hash: layout_hash(),
            values,
        }
    }

    pub fn as_array(&self) -> &[f64; FEATURE_COUNT] {
        &self.values
    }

    /// Get feature by name
    pub fn get_by_name(&self, name: &str) -> Option<f64> {
        super::layout::feature_index(name).and_then(|i| self.values.get(i).copied())
    }

    /// Validate that this vector is compatible with current layout
    pub fn validate(&self) -> Result<(), LayoutMismatchError> {
        validate_layout(self.version, self.layout_hash)
    }

    /// All values are finite numbers
    pub fn is_finite(&self) -> bool {
        self.values.iter().all(|v| v.is_finite())
    }

    /// Named values, for logging
    pub fn named(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        FEATURE_LAYOUT.iter().copied().zip(self.values.iter().copied())
    }
}

impl From<[f64; FEATURE_COUNT]> for FeatureVector {
    fn from(values: [f64; FEATURE_COUNT]) -> Self {
        Self::from_values(values)
    }
}

// ============================================================================
// EXTRACTION
// ============================================================================

/// Map the latest record's feature fields into a vector.
/// Fails listing every absent field.
pub fn extract(latest: &Record) -> Result<FeatureVector, FeatureError> {
    let mut values = [0.0f64; FEATURE_COUNT];
    let mut missing = Vec::new();

    for (slot, field) in values.iter_mut().zip(FEATURE_FIELDS) {
        match latest.value(field) {
            Some(v) => *slot = v,
            None => missing.push(field.name()),
        }
    }

    if !missing.is_empty() {
        return Err(FeatureError::IncompleteRecord { missing });
    }

    Ok(FeatureVector::from_values(values))
}
