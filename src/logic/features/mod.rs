//! Features Module - Feature Extraction
//!
//! Maps the latest record into the fixed-layout vector a classifier reads.

pub mod layout;
pub mod vector;

// Re-export common types
pub use layout::{FEATURE_COUNT, FEATURE_LAYOUT, FEATURE_VERSION, LayoutMismatchError};
pub use vector::{extract, FeatureError, FeatureVector};
