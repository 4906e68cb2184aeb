//! Rule-Based Classifier
//!
//! Threshold heuristic used when no trained model is available.
//! Counts features above their limit and adds a bounded overshoot term.

use serde::{Deserialize, Serialize};

use super::{check_features, Classifier, ClassifierError, Verdict};
use crate::logic::features::{FeatureVector, FEATURE_COUNT};

/// Per-feature limits, in FEATURE_LAYOUT order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleLimits {
    pub temperature: f64,
    pub vibration: f64,
    pub pressure: f64,
    pub motor_current: f64,
}

impl Default for RuleLimits {
    fn default() -> Self {
        Self {
            temperature: 80.0,
            vibration: 5.0,
            pressure: 120.0,
            motor_current: 20.0,
        }
    }
}

impl RuleLimits {
    fn as_array(&self) -> [f64; FEATURE_COUNT] {
        [self.temperature, self.vibration, self.pressure, self.motor_current]
    }
}

/// Threshold classifier
#[derive(Debug, Clone)]
pub struct RuleClassifier {
    limits: RuleLimits,
    /// Probability at or above which the label is 1
    decision_threshold: f64,
}

impl Default for RuleClassifier {
    fn default() -> Self {
        Self::new(RuleLimits::default(), 0.5)
    }
}

impl RuleClassifier {
    pub fn new(limits: RuleLimits, decision_threshold: f64) -> Self {
        Self {
            limits,
            decision_threshold: decision_threshold.clamp(0.0, 1.0),
        }
    }

    pub fn limits(&self) -> &RuleLimits {
        &self.limits
    }

    /// Failure probability for the given values
    fn score(&self, values: &[f64; FEATURE_COUNT]) -> f64 {
        let limits = self.limits.as_array();
        let mut exceeded = 0usize;
        let mut max_dev = 0.0f64;

        for (&value, &limit) in values.iter().zip(limits.iter()) {
            if limit > 0.0 && value > limit {
                exceeded += 1;
                max_dev = max_dev.max((value - limit) / limit);
            }
        }

        let base = exceeded as f64 / FEATURE_COUNT as f64;
        (base + max_dev.min(1.0) * 0.25).clamp(0.0, 1.0)
    }
}

impl Classifier for RuleClassifier {
    fn name(&self) -> &str {
        "rules"
    }

    fn predict(&self, features: &FeatureVector) -> Result<Verdict, ClassifierError> {
        check_features(features)?;

        let probability = self.score(features.as_array());
        let label = u8::from(probability >= self.decision_threshold);
        Ok(Verdict::new(label, probability))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_within_limits() {
        let classifier = RuleClassifier::default();
        let verdict = classifier
            .predict(&FeatureVector::from([55.0, 1.0, 100.0, 10.0]))
            .unwrap();
        assert_eq!(verdict, Verdict::new(0, 0.0));
    }

    #[test]
    fn test_two_limits_exceeded() {
        let classifier = RuleClassifier::default();
        // temperature 20% over, motor current 10% over
        let verdict = classifier
            .predict(&FeatureVector::from([96.0, 1.0, 100.0, 22.0]))
            .unwrap();

        let p = verdict.probability.unwrap();
        assert!((p - (0.5 + 0.2 * 0.25)).abs() < 1e-9);
        assert_eq!(verdict.label, Some(1));
    }

    #[test]
    fn test_probability_is_bounded() {
        let classifier = RuleClassifier::default();
        let verdict = classifier
            .predict(&FeatureVector::from([1000.0, 100.0, 1000.0, 1000.0]))
            .unwrap();
        assert_eq!(verdict.probability, Some(1.0));
    }

    #[test]
    fn test_rejects_non_finite() {
        let classifier = RuleClassifier::default();
        let result = classifier.predict(&FeatureVector::from([f64::INFINITY, 1.0, 1.0, 1.0]));
        assert!(matches!(result, Err(ClassifierError::InvalidFeatures(_))));
    }
}
