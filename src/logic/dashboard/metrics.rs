//! Summary metrics over the window
//!
//! All functions take the window in ascending timestamp order and return
//! zero/absent for an empty window.

use serde::{Deserialize, Serialize};

use crate::constants::SECONDS_PER_HOUR;
use crate::logic::config::DashboardConfig;
use crate::logic::model::Verdict;
use crate::logic::record::Record;

/// Where the failure probability came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbabilitySource {
    /// Bound classifier's verdict
    Classifier,
    /// Mean of the advisory `failure` flags in the window
    AdvisoryFlags,
}

/// Temperature band of the latest reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemperatureLevel {
    Normal,
    Warning,
    Danger,
}

impl TemperatureLevel {
    pub fn classify(temperature: f64, config: &DashboardConfig) -> Self {
        if temperature < config.temperature_normal_max {
            TemperatureLevel::Normal
        } else if temperature < config.temperature_warning_max {
            TemperatureLevel::Warning
        } else {
            TemperatureLevel::Danger
        }
    }
}

/// Energy over the window in watt-hours: Σ power_i × Δt_i / 3600,
/// with Δt_i the seconds since the previous record. The oldest record
/// and records without power contribute nothing.
pub fn energy_consumption_wh(records: &[Record]) -> f64 {
    let watt_seconds: f64 = records
        .windows(2)
        .filter_map(|pair| {
            let dt = (pair[1].timestamp - pair[0].timestamp).num_milliseconds() as f64 / 1000.0;
            pair[1].power.map(|power| power * dt)
        })
        .sum();

    watt_seconds / SECONDS_PER_HOUR
}

/// Mean of advisory failure flags (0..=1), over records that carry one
pub fn advisory_failure_rate(records: &[Record]) -> Option<f64> {
    let flags: Vec<bool> = records.iter().filter_map(|r| r.failure).collect();
    if flags.is_empty() {
        return None;
    }
    let failures = flags.iter().filter(|&&f| f).count();
    Some(failures as f64 / flags.len() as f64)
}

/// Failure probability in percent: the verdict's probability when present,
/// otherwise the advisory flag mean
pub fn failure_probability(verdict: &Verdict, records: &[Record]) -> Option<(f64, ProbabilitySource)> {
    if let Some(p) = verdict.probability {
        return Some((p * 100.0, ProbabilitySource::Classifier));
    }
    advisory_failure_rate(records).map(|rate| (rate * 100.0, ProbabilitySource::AdvisoryFlags))
}

/// Min and max temperature in the window
pub fn temperature_range(records: &[Record]) -> Option<(f64, f64)> {
    records
        .iter()
        .filter_map(|r| r.temperature)
        .fold(None, |acc, t| match acc {
            None => Some((t, t)),
            Some((lo, hi)) => Some((lo.min(t), hi.max(t))),
        })
}
