//! Snapshot - one update cycle's output for the render collaborator
//!
//! Immutable once built; the core hands out `Arc<Snapshot>` and replaces
//! it wholesale on the next productive cycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::metrics::{ProbabilitySource, TemperatureLevel};
use crate::logic::model::Verdict;
use crate::logic::record::{Record, SensorField};

/// Core lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoreState {
    /// No data yet
    Idle,
    /// At least one record has been ingested
    Streaming,
}

/// Summary metrics
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SummaryMetrics {
    /// Watt-hours over the window
    pub energy_consumption: f64,
    /// Percent, absent when neither verdict nor advisory flags exist
    pub failure_probability: Option<f64>,
    pub probability_source: Option<ProbabilitySource>,
    pub temperature_min: Option<f64>,
    pub temperature_max: Option<f64>,
    pub record_count: usize,
}

/// One point of a chart series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

/// Render snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub session_id: Uuid,
    /// Cycle that built this snapshot (0 = placeholder)
    pub cycle: u64,
    pub state: CoreState,
    /// Wall clock at build time. Informational only.
    pub produced_at: DateTime<Utc>,
    /// Window contents, oldest first
    pub records: Vec<Record>,
    pub verdict: Verdict,
    /// Name of the classifier that produced the verdict
    pub classifier: Option<String>,
    pub temperature_level: Option<TemperatureLevel>,
    pub metrics: SummaryMetrics,
}

impl Snapshot {
    /// "No data" placeholder
    pub fn idle(session_id: Uuid) -> Self {
        Self {
            session_id,
            cycle: 0,
            state: CoreState::Idle,
            produced_at: Utc::now(),
            records: Vec::new(),
            verdict: Verdict::absent(),
            classifier: None,
            temperature_level: None,
            metrics: SummaryMetrics::default(),
        }
    }

    pub fn is_idle(&self) -> bool {
        self.state == CoreState::Idle
    }

    /// Newest record in the window
    pub fn latest(&self) -> Option<&Record> {
        self.records.last()
    }

    /// Chart series for one field, skipping records without it
    pub fn series(&self, field: SensorField) -> Vec<SeriesPoint> {
        self.records
            .iter()
            .filter_map(|r| {
                r.value(field).map(|value| SeriesPoint {
                    timestamp: r.timestamp,
                    value,
                })
            })
            .collect()
    }

    /// Window span covered by this snapshot
    pub fn span(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        match (self.records.first(), self.records.last()) {
            (Some(first), Some(last)) => Some((first.timestamp, last.timestamp)),
            _ => None,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
