//! Dashboard Core - Update cycle orchestration
//!
//! One instance per session. Owns the window store, the bound classifier
//! and the sinks; only the ingress queue is shared with other threads.
//!
//! ## Update cycle
//! 1. Drain ingress (empty → no-op, previous snapshot stays valid)
//! 2. Insert each record in arrival order
//! 3. Evict against the newest timestamp
//! 4. Extract features from the latest record, classify, compute metrics
//! 5. Publish a new snapshot

pub mod metrics;
pub mod snapshot;

#[cfg(test)]
mod tests;

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::logic::config::{ConfigError, DashboardConfig};
use crate::logic::features;
use crate::logic::ingress::{IngressHandle, IngressQueue, IngressStats};
use crate::logic::model::{Classifier, ClassifierError, Verdict};
use crate::logic::record::Record;
use crate::logic::sink::SnapshotSink;
use crate::logic::window::WindowStore;

// Re-export common types
pub use metrics::{ProbabilitySource, TemperatureLevel};
pub use snapshot::{CoreState, SeriesPoint, Snapshot, SummaryMetrics};

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// Result of one update cycle
#[derive(Debug, Clone)]
pub enum CycleOutcome {
    /// Nothing was pending; the previous snapshot still stands
    Unchanged,
    /// A new snapshot was built and published
    Updated(Arc<Snapshot>),
}

impl CycleOutcome {
    pub fn is_updated(&self) -> bool {
        matches!(self, CycleOutcome::Updated(_))
    }

    pub fn snapshot(&self) -> Option<&Arc<Snapshot>> {
        match self {
            CycleOutcome::Updated(snapshot) => Some(snapshot),
            CycleOutcome::Unchanged => None,
        }
    }
}

/// Running counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoreStats {
    pub cycles: u64,
    pub idle_cycles: u64,
    pub records_ingested: u64,
    pub records_evicted: u64,
    pub incomplete_records: u64,
    pub classifier_failures: u64,
    pub sink_failures: u64,
}

// ============================================================================
// DASHBOARD CORE
// ============================================================================

pub struct DashboardCore {
    config: DashboardConfig,
    session_id: Uuid,
    ingress: IngressQueue,
    window: WindowStore,
    classifier: Option<Box<dyn Classifier>>,
    sinks: Vec<Box<dyn SnapshotSink>>,
    state: CoreState,
    snapshot: Arc<Snapshot>,
    last_label: Option<u8>,
    stats: CoreStats,
}

impl std::fmt::Debug for DashboardCore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DashboardCore")
            .field("session_id", &self.session_id)
            .field("state", &self.state)
            .field("window_len", &self.window.len())
            .field("classifier", &self.classifier.as_ref().map(|c| c.name().to_string()))
            .field("sinks", &self.sinks.len())
            .field("stats", &self.stats)
            .finish()
    }
}

impl DashboardCore {
    /// Build a core with no classifier and no sinks
    pub fn new(config: DashboardConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let session_id = Uuid::new_v4();
        let window = WindowStore::new(config.window_duration());

        log::info!(
            "Dashboard core {} created (window: {} min, slide step: {} min)",
            session_id,
            config.window_size_minutes,
            config.slide_step_minutes
        );

        Ok(Self {
            config,
            session_id,
            ingress: IngressQueue::new(),
            window,
            classifier: None,
            sinks: Vec::new(),
            state: CoreState::Idle,
            snapshot: Arc::new(Snapshot::idle(session_id)),
            last_label: None,
            stats: CoreStats::default(),
        })
    }

    pub fn with_classifier(mut self, classifier: Box<dyn Classifier>) -> Self {
        self.bind_classifier(Some(classifier));
        self
    }

    pub fn with_sink(mut self, sink: Box<dyn SnapshotSink>) -> Self {
        self.add_sink(sink);
        self
    }

    /// Bind, replace or unbind the classifier
    pub fn bind_classifier(&mut self, classifier: Option<Box<dyn Classifier>>) {
        match &classifier {
            Some(c) => log::info!("Classifier bound: {}", c.name()),
            None => log::info!("Classifier unbound - using advisory failure flags"),
        }
        self.classifier = classifier;
    }

    pub fn add_sink(&mut self, sink: Box<dyn SnapshotSink>) {
        self.sinks.push(sink);
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    /// Producer handle for transport callbacks
    pub fn ingress_handle(&self) -> IngressHandle {
        self.ingress.handle()
    }

    /// Enqueue directly (same as through a handle)
    pub fn enqueue(&self, record: Record) {
        self.ingress.enqueue(record);
    }

    /// Latest snapshot (placeholder until data arrives)
    pub fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&self.snapshot)
    }

    pub fn state(&self) -> CoreState {
        self.state
    }

    pub fn window(&self) -> &WindowStore {
        &self.window
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn has_classifier(&self) -> bool {
        self.classifier.is_some()
    }

    pub fn stats(&self) -> &CoreStats {
        &self.stats
    }

    pub fn ingress_stats(&self) -> IngressStats {
        self.ingress.stats()
    }

    // ------------------------------------------------------------------------
    // Update cycle
    // ------------------------------------------------------------------------

    /// Run one cycle over whatever is pending right now
    pub fn run_cycle(&mut self) -> CycleOutcome {
        let batch = self.ingress.drain_all();
        self.process_batch(batch)
    }

    /// Wait up to `timeout` for data, then run one cycle
    pub fn wait_and_run_cycle(&mut self, timeout: Duration) -> CycleOutcome {
        let batch = self.ingress.wait_drain(timeout);
        self.process_batch(batch)
    }

    fn process_batch(&mut self, batch: Vec<Record>) -> CycleOutcome {
        self.stats.cycles += 1;

        if batch.is_empty() {
            self.stats.idle_cycles += 1;
            return CycleOutcome::Unchanged;
        }

        let count = batch.len();
        for record in batch {
            self.window.insert(record);
        }
        self.stats.records_ingested += count as u64;

        if self.state == CoreState::Idle {
            self.state = CoreState::Streaming;
            log::info!("First telemetry received - streaming");
        }

        let evicted = self.window.evict_stale();
        self.stats.records_evicted += evicted as u64;

        let verdict = match self.window.latest().cloned() {
            Some(latest) => self.classify(&latest),
            None => Verdict::absent(),
        };
        self.track_label(&verdict);

        let snapshot = Arc::new(self.build_snapshot(verdict));
        log::debug!(
            "Cycle {}: +{} records, -{} evicted, window {}, verdict {:?}",
            self.stats.cycles,
            count,
            evicted,
            snapshot.records.len(),
            snapshot.verdict
        );

        self.publish(&snapshot);
        self.snapshot = Arc::clone(&snapshot);
        CycleOutcome::Updated(snapshot)
    }

    /// Feature extraction + classification. Any failure degrades to an
    /// absent verdict.
    fn classify(&mut self, latest: &Record) -> Verdict {
        let classifier = match self.classifier.as_ref() {
            Some(c) => c,
            None => return Verdict::absent(),
        };

        let features = match features::extract(latest) {
            Ok(features) => features,
            Err(e) => {
                log::warn!("Skipping prediction for {}: {}", latest.timestamp, e);
                self.stats.incomplete_records += 1;
                return Verdict::absent();
            }
        };

        log::debug!("Features: {:?}", features.named().collect::<Vec<_>>());

        let result = classifier.predict(&features).and_then(check_verdict);

        match result {
            Ok(verdict) => verdict,
            Err(e) => {
                log::warn!("Classifier '{}' failed: {}", classifier.name(), e);
                self.stats.classifier_failures += 1;
                Verdict::absent()
            }
        }
    }

    fn track_label(&mut self, verdict: &Verdict) {
        if verdict.is_failure() && self.last_label != Some(1) {
            log::warn!(
                "High risk of failure detected (probability {:.1}%)",
                verdict.probability.unwrap_or(0.0) * 100.0
            );
        } else if self.last_label == Some(1) && verdict.label == Some(0) {
            log::info!("System operating normally again");
        }
        if verdict.label.is_some() {
            self.last_label = verdict.label;
        }
    }

    fn build_snapshot(&self, verdict: Verdict) -> Snapshot {
        let records = self.window.all();

        let probability = metrics::failure_probability(&verdict, records);
        let range = metrics::temperature_range(records);
        let temperature_level = self
            .window
            .latest()
            .and_then(|r| r.temperature)
            .map(|t| TemperatureLevel::classify(t, &self.config));

        let classifier = if verdict.is_absent() {
            None
        } else {
            self.classifier.as_ref().map(|c| c.name().to_string())
        };

        Snapshot {
            session_id: self.session_id,
            cycle: self.stats.cycles,
            state: self.state,
            produced_at: Utc::now(),
            records: records.to_vec(),
            verdict,
            classifier,
            temperature_level,
            metrics: SummaryMetrics {
                energy_consumption: metrics::energy_consumption_wh(records),
                failure_probability: probability.map(|(p, _)| p),
                probability_source: probability.map(|(_, source)| source),
                temperature_min: range.map(|(lo, _)| lo),
                temperature_max: range.map(|(_, hi)| hi),
                record_count: records.len(),
            },
        }
    }

    fn publish(&mut self, snapshot: &Arc<Snapshot>) {
        for sink in self.sinks.iter_mut() {
            if let Err(e) = sink.publish(snapshot) {
                log::error!("Failed to publish snapshot {}: {}", snapshot.cycle, e);
                self.stats.sink_failures += 1;
            }
        }
    }
}

/// Reject verdicts with a label other than 0/1 or a probability outside [0, 1]
fn check_verdict(verdict: Verdict) -> Result<Verdict, ClassifierError> {
    if let Some(label) = verdict.label.filter(|&l| l > 1) {
        return Err(ClassifierError::Inference(format!("label {} is not 0 or 1", label)));
    }
    match verdict.probability {
        Some(p) if !(0.0..=1.0).contains(&p) => Err(ClassifierError::Inference(format!(
            "probability {} out of range",
            p
        ))),
        _ => Ok(verdict),
    }
}
