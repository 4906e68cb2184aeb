//! Update cycle scenarios
//!
//! Drives the core end to end: ingress → window → classifier → snapshot → sinks.

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};

use super::*;
use crate::logic::features::FeatureVector;
use crate::logic::model::RuleClassifier;
use crate::logic::record::SensorField;
use crate::logic::sink::{ChannelSink, SinkError};

// ============================================================================
// FIXTURES
// ============================================================================

fn base() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 25, 0, 0, 0).unwrap()
}

fn reading(minute: i64) -> Record {
    Record::builder(base() + Duration::minutes(minute))
        .temperature(65.0)
        .vibration(0.5)
        .pressure(100.0)
        .motor_current(10.0)
        .power(2200.0)
        .build()
}

fn core() -> DashboardCore {
    DashboardCore::new(DashboardConfig::default()).unwrap()
}

/// Always returns the same verdict
struct FixedClassifier(Verdict);

impl Classifier for FixedClassifier {
    fn name(&self) -> &str {
        "fixed"
    }

    fn predict(&self, _features: &FeatureVector) -> Result<Verdict, ClassifierError> {
        Ok(self.0)
    }
}

/// Always fails
struct BrokenClassifier;

impl Classifier for BrokenClassifier {
    fn name(&self) -> &str {
        "broken"
    }

    fn predict(&self, _features: &FeatureVector) -> Result<Verdict, ClassifierError> {
        Err(ClassifierError::Inference("model crashed".to_string()))
    }
}

struct BrokenSink;

impl SnapshotSink for BrokenSink {
    fn publish(&mut self, _snapshot: &Arc<Snapshot>) -> Result<(), SinkError> {
        Err(SinkError::Disconnected)
    }
}

fn minutes(snapshot: &Snapshot) -> Vec<i64> {
    snapshot
        .records
        .iter()
        .map(|r| (r.timestamp - base()).num_minutes())
        .collect()
}

// ============================================================================
// IDLE / NO-OP
// ============================================================================

#[test]
fn test_empty_cycle_is_idle_placeholder() {
    let mut core = core();

    let outcome = core.run_cycle();
    assert!(!outcome.is_updated());
    assert_eq!(core.state(), CoreState::Idle);

    let snapshot = core.snapshot();
    assert!(snapshot.is_idle());
    assert!(snapshot.records.is_empty());
    assert!(snapshot.series(SensorField::Vibration).is_empty());
    assert_eq!(snapshot.metrics.failure_probability, None);
    assert_eq!(snapshot.metrics.energy_consumption, 0.0);
    assert!(snapshot.verdict.is_absent());
}

#[test]
fn test_empty_drain_keeps_previous_snapshot() {
    let mut core = core();
    core.enqueue(reading(0));
    let first = core.run_cycle();
    let first = first.snapshot().cloned().unwrap();

    let outcome = core.run_cycle();
    assert!(matches!(outcome, CycleOutcome::Unchanged));
    assert!(Arc::ptr_eq(&core.snapshot(), &first));
    assert_eq!(core.stats().idle_cycles, 1);
}

#[test]
fn test_idle_to_streaming_transition() {
    let mut core = core();
    assert_eq!(core.state(), CoreState::Idle);

    core.enqueue(reading(0));
    let outcome = core.run_cycle();
    assert!(outcome.is_updated());
    assert_eq!(core.state(), CoreState::Streaming);
    assert_eq!(core.snapshot().state, CoreState::Streaming);

    // Quiet cycles never go back to idle.
    core.run_cycle();
    assert_eq!(core.state(), CoreState::Streaming);
}

// ============================================================================
// WINDOW
// ============================================================================

#[test]
fn test_sliding_window_scenario() {
    let mut core = core();
    for minute in (0..=70).step_by(10) {
        core.enqueue(reading(minute));
        core.run_cycle();
    }

    assert_eq!(minutes(&core.snapshot()), vec![10, 20, 30, 40, 50, 60, 70]);
    assert_eq!(core.stats().records_evicted, 1);
}

#[test]
fn test_single_batch_out_of_order() {
    let mut core = core();
    for minute in [70, 0, 30, 10, 60, 20, 50, 40] {
        core.enqueue(reading(minute));
    }
    core.run_cycle();

    let snapshot = core.snapshot();
    assert_eq!(minutes(&snapshot), vec![10, 20, 30, 40, 50, 60, 70]);
    assert_eq!(
        snapshot.latest().map(|r| r.timestamp),
        Some(base() + Duration::minutes(70))
    );
}

#[test]
fn test_stalled_feed_never_evicts() {
    let mut core = core();
    core.enqueue(reading(0));
    core.run_cycle();

    // No new data: anchor does not move regardless of wall clock.
    for _ in 0..3 {
        core.run_cycle();
    }
    assert_eq!(core.window().len(), 1);
    assert_eq!(core.stats().records_evicted, 0);
}

// ============================================================================
// CLASSIFICATION & METRICS
// ============================================================================

#[test]
fn test_unbound_classifier_uses_advisory_flags() {
    let mut core = core();
    for (minute, flag) in [(0, false), (1, false), (2, true), (3, false)] {
        let mut record = reading(minute);
        record.failure = Some(flag);
        core.enqueue(record);
    }
    core.run_cycle();

    let snapshot = core.snapshot();
    assert!(snapshot.verdict.is_absent());
    assert_eq!(snapshot.metrics.failure_probability, Some(25.0));
    assert_eq!(
        snapshot.metrics.probability_source,
        Some(ProbabilitySource::AdvisoryFlags)
    );
    assert_eq!(snapshot.classifier, None);
}

#[test]
fn test_bound_classifier_verdict_is_passed_through() {
    let mut core = core().with_classifier(Box::new(FixedClassifier(Verdict::new(1, 0.82))));
    for (minute, flag) in [(0, false), (1, false), (2, false)] {
        let mut record = reading(minute);
        record.failure = Some(flag);
        core.enqueue(record);
    }
    core.run_cycle();

    let snapshot = core.snapshot();
    assert_eq!(snapshot.verdict, Verdict::new(1, 0.82));
    assert_eq!(snapshot.classifier.as_deref(), Some("fixed"));
    assert_eq!(
        snapshot.metrics.probability_source,
        Some(ProbabilitySource::Classifier)
    );
    let p = snapshot.metrics.failure_probability.unwrap();
    assert!((p - 82.0).abs() < 1e-9);
}

#[test]
fn test_classifier_failure_degrades_to_absent() {
    let mut core = core().with_classifier(Box::new(BrokenClassifier));
    let mut record = reading(0);
    record.failure = Some(true);
    core.enqueue(record);

    let outcome = core.run_cycle();
    assert!(outcome.is_updated());

    let snapshot = core.snapshot();
    assert!(snapshot.verdict.is_absent());
    assert_eq!(snapshot.metrics.failure_probability, Some(100.0));
    assert_eq!(snapshot.records.len(), 1);
    assert_eq!(core.stats().classifier_failures, 1);
}

#[test]
fn test_incomplete_record_skips_prediction() {
    let mut core = core().with_classifier(Box::new(FixedClassifier(Verdict::new(1, 0.9))));
    let mut record = reading(0);
    record.pressure = None;
    core.enqueue(record);
    core.run_cycle();

    let snapshot = core.snapshot();
    assert!(snapshot.verdict.is_absent());
    assert_eq!(snapshot.metrics.failure_probability, None);
    assert_eq!(core.stats().incomplete_records, 1);
    assert_eq!(core.window().len(), 1);
}

#[test]
fn test_out_of_range_probability_rejected() {
    let mut core = core().with_classifier(Box::new(FixedClassifier(Verdict::new(1, 1.5))));
    core.enqueue(reading(0));
    core.run_cycle();

    assert!(core.snapshot().verdict.is_absent());
    assert_eq!(core.stats().classifier_failures, 1);
}

#[test]
fn test_unknown_label_rejected() {
    let mut core = core().with_classifier(Box::new(FixedClassifier(Verdict::new(7, 0.9))));
    core.enqueue(reading(0));
    core.run_cycle();

    let snapshot = core.snapshot();
    assert!(snapshot.verdict.is_absent());
    assert_eq!(snapshot.classifier, None);
    assert_eq!(core.stats().classifier_failures, 1);
}

#[test]
fn test_earliest_timestamp_keeps_cycle_alive() {
    let payload = format!(
        r#"{{"timestamp": {}, "power": 1.0}}"#,
        DateTime::<Utc>::MIN_UTC.timestamp()
    );
    let record = crate::logic::decode::decode(payload.as_bytes()).unwrap();

    let mut core = core();
    core.enqueue(record);
    assert!(core.run_cycle().is_updated());
    assert_eq!(core.window().len(), 1);

    core.enqueue(reading(0));
    assert!(core.run_cycle().is_updated());
    assert_eq!(minutes(&core.snapshot()), vec![0]);
}

#[test]
fn test_prediction_uses_latest_record_only() {
    let mut core = core().with_classifier(Box::new(RuleClassifier::default()));

    // Older hot reading, newest one is normal.
    let mut hot = reading(0);
    hot.temperature = Some(150.0);
    core.enqueue(hot);
    core.enqueue(reading(1));
    core.run_cycle();

    assert_eq!(core.snapshot().verdict, Verdict::new(0, 0.0));
}

#[test]
fn test_energy_three_record_fixture() {
    let mut core = core();
    let records = [(0, 1000.0), (60, 1200.0), (180, 900.0)];
    for (secs, power) in records {
        core.enqueue(
            Record::builder(base() + Duration::seconds(secs))
                .power(power)
                .build(),
        );
    }
    core.run_cycle();

    // 1200 W * 60 s + 900 W * 120 s = 180 000 Ws = 50 Wh
    let energy = core.snapshot().metrics.energy_consumption;
    assert!((energy - 50.0).abs() < 1e-9);
}

#[test]
fn test_temperature_summary() {
    let mut core = core();
    for (minute, temperature) in [(0, 55.0), (1, 85.0), (2, 70.0)] {
        let mut record = reading(minute);
        record.temperature = Some(temperature);
        core.enqueue(record);
    }
    core.run_cycle();

    let snapshot = core.snapshot();
    assert_eq!(snapshot.temperature_level, Some(TemperatureLevel::Warning));
    assert_eq!(snapshot.metrics.temperature_min, Some(55.0));
    assert_eq!(snapshot.metrics.temperature_max, Some(85.0));
    assert_eq!(snapshot.series(SensorField::Temperature).len(), 3);
}

// ============================================================================
// PUBLISHING
// ============================================================================

#[test]
fn test_snapshots_published_to_every_sink() {
    let (tx, rx) = crossbeam_channel::unbounded();
    let mut core = core()
        .with_sink(Box::new(BrokenSink))
        .with_sink(Box::new(ChannelSink::new(tx)));

    core.enqueue(reading(0));
    core.run_cycle();
    core.run_cycle();
    core.enqueue(reading(1));
    core.run_cycle();

    let published: Vec<Arc<Snapshot>> = rx.try_iter().collect();
    assert_eq!(published.len(), 2);
    assert_eq!(published[0].records.len(), 1);
    assert_eq!(published[1].records.len(), 2);
    assert!(published[0].cycle < published[1].cycle);
    assert_eq!(core.stats().sink_failures, 2);
}

#[test]
fn test_concurrent_producers_feed_one_core() {
    let mut core = core();
    let producers: Vec<_> = (0..4)
        .map(|p| {
            let handle = core.ingress_handle();
            std::thread::spawn(move || {
                for i in 0..50 {
                    handle.enqueue(reading(p * 50 + i));
                }
            })
        })
        .collect();
    for producer in producers {
        producer.join().unwrap();
    }

    core.run_cycle();
    let snapshot = core.snapshot();

    // 200 one-minute records, newest at minute 199: 60-minute window keeps 139..=199.
    assert_eq!(snapshot.records.len(), 61);
    assert!(snapshot
        .records
        .windows(2)
        .all(|w| w[0].timestamp <= w[1].timestamp));
    assert_eq!(core.stats().records_ingested, 200);
    assert_eq!(core.ingress_stats().pending, 0);
}

#[test]
fn test_invalid_config_rejected() {
    let result = DashboardCore::new(DashboardConfig::with_window_minutes(0));
    assert!(result.is_err());
}
