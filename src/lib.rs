//! Machine Monitor Core
//!
//! Sliding-window telemetry core for a live machine-health dashboard.

pub mod constants;
pub mod logic;

pub use logic::config::{ConfigError, DashboardConfig};
pub use logic::dashboard::{CoreState, CycleOutcome, DashboardCore, Snapshot};
pub use logic::decode::{DecodeError, Decoder};
pub use logic::ingress::IngressHandle;
pub use logic::model::{Classifier, ClassifierError, RuleClassifier, Verdict};
pub use logic::record::{Record, SensorField};
pub use logic::runner::{Runner, RunnerError, RunnerHandle};
pub use logic::sink::{ChannelSink, JsonlSink, SinkError, SnapshotSink};
