//! Logic Module - Telemetry pipeline
//!
//! Transport callbacks decode payloads and push `Record`s into the ingress
//! queue; the processing thread folds them into the window, classifies the
//! latest reading and publishes snapshots.
//!
//! ## Layout
//! - `decode` / `record` - inbound payloads and the record type
//! - `ingress` / `window` - queue handoff and time-bounded store
//! - `features/` / `model/` - feature vector and classifier port
//! - `dashboard/` - update cycle, metrics, snapshots
//! - `sink` / `runner` - snapshot delivery and the processing thread

pub mod config;
pub mod record;
pub mod decode;
pub mod ingress;
pub mod window;

pub mod features;
pub mod model;

pub mod dashboard;
pub mod sink;
pub mod runner;
