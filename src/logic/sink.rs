//! Snapshot Sinks - render collaborator adapters
//!
//! The core publishes every new snapshot to each registered sink.
//! A failing sink is logged by the core and never stops a cycle.

use std::io::Write;
use std::sync::Arc;

use crossbeam_channel::Sender;

use super::dashboard::Snapshot;

// ============================================================================
// ERROR HANDLING
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("render side disconnected")]
    Disconnected,
}

// ============================================================================
// SINK TRAIT
// ============================================================================

/// Receives snapshots from the processing thread
pub trait SnapshotSink: Send {
    fn publish(&mut self, snapshot: &Arc<Snapshot>) -> Result<(), SinkError>;
}

// ============================================================================
// JSONL SINK
// ============================================================================

/// One JSON object per line, flushed per snapshot
pub struct JsonlSink<W: Write + Send> {
    writer: W,
    written: u64,
}

impl<W: Write + Send> JsonlSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, written: 0 }
    }

    /// Snapshots written so far
    pub fn written(&self) -> u64 {
        self.written
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send> SnapshotSink for JsonlSink<W> {
    fn publish(&mut self, snapshot: &Arc<Snapshot>) -> Result<(), SinkError> {
        let line = serde_json::to_string(snapshot.as_ref())?;
        self.writer.write_all(line.as_bytes())?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        self.written += 1;
        Ok(())
    }
}

// ============================================================================
// CHANNEL SINK
// ============================================================================

/// Hands snapshots to a render thread
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: Sender<Arc<Snapshot>>,
}

impl ChannelSink {
    pub fn new(tx: Sender<Arc<Snapshot>>) -> Self {
        Self { tx }
    }
}

impl SnapshotSink for ChannelSink {
    fn publish(&mut self, snapshot: &Arc<Snapshot>) -> Result<(), SinkError> {
        self.tx
            .send(Arc::clone(snapshot))
            .map_err(|_| SinkError::Disconnected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_jsonl_sink_writes_lines() {
        let mut sink = JsonlSink::new(Vec::new());
        let snapshot = Arc::new(Snapshot::idle(Uuid::nil()));

        sink.publish(&snapshot).unwrap();
        sink.publish(&snapshot).unwrap();
        assert_eq!(sink.written(), 2);

        let output = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 2);
        let parsed: Snapshot = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(parsed.session_id, Uuid::nil());
    }

    #[test]
    fn test_channel_sink_disconnected() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let mut sink = ChannelSink::new(tx);
        let snapshot = Arc::new(Snapshot::idle(Uuid::nil()));

        sink.publish(&snapshot).unwrap();
        assert!(Arc::ptr_eq(&rx.recv().unwrap(), &snapshot));

        drop(rx);
        assert!(matches!(sink.publish(&snapshot), Err(SinkError::Disconnected)));
    }
}
