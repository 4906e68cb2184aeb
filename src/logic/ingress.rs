//! Ingress Queue - Transport thread -> processing thread handoff
//!
//! Unbounded multi-producer channel. Producers get a cloneable
//! `IngressHandle`; the processing thread owns the `IngressQueue` and
//! drains it once per update cycle. Records are moved, never shared.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};

use super::record::Record;

// ============================================================================
// STATS
// ============================================================================

#[derive(Debug, Default)]
struct Counters {
    enqueued: AtomicU64,
    drained: AtomicU64,
}

/// Queue statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct IngressStats {
    pub enqueued: u64,
    pub drained: u64,
    pub pending: usize,
}

// ============================================================================
// PRODUCER SIDE
// ============================================================================

/// Producer handle, safe to clone into any number of transport callbacks
#[derive(Debug, Clone)]
pub struct IngressHandle {
    tx: Sender<Record>,
    counters: Arc<Counters>,
}

impl IngressHandle {
    /// Hand a decoded record to the processing thread. Never blocks.
    pub fn enqueue(&self, record: Record) {
        match self.tx.send(record) {
            Ok(()) => {
                self.counters.enqueued.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => {
                // Consumer is gone; nothing left to deliver to.
                log::debug!("Ingress closed, dropping record at {}", e.0.timestamp);
            }
        }
    }
}

// ============================================================================
// CONSUMER SIDE
// ============================================================================

/// Consumer end of the ingress channel
#[derive(Debug)]
pub struct IngressQueue {
    tx: Sender<Record>,
    rx: Receiver<Record>,
    counters: Arc<Counters>,
}

impl Default for IngressQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl IngressQueue {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self {
            tx,
            rx,
            counters: Arc::new(Counters::default()),
        }
    }

    /// New producer handle
    pub fn handle(&self) -> IngressHandle {
        IngressHandle {
            tx: self.tx.clone(),
            counters: Arc::clone(&self.counters),
        }
    }

    /// Enqueue from the consumer side (same semantics as `IngressHandle::enqueue`)
    pub fn enqueue(&self, record: Record) {
        if self.tx.send(record).is_ok() {
            self.counters.enqueued.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Remove and return everything currently buffered, in arrival order
    pub fn drain_all(&self) -> Vec<Record> {
        let records: Vec<Record> = self.rx.try_iter().collect();
        self.counters
            .drained
            .fetch_add(records.len() as u64, Ordering::Relaxed);
        records
    }

    /// Wait up to `timeout` for the first record, then drain the rest.
    /// Returns an empty batch on timeout.
    pub fn wait_drain(&self, timeout: Duration) -> Vec<Record> {
        match self.rx.recv_timeout(timeout) {
            Ok(first) => {
                let mut records = vec![first];
                records.extend(self.rx.try_iter());
                self.counters
                    .drained
                    .fetch_add(records.len() as u64, Ordering::Relaxed);
                records
            }
            // The queue holds its own sender, so disconnection cannot happen.
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => Vec::new(),
        }
    }

    /// Number of records waiting
    pub fn pending(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    pub fn stats(&self) -> IngressStats {
        IngressStats {
            enqueued: self.counters.enqueued.load(Ordering::Relaxed),
            drained: self.counters.drained.load(Ordering::Relaxed),
            pending: self.pending(),
        }
    }
}
