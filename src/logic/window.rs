//! Window Store - Timestamp-ordered sliding retention window
//!
//! Records are kept in ascending timestamp order. Eviction is anchored to
//! the newest timestamp in the store, never the wall clock, so replayed or
//! backfilled data slides exactly like a live feed.
//!
//! A live feed whose producer stalls never evicts: the anchor only moves
//! when newer data arrives.

use chrono::{DateTime, Duration, Utc};

use super::record::Record;

/// Sliding window of records
#[derive(Debug, Clone)]
pub struct WindowStore {
    records: Vec<Record>,
    retention: Duration,
}

impl WindowStore {
    pub fn new(retention: Duration) -> Self {
        Self {
            records: Vec::new(),
            retention,
        }
    }

    /// Store with retention in minutes
    pub fn with_minutes(minutes: u32) -> Self {
        Self::new(Duration::minutes(i64::from(minutes)))
    }

    pub fn retention(&self) -> Duration {
        self.retention
    }

    /// Insert keeping ascending order. Ties go after existing records
    /// with the same timestamp, so arrival order is kept.
    pub fn insert(&mut self, record: Record) {
        let index = self
            .records
            .partition_point(|r| r.timestamp <= record.timestamp);
        self.records.insert(index, record);
    }

    /// Remove every record older than `anchor - retention`.
    /// Returns how many were evicted. A cutoff before the earliest
    /// representable time evicts nothing.
    pub fn evict(&mut self, anchor: DateTime<Utc>) -> usize {
        let cutoff = match anchor.checked_sub_signed(self.retention) {
            Some(cutoff) => cutoff,
            None => return 0,
        };
        let stale = self.records.partition_point(|r| r.timestamp < cutoff);
        if stale > 0 {
            self.records.drain(..stale);
        }
        stale
    }

    /// Evict using the newest timestamp in the store as anchor
    pub fn evict_stale(&mut self) -> usize {
        match self.anchor() {
            Some(anchor) => self.evict(anchor),
            None => 0,
        }
    }

    /// Current anchor time (newest timestamp), if any
    pub fn anchor(&self) -> Option<DateTime<Utc>> {
        self.latest().map(|r| r.timestamp)
    }

    /// Newest record. With duplicate timestamps, the last one to arrive.
    pub fn latest(&self) -> Option<&Record> {
        self.records.last()
    }

    /// All retained records, oldest first
    pub fn all(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
