//! Dispatch counters.
//!
//! Plain relaxed atomics; a snapshot is only loosely consistent across
//! fields, which is fine for logging and tests.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

#[derive(Default)]
pub struct DispatchStats {
    popped: AtomicU64,
    correlated: AtomicU64,
    notified: AtomicU64,
    buffered: AtomicU64,
    dropped: AtomicU64,
    unrecognized: AtomicU64,
    empty: AtomicU64,
}

/// Point-in-time copy of [`DispatchStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    /// Native handles popped (and freed).
    pub popped: u64,
    /// Messages consumed by a pending request.
    pub correlated: u64,
    /// Messages delivered to a notification handler.
    pub notified: u64,
    /// Join intents parked in the pending slot.
    pub buffered: u64,
    /// Parsed messages nobody handled.
    pub dropped: u64,
    /// Tags neither the core table nor the extension hook knew.
    pub unrecognized: u64,
    /// Handles carrying the null tag.
    pub empty: u64,
}

impl DispatchStats {
    pub fn inc_popped(&self) {
        self.popped.fetch_add(1, Ordering::Relaxed);
    }
    pub fn inc_correlated(&self) {
        self.correlated.fetch_add(1, Ordering::Relaxed);
    }
    pub fn inc_notified(&self) {
        self.notified.fetch_add(1, Ordering::Relaxed);
    }
    pub fn inc_buffered(&self) {
        self.buffered.fetch_add(1, Ordering::Relaxed);
    }
    pub fn inc_dropped(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }
    pub fn inc_unrecognized(&self) {
        self.unrecognized.fetch_add(1, Ordering::Relaxed);
    }
    pub fn inc_empty(&self) {
        self.empty.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            popped: self.popped.load(Ordering::Relaxed),
            correlated: self.correlated.load(Ordering::Relaxed),
            notified: self.notified.load(Ordering::Relaxed),
            buffered: self.buffered.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            unrecognized: self.unrecognized.load(Ordering::Relaxed),
            empty: self.empty.load(Ordering::Relaxed),
        }
    }
}
