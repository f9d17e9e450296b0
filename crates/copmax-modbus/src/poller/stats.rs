// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Poller counters.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Lock-free counters for poll cycles, range reads and writes.
#[derive(Debug, Default)]
pub struct PollStats {
    cycles: AtomicU64,
    failed_cycles: AtomicU64,
    skipped_cycles: AtomicU64,
    reads_ok: AtomicU64,
    reads_failed: AtomicU64,
    writes_ok: AtomicU64,
    writes_rejected: AtomicU64,
    writes_unreachable: AtomicU64,
    connections: AtomicU64,
}

/// Point-in-time copy of [`PollStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PollStatsSnapshot {
    /// Completed poll cycles.
    pub cycles: u64,
    /// Cycles that ended with an unexpected error.
    pub failed_cycles: u64,
    /// Triggers dropped because a cycle was already running.
    pub skipped_cycles: u64,
    /// Range reads that returned the expected register count.
    pub reads_ok: u64,
    /// Range reads that failed for any reason.
    pub reads_failed: u64,
    /// Successful setpoint writes.
    pub writes_ok: u64,
    /// Writes refused by the device.
    pub writes_rejected: u64,
    /// Writes that never reached the device.
    pub writes_unreachable: u64,
    /// Sessions established.
    pub connections: u64,
}

impl PollStats {
    /// Creates zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_cycle(&self, ok: bool) {
        self.cycles.fetch_add(1, Ordering::Relaxed);
        if !ok {
            self.failed_cycles.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub(crate) fn record_skipped(&self) {
        self.skipped_cycles.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_read(&self, ok: bool) {
        let counter = if ok { &self.reads_ok } else { &self.reads_failed };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_write_ok(&self) {
        self.writes_ok.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_write_rejected(&self) {
        self.writes_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_write_unreachable(&self) {
        self.writes_unreachable.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_connection(&self) {
        self.connections.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns the number of completed cycles.
    pub fn cycles(&self) -> u64 {
        self.cycles.load(Ordering::Relaxed)
    }

    /// Returns the number of sessions established.
    pub fn connections(&self) -> u64 {
        self.connections.load(Ordering::Relaxed)
    }

    /// Returns the fraction of successful range reads (0.0 - 1.0).
    pub fn read_success_rate(&self) -> f64 {
        let ok = self.reads_ok.load(Ordering::Relaxed);
        let total = ok + self.reads_failed.load(Ordering::Relaxed);
        if total == 0 {
            return 1.0;
        }
        ok as f64 / total as f64
    }

    /// Copies all counters.
    pub fn snapshot(&self) -> PollStatsSnapshot {
        PollStatsSnapshot {
            cycles: self.cycles.load(Ordering::Relaxed),
            failed_cycles: self.failed_cycles.load(Ordering::Relaxed),
            skipped_cycles: self.skipped_cycles.load(Ordering::Relaxed),
            reads_ok: self.reads_ok.load(Ordering::Relaxed),
            reads_failed: self.reads_failed.load(Ordering::Relaxed),
            writes_ok: self.writes_ok.load(Ordering::Relaxed),
            writes_rejected: self.writes_rejected.load(Ordering::Relaxed),
            writes_unreachable: self.writes_unreachable.load(Ordering::Relaxed),
            connections: self.connections.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poll_stats() {
        let stats = PollStats::new();
        assert_eq!(stats.read_success_rate(), 1.0);

        stats.record_cycle(true);
        stats.record_cycle(false);
        stats.record_read(true);
        stats.record_read(true);
        stats.record_read(true);
        stats.record_read(false);
        stats.record_write_rejected();

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.cycles, 2);
        assert_eq!(snapshot.failed_cycles, 1);
        assert_eq!(snapshot.reads_ok, 3);
        assert_eq!(snapshot.writes_rejected, 1);
        assert_eq!(snapshot.writes_unreachable, 0);
        assert!((stats.read_success_rate() - 0.75).abs() < f64::EPSILON);
    }
}
