//! Translation counters shared between the process callback and the control loop

use std::sync::atomic::{AtomicU64, Ordering};

use crate::translator::BlockReport;

/// Running totals, updated lock-free from the process callback
#[derive(Debug, Default)]
pub struct TranslationStats {
    blocks: AtomicU64,
    events: AtomicU64,
    emitted: AtomicU64,
    rejected: AtomicU64,
    malformed: AtomicU64,
    muted: AtomicU64,
}

/// Point-in-time copy of [`TranslationStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub blocks: u64,
    pub events: u64,
    pub emitted: u64,
    pub rejected: u64,
    pub malformed: u64,
    pub muted: u64,
}

impl TranslationStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold in one block's report
    pub fn record(&self, report: &BlockReport) {
        self.blocks.fetch_add(1, Ordering::Relaxed);
        if report.events == 0 {
            return;
        }
        self.events.fetch_add(report.events as u64, Ordering::Relaxed);
        self.emitted.fetch_add(report.emitted as u64, Ordering::Relaxed);
        self.rejected.fetch_add(report.rejected as u64, Ordering::Relaxed);
        self.malformed.fetch_add(report.malformed as u64, Ordering::Relaxed);
        self.muted.fetch_add(report.muted as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            blocks: self.blocks.load(Ordering::Relaxed),
            events: self.events.load(Ordering::Relaxed),
            emitted: self.emitted.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            malformed: self.malformed.load(Ordering::Relaxed),
            muted: self.muted.load(Ordering::Relaxed),
        }
    }
}

impl StatsSnapshot {
    /// Counts accumulated since `earlier`
    pub fn since(&self, earlier: &StatsSnapshot) -> StatsSnapshot {
        StatsSnapshot {
            blocks: self.blocks.saturating_sub(earlier.blocks),
            events: self.events.saturating_sub(earlier.events),
            emitted: self.emitted.saturating_sub(earlier.emitted),
            rejected: self.rejected.saturating_sub(earlier.rejected),
            malformed: self.malformed.saturating_sub(earlier.malformed),
            muted: self.muted.saturating_sub(earlier.muted),
        }
    }
}
