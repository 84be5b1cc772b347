/*!
 * Lock-Free Scheduler Statistics
 * Uses atomic counters for zero-contention stats tracking in hot scheduling paths
 */

use super::types::SchedulerStats;
use crate::process::SchedPolicy;
use std::sync::atomic::{AtomicU64, Ordering};

/// Atomic scheduler statistics for lock-free updates
///
/// # Performance
/// - Cache-line aligned to prevent false sharing
/// - All operations use relaxed ordering for maximum performance
/// - Read-only snapshot requires no synchronization
#[repr(C, align(64))]
#[derive(Debug, Default)]
pub struct AtomicSchedulerStats {
    rounds: AtomicU64,
    idle_rounds: AtomicU64,
    foreground_dispatches: AtomicU64,
    background_dispatches: AtomicU64,
    context_switches: AtomicU64,
}

impl AtomicSchedulerStats {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment completed rounds (lock-free)
    ///
    /// # Performance
    /// Hot path - called once per scheduler round
    #[inline(always)]
    pub fn inc_rounds(&self) {
        self.rounds.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn inc_idle(&self) {
        self.idle_rounds.fetch_add(1, Ordering::Relaxed);
    }

    /// Count a dispatch for `class` (lock-free)
    ///
    /// # Performance
    /// Hot path - called on every dispatch
    #[inline(always)]
    pub fn inc_dispatch(&self, class: SchedPolicy) {
        let counter = match class {
            SchedPolicy::Foreground => &self.foreground_dispatches,
            SchedPolicy::Background => &self.background_dispatches,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment context switches (lock-free)
    ///
    /// # Performance
    /// Hot path - called on every context switch
    #[inline(always)]
    pub fn inc_context_switches(&self) {
        self.context_switches.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot of current stats
    ///
    /// # Note
    /// Counter values may not be perfectly consistent with each other due to concurrent updates,
    /// but each individual value is accurate. This is acceptable for monitoring.
    #[inline]
    pub fn snapshot(&self) -> SchedulerStats {
        SchedulerStats {
            rounds: self.rounds.load(Ordering::Relaxed),
            idle_rounds: self.idle_rounds.load(Ordering::Relaxed),
            foreground_dispatches: self.foreground_dispatches.load(Ordering::Relaxed),
            background_dispatches: self.background_dispatches.load(Ordering::Relaxed),
            context_switches: self.context_switches.load(Ordering::Relaxed),
        }
    }
}
