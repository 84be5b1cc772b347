/*!
 * Scheduler Types
 * Run budgets, reports, and statistics
 */

use crate::core::types::{Pid, SlotIndex};
use crate::process::SchedPolicy;
use serde::{Deserialize, Serialize};

/// How long a scheduler loop keeps going
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunBudget {
    /// Until the machine halts
    Forever,
    /// A fixed number of rounds, idle ones included
    Rounds(u64),
    /// Until this many processes have been dispatched
    Dispatches(u64),
}

impl RunBudget {
    #[inline]
    pub(crate) fn exhausted(&self, report: &RunReport) -> bool {
        match *self {
            Self::Forever => false,
            Self::Rounds(n) => report.rounds >= n,
            Self::Dispatches(n) => report.dispatches() >= n,
        }
    }
}

/// Counters for a single scheduler loop invocation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub rounds: u64,
    pub idle_rounds: u64,
    pub foreground_dispatches: u64,
    pub background_dispatches: u64,
}

impl RunReport {
    #[inline]
    pub fn dispatches(&self) -> u64 {
        self.foreground_dispatches + self.background_dispatches
    }
}

/// One dispatch decision, in the order it was made
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchRecord {
    pub round: u64,
    pub pid: Pid,
    pub slot: SlotIndex,
    pub class: SchedPolicy,
}

/// Lifetime scheduler statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerStats {
    pub rounds: u64,
    pub idle_rounds: u64,
    pub foreground_dispatches: u64,
    pub background_dispatches: u64,
    pub context_switches: u64,
}

impl SchedulerStats {
    #[inline]
    pub fn dispatches(&self) -> u64 {
        self.foreground_dispatches + self.background_dispatches
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_budget_exhaustion() {
        let report = RunReport {
            rounds: 5,
            idle_rounds: 2,
            foreground_dispatches: 2,
            background_dispatches: 1,
        };
        assert!(!RunBudget::Forever.exhausted(&report));
        assert!(RunBudget::Rounds(5).exhausted(&report));
        assert!(!RunBudget::Rounds(6).exhausted(&report));
        assert!(RunBudget::Dispatches(3).exhausted(&report));
        assert!(!RunBudget::Dispatches(4).exhausted(&report));
    }
}
