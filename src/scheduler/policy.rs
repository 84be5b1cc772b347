/*!
 * Ratio Policy
 *
 * Weighted alternation between two scheduling classes: up to `quota`
 * foreground dispatches in a row, then one background dispatch if any
 * background process is waiting.
 */

use super::cursor::RoamingCursor;
use crate::config::KernelConfig;
use crate::core::limits::{CURSOR_SCAN_PASSES, FOREGROUND_QUOTA};
use crate::core::types::SlotIndex;
use crate::process::{ProcessTable, SchedPolicy};
use serde::{Deserialize, Serialize};

/// Process picked for the next dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub slot: SlotIndex,
    pub class: SchedPolicy,
}

#[derive(Debug, Clone)]
pub struct RatioPolicy {
    foreground: RoamingCursor,
    background: RoamingCursor,
    /// Consecutive foreground dispatches since the last background one
    streak: u32,
    quota: u32,
    passes: u32,
}

impl Default for RatioPolicy {
    fn default() -> Self {
        Self::new(FOREGROUND_QUOTA, CURSOR_SCAN_PASSES)
    }
}

impl RatioPolicy {
    pub fn new(quota: u32, passes: u32) -> Self {
        Self {
            foreground: RoamingCursor::new(SchedPolicy::Foreground),
            background: RoamingCursor::new(SchedPolicy::Background),
            streak: 0,
            quota,
            passes,
        }
    }

    pub fn from_config(config: &KernelConfig) -> Self {
        Self::new(config.foreground_quota, config.scan_passes)
    }

    #[inline]
    pub fn streak(&self) -> u32 {
        self.streak
    }

    #[inline]
    pub fn quota(&self) -> u32 {
        self.quota
    }

    /// Run one selection round over `table`
    ///
    /// Returns `None` when neither class has a runnable process; the streak
    /// is left alone in that case.
    pub fn select(&mut self, table: &ProcessTable) -> Option<Choice> {
        let capacity = table.capacity();
        self.foreground.rewind_if_wrapped(capacity);
        self.background.rewind_if_wrapped(capacity);

        let fg = self.foreground.seek(table, self.passes);
        let bg = self.background.seek(table, self.passes);

        let choice = self.decide(fg, bg)?;
        match choice.class {
            SchedPolicy::Foreground => self.foreground.advance_past(choice.slot),
            SchedPolicy::Background => self.background.advance_past(choice.slot),
        }
        Some(choice)
    }

    fn decide(&mut self, fg: Option<SlotIndex>, bg: Option<SlotIndex>) -> Option<Choice> {
        match (fg, bg) {
            (Some(slot), _) if self.streak < self.quota => {
                self.streak += 1;
                Some(Choice {
                    slot,
                    class: SchedPolicy::Foreground,
                })
            }
            (_, Some(slot)) => {
                self.streak = 0;
                Some(Choice {
                    slot,
                    class: SchedPolicy::Background,
                })
            }
            (Some(slot), None) => Some(Choice {
                slot,
                class: SchedPolicy::Foreground,
            }),
            (None, None) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::ProcState;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn runnable_table(policies: &[SchedPolicy]) -> ProcessTable {
        let mut table = ProcessTable::new(policies.len());
        for (slot, policy) in policies.iter().enumerate() {
            table.claim().unwrap();
            let p = table.get_mut(slot).unwrap();
            p.state = ProcState::Runnable;
            p.policy = *policy;
        }
        table
    }

    #[test]
    fn test_nine_foreground_then_one_background() {
        use SchedPolicy::*;
        let table = runnable_table(&[Foreground, Foreground, Background]);
        let mut policy = RatioPolicy::default();

        let classes: Vec<_> = (0..10)
            .map(|_| policy.select(&table).unwrap().class)
            .collect();
        let mut expected = vec![Foreground; 9];
        expected.push(Background);
        assert_eq!(classes, expected);
        assert_eq!(policy.streak(), 0);
    }

    #[test]
    fn test_foreground_round_robin_without_background() {
        use SchedPolicy::*;
        let table = runnable_table(&[Foreground, Foreground, Foreground]);
        let mut policy = RatioPolicy::default();

        let slots: Vec<_> = (0..30).map(|_| policy.select(&table).unwrap().slot).collect();
        for (i, slot) in slots.iter().enumerate() {
            assert_eq!(*slot, i % 3);
        }
        assert_eq!(policy.streak(), 9);
    }

    #[test]
    fn test_background_only_resets_streak_each_time() {
        use SchedPolicy::*;
        let table = runnable_table(&[Background, Background]);
        let mut policy = RatioPolicy::default();

        let slots: Vec<_> = (0..4).map(|_| policy.select(&table).unwrap().slot).collect();
        assert_eq!(slots, vec![0, 1, 0, 1]);
        assert_eq!(policy.streak(), 0);
    }

    #[test]
    fn test_empty_round_keeps_streak() {
        let mut table = runnable_table(&[SchedPolicy::Foreground]);
        let mut policy = RatioPolicy::default();
        policy.select(&table).unwrap();

        table.get_mut(0).unwrap().state = ProcState::Running;
        assert_eq!(policy.select(&table), None);
        assert_eq!(policy.streak(), 1);
    }

    proptest! {
        #[test]
        fn prop_background_waits_at_most_quota(
            classes in proptest::collection::vec(any::<bool>(), 1..16),
            rounds in 1usize..200,
        ) {
            let policies: Vec<_> = classes
                .iter()
                .map(|bg| if *bg { SchedPolicy::Background } else { SchedPolicy::Foreground })
                .collect();
            let has_fg = policies.contains(&SchedPolicy::Foreground);
            let has_bg = policies.contains(&SchedPolicy::Background);
            let table = runnable_table(&policies);
            let mut policy = RatioPolicy::default();

            let mut run = 0u32;
            for _ in 0..rounds {
                let choice = policy.select(&table);
                prop_assert!(choice.is_some());
                let choice = choice.unwrap();
                prop_assert_eq!(policies[choice.slot], choice.class);

                if choice.class == SchedPolicy::Foreground {
                    run += 1;
                    if has_bg {
                        prop_assert!(run <= FOREGROUND_QUOTA);
                    }
                } else {
                    if has_fg {
                        prop_assert!(run == FOREGROUND_QUOTA || run == 0);
                    }
                    run = 0;
                }
            }
        }
    }
}
