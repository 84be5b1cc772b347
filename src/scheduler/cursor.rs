/*!
 * Roaming Cursor
 * Per-class position in the process table that persists across rounds
 */

use crate::core::types::SlotIndex;
use crate::process::{ProcessTable, SchedPolicy};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoamingCursor {
    class: SchedPolicy,
    position: Option<SlotIndex>,
}

impl RoamingCursor {
    pub const fn new(class: SchedPolicy) -> Self {
        Self {
            class,
            position: None,
        }
    }

    #[inline]
    pub fn class(&self) -> SchedPolicy {
        self.class
    }

    #[inline]
    pub fn position(&self) -> Option<SlotIndex> {
        self.position
    }

    /// Reset to the table start when unset or past the end
    #[inline]
    pub fn rewind_if_wrapped(&mut self, capacity: usize) {
        match self.position {
            Some(pos) if pos < capacity => {}
            _ => self.position = Some(0),
        }
    }

    /// Scan forward for a runnable process of this cursor's class
    ///
    /// Bounded to `passes` wraps of the table. The cursor is left on the
    /// candidate, or unset when none was found.
    ///
    /// # Performance
    /// Hot path - at most `passes * capacity` slot checks per round
    pub fn seek(&mut self, table: &ProcessTable, passes: u32) -> Option<SlotIndex> {
        let capacity = table.capacity();
        if capacity == 0 {
            self.position = None;
            return None;
        }

        let mut pos = self.position.unwrap_or(0).min(capacity);
        let mut wraps = 0;
        while wraps < passes {
            if pos >= capacity {
                pos = 0;
                wraps += 1;
                continue;
            }
            if table.get(pos).is_some_and(|p| p.is_candidate(self.class)) {
                self.position = Some(pos);
                return Some(pos);
            }
            pos += 1;
        }

        self.position = None;
        None
    }

    /// Move one slot past a process that was just dispatched
    #[inline]
    pub fn advance_past(&mut self, slot: SlotIndex) {
        self.position = Some(slot + 1);
    }
}
