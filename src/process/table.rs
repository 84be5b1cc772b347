/*!
 * Process Table
 * Fixed array of process slots plus the process id counter
 */

use super::types::{ProcState, Process, ProcessResult};
use crate::core::errors::ProcessError;
use crate::core::limits::FIRST_PID;
use crate::core::types::{Pid, SlotIndex};

/// Fixed-capacity process table
///
/// Slot indices are stable for the lifetime of the table; a slot is reused
/// only after it returns to `Unused`.
#[derive(Debug)]
pub struct ProcessTable {
    slots: Vec<Process>,
    next_pid: Pid,
}

impl ProcessTable {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: (0..capacity).map(|_| Process::unused()).collect(),
            next_pid: FIRST_PID,
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Id the next successful claim will receive
    #[inline]
    pub fn next_pid(&self) -> Pid {
        self.next_pid
    }

    /// Claim the lowest-index unused slot
    ///
    /// The slot becomes `Embryo` with a fresh id. A full table is left
    /// untouched and no id is consumed.
    pub fn claim(&mut self) -> ProcessResult<(SlotIndex, Pid)> {
        let capacity = self.capacity();
        let slot = self
            .slots
            .iter()
            .position(Process::is_unused)
            .ok_or(ProcessError::ResourceExhausted { capacity })?;

        let pid = self.next_pid;
        self.next_pid += 1;

        let process = &mut self.slots[slot];
        process.state = ProcState::Embryo;
        process.pid = pid;
        Ok((slot, pid))
    }

    /// Return a slot to `Unused`, clearing everything it held
    pub fn release(&mut self, slot: SlotIndex) -> Option<Process> {
        let process = self.slots.get_mut(slot)?;
        Some(std::mem::replace(process, Process::unused()))
    }

    #[inline]
    pub fn get(&self, slot: SlotIndex) -> Option<&Process> {
        self.slots.get(slot)
    }

    #[inline]
    pub fn get_mut(&mut self, slot: SlotIndex) -> Option<&mut Process> {
        self.slots.get_mut(slot)
    }

    /// Slot of the live process with `pid`
    pub fn find(&self, pid: Pid) -> Option<SlotIndex> {
        self.slots
            .iter()
            .position(|p| !p.is_unused() && p.pid == pid)
    }

    pub fn iter(&self) -> impl Iterator<Item = (SlotIndex, &Process)> {
        self.slots.iter().enumerate()
    }

    pub fn count_in(&self, state: ProcState) -> usize {
        self.slots.iter().filter(|p| p.state == state).count()
    }
}
