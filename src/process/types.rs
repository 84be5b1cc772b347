/*!
 * Process Types
 * Process control block and the values the scheduler reads from it
 */

use super::block::KernelBlock;
use super::context::{Context, TrapFrame};
use super::traits::InodeRef;
use crate::core::data_structures::InlineString;
use crate::core::errors::ProcessError;
use crate::core::types::{Pid, SlotIndex};
use crate::user::UserProgram;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Process operation result
pub type ProcessResult<T> = Result<T, ProcessError>;

/// Process state
///
/// `Sleeping` and `Zombie` are reserved for collaborators outside the
/// scheduling core. Nothing here produces them and the scheduler never
/// selects them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcState {
    Unused,
    Embryo,
    Sleeping,
    Runnable,
    Running,
    Zombie,
}

impl ProcState {
    /// Fixed-width label used by the process dump
    #[inline]
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Unused => "unused",
            Self::Embryo => "embryo",
            Self::Runnable => "runble",
            Self::Running => "run   ",
            Self::Sleeping | Self::Zombie => "???",
        }
    }
}

/// Scheduling class
#[repr(i32)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedPolicy {
    #[default]
    Foreground = 0,
    Background = 1,
}

impl SchedPolicy {
    /// Decode the integer form used at the syscall boundary
    #[inline]
    #[must_use]
    pub const fn from_raw(raw: i32) -> Option<Self> {
        match raw {
            0 => Some(Self::Foreground),
            1 => Some(Self::Background),
            _ => None,
        }
    }

    #[inline(always)]
    #[must_use]
    pub const fn as_raw(self) -> i32 {
        self as i32
    }

    #[inline]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Foreground => "foreground",
            Self::Background => "background",
        }
    }
}

impl fmt::Display for SchedPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Process control block: one slot of the process table
pub struct Process {
    pub(crate) pid: Pid,
    pub(crate) state: ProcState,
    pub(crate) policy: SchedPolicy,
    /// Bytes of user memory (addressSpaceSize)
    pub(crate) size: usize,
    /// Kernel block holding user memory, kernel stack, trap frame and context
    pub(crate) block: Option<KernelBlock>,
    pub(crate) trap_frame: TrapFrame,
    pub(crate) context: Context,
    pub(crate) name: InlineString,
    pub(crate) cwd: Option<InodeRef>,
    /// User-mode behaviour, handed to the execution unit on first dispatch
    pub(crate) program: Option<Box<dyn UserProgram>>,
}

impl Process {
    pub(crate) fn unused() -> Self {
        Self {
            pid: 0,
            state: ProcState::Unused,
            policy: SchedPolicy::Foreground,
            size: 0,
            block: None,
            trap_frame: TrapFrame::default(),
            context: Context::default(),
            name: InlineString::new(),
            cwd: None,
            program: None,
        }
    }

    #[inline(always)]
    pub fn pid(&self) -> Pid {
        self.pid
    }

    #[inline(always)]
    pub fn state(&self) -> ProcState {
        self.state
    }

    #[inline(always)]
    pub fn policy(&self) -> SchedPolicy {
        self.policy
    }

    #[inline]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    #[inline(always)]
    pub fn is_unused(&self) -> bool {
        matches!(self.state, ProcState::Unused)
    }

    /// Check if the scheduler may pick this process for `class`
    ///
    /// # Performance
    /// Hot path - evaluated for every slot a roaming cursor visits
    #[inline(always)]
    pub fn is_candidate(&self, class: SchedPolicy) -> bool {
        self.state == ProcState::Runnable && self.policy == class
    }

    /// User memory of this process, empty before its block is reserved
    pub(crate) fn user_memory(&self) -> &[u8] {
        self.block
            .as_ref()
            .map(|block| block.user_memory(self.size))
            .unwrap_or(&[])
    }

    pub(crate) fn user_memory_mut(&mut self) -> &mut [u8] {
        let size = self.size;
        match self.block.as_mut() {
            Some(block) => block.user_memory_mut(size),
            None => &mut [],
        }
    }

    pub(crate) fn info(&self, slot: SlotIndex) -> ProcessInfo {
        ProcessInfo {
            pid: self.pid,
            slot,
            name: self.name.clone(),
            state: self.state,
            policy: self.policy,
            size: self.size,
            cwd: self.cwd,
        }
    }
}

impl fmt::Debug for Process {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Process")
            .field("pid", &self.pid)
            .field("state", &self.state)
            .field("policy", &self.policy)
            .field("size", &self.size)
            .field("name", &self.name)
            .field("context", &self.context)
            .field("has_program", &self.program.is_some())
            .finish()
    }
}

/// Read-only snapshot of a slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ProcessInfo {
    pub pid: Pid,
    pub slot: SlotIndex,
    pub name: InlineString,
    pub state: ProcState,
    pub policy: SchedPolicy,
    pub size: usize,
    pub cwd: Option<InodeRef>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_raw_round_trip() {
        assert_eq!(SchedPolicy::from_raw(0), Some(SchedPolicy::Foreground));
        assert_eq!(SchedPolicy::from_raw(1), Some(SchedPolicy::Background));
        assert_eq!(SchedPolicy::from_raw(2), None);
        assert_eq!(SchedPolicy::from_raw(-1), None);
        assert_eq!(SchedPolicy::Background.as_raw(), 1);
    }

    #[test]
    fn test_state_labels_are_fixed_width() {
        for state in [
            ProcState::Unused,
            ProcState::Embryo,
            ProcState::Runnable,
            ProcState::Running,
        ] {
            assert_eq!(state.label().len(), 6);
        }
        assert_eq!(ProcState::Sleeping.label(), "???");
        assert_eq!(ProcState::Zombie.label(), "???");
    }

    #[test]
    fn test_candidate_requires_runnable_and_class() {
        let mut p = Process::unused();
        assert!(!p.is_candidate(SchedPolicy::Foreground));

        p.state = ProcState::Runnable;
        assert!(p.is_candidate(SchedPolicy::Foreground));
        assert!(!p.is_candidate(SchedPolicy::Background));

        p.state = ProcState::Running;
        assert!(!p.is_candidate(SchedPolicy::Foreground));
    }
}
