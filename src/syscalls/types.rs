/*!
 * Syscall Types
 * Syscall numbers and the trap vector used to enter the kernel
 */

use serde::{Deserialize, Serialize};
use std::fmt;

/// Trap vector for system calls
pub const T_SYSCALL: u32 = 64;

pub const SYS_GET_SCHED_POLICY: u32 = 22;
pub const SYS_SET_SCHED_POLICY: u32 = 23;

/// System calls understood by the kernel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyscallNumber {
    GetSchedPolicy,
    SetSchedPolicy,
}

impl SyscallNumber {
    #[inline]
    pub const fn from_raw(num: u32) -> Option<Self> {
        match num {
            SYS_GET_SCHED_POLICY => Some(Self::GetSchedPolicy),
            SYS_SET_SCHED_POLICY => Some(Self::SetSchedPolicy),
            _ => None,
        }
    }

    #[inline]
    pub const fn as_raw(self) -> u32 {
        match self {
            Self::GetSchedPolicy => SYS_GET_SCHED_POLICY,
            Self::SetSchedPolicy => SYS_SET_SCHED_POLICY,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::GetSchedPolicy => "get_sched_policy",
            Self::SetSchedPolicy => "set_sched_policy",
        }
    }
}

impl fmt::Display for SyscallNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
