/*!
 * Scheduler Syscall Handler
 * Handles scheduling-policy syscalls for the calling process
 */

use super::SyscallHandler;
use crate::core::errors::SyscallError;
use crate::process::{Process, SchedPolicy};
use crate::syscalls::args::arg_int;
use crate::syscalls::types::SyscallNumber;
use tracing::debug;

/// Handler for scheduler syscalls
#[derive(Debug, Default, Clone, Copy)]
pub struct SchedulerHandler;

impl SyscallHandler for SchedulerHandler {
    #[inline]
    fn handle(&self, process: &mut Process, syscall: SyscallNumber) -> Option<i32> {
        match syscall {
            SyscallNumber::GetSchedPolicy => Some(sys_get_sched_policy(process)),
            SyscallNumber::SetSchedPolicy => {
                Some(sys_set_sched_policy(process).map_or_else(|e| e.errno(), |()| 0))
            }
        }
    }

    #[inline]
    fn name(&self) -> &'static str {
        "scheduler_handler"
    }
}

/// Current policy of the caller; cannot fail
pub fn sys_get_sched_policy(process: &Process) -> i32 {
    process.policy().as_raw()
}

/// Change the caller's policy to argument 0
///
/// Only 0 (foreground) and 1 (background) are accepted. A rejected call
/// leaves the policy untouched.
pub fn sys_set_sched_policy(process: &mut Process) -> Result<(), SyscallError> {
    let raw = arg_int(process, 0)?;
    let policy = SchedPolicy::from_raw(raw)
        .ok_or_else(|| SyscallError::invalid_argument(format!("scheduling policy {raw}")))?;

    debug!(pid = process.pid(), from = %process.policy(), to = %policy, "set_sched_policy");
    process.policy = policy;
    Ok(())
}
