/*!
 * Syscall Handlers Module
 * Contains all syscall category handlers
 */

mod scheduler_handler;

pub use scheduler_handler::{sys_get_sched_policy, sys_set_sched_policy, SchedulerHandler};

use super::types::SyscallNumber;
use crate::process::Process;

/// A category of system calls
pub trait SyscallHandler: Send + Sync {
    /// Run `syscall` on behalf of `process`, or `None` if this handler does
    /// not own it. The value is the caller's return register.
    fn handle(&self, process: &mut Process, syscall: SyscallNumber) -> Option<i32>;

    fn name(&self) -> &'static str;
}
