/*!
 * Syscalls Module
 * System call numbers, argument fetching, and dispatch
 */

pub mod args;
pub mod dispatch;
pub mod handlers;
pub mod types;

// Re-export for convenience
pub use args::{arg_int, fetch_int};
pub use handlers::{SchedulerHandler, SyscallHandler};
pub use types::{SyscallNumber, SYS_GET_SCHED_POLICY, SYS_SET_SCHED_POLICY, T_SYSCALL};
