/*!
 * Error Types
 * Centralized error handling with thiserror, miette, and serde support
 */

use crate::core::data_structures::InlineString;
use crate::core::limits::{EINVAL, SYSCALL_FAILURE};
use crate::core::types::{Address, Pid};
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Process lifecycle errors with serialization support
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum ProcessError {
    #[error("Process table exhausted: all {capacity} slots are in use")]
    #[diagnostic(
        code(process::resource_exhausted),
        help("Every slot is occupied. Process creation must be treated as failed.")
    )]
    ResourceExhausted { capacity: usize },

    #[error("Out of kernel memory while creating process {pid}")]
    #[diagnostic(
        code(process::out_of_memory),
        help("The kernel page pool is empty. The slot was released back to the table.")
    )]
    OutOfMemory { pid: Pid },
}

/// Syscall errors, reported to user mode as negative return codes
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum SyscallError {
    #[error("Invalid argument: {0}")]
    #[diagnostic(code(syscall::invalid_argument))]
    InvalidArgument(InlineString),

    #[error("Could not fetch argument {index} at user address {address:#x}")]
    #[diagnostic(
        code(syscall::argument_fetch),
        help("The argument lies outside the calling process's memory.")
    )]
    ArgumentFetch { index: usize, address: Address },
}

impl SyscallError {
    #[inline]
    pub fn invalid_argument(msg: impl Into<InlineString>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Return code handed back to the user-mode caller
    #[inline]
    #[must_use]
    pub const fn errno(&self) -> i32 {
        match self {
            Self::InvalidArgument(_) => -EINVAL,
            Self::ArgumentFetch { .. } => SYSCALL_FAILURE,
        }
    }
}

/// Scheduler-related errors with serialization support
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum SchedulerError {
    #[error("A scheduler loop is already running on this CPU")]
    #[diagnostic(
        code(scheduler::already_running),
        help("There is exactly one virtual CPU. Run a single scheduler loop at a time.")
    )]
    AlreadyRunning,
}

/// The virtual CPU was halted while an execution unit was parked in a handoff
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Diagnostic)]
#[error("Virtual CPU halted")]
#[diagnostic(code(cpu::halted))]
pub struct Halted;

/// Unified kernel error type with miette diagnostics
#[derive(Error, Debug, Diagnostic)]
pub enum KernelError {
    #[error("Process error: {0}")]
    #[diagnostic(transparent)]
    Process(#[from] ProcessError),

    #[error("Syscall error: {0}")]
    #[diagnostic(transparent)]
    Syscall(#[from] SyscallError),

    #[error("Scheduler error: {0}")]
    #[diagnostic(transparent)]
    Scheduler(#[from] SchedulerError),

    #[error("{0}")]
    #[diagnostic(transparent)]
    Halted(#[from] Halted),

    #[error("Configuration error: {0}")]
    #[diagnostic(
        code(kernel::configuration_error),
        help("Invalid configuration. Review the KERNEL_* environment variables.")
    )]
    Configuration(InlineString),
}

impl KernelError {
    #[inline]
    pub fn configuration(msg: impl Into<InlineString>) -> Self {
        Self::Configuration(msg.into())
    }
}
