/*!
 * Duet Kernel Library
 * Two-class ratio scheduler on a single virtual CPU
 */

pub mod config;
pub mod core;
pub mod cpu;
pub mod kernel;
pub(crate) mod machine;
pub mod memory;
pub mod monitoring;
pub mod process;
pub mod scheduler;
pub mod switch;
pub mod syscalls;
pub mod user;

// Re-exports
pub use config::KernelConfig;
pub use crate::core::errors::{Halted, KernelError, ProcessError, SchedulerError, SyscallError};
pub use crate::core::types::{Address, KernelResult, Pid, SlotIndex};
pub use kernel::{Kernel, KernelBuilder};
pub use machine::Unit;
pub use memory::{Page, PageAllocator, PagePool};
pub use monitoring::init_tracing;
pub use process::{
    AddressSpace, DirectoryResolver, InodeRef, ProcState, ProcessInfo, SchedPolicy, INITCODE,
};
pub use scheduler::{DispatchRecord, RunBudget, RunReport, SchedulerStats};
pub use user::{UserContext, UserProgram};
