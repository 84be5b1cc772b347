/*!
 * Core Types
 * Common types used across the kernel
 */

/// Process ID type
pub type Pid = u32;

/// Index of a slot in the process table
pub type SlotIndex = usize;

/// Virtual address (32-bit register width)
pub type Address = u32;

/// Common result type for kernel operations
pub type KernelResult<T> = Result<T, super::errors::KernelError>;
