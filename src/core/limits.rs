/*!
 * System Limits and Constants
 *
 * Centralized location for all system-wide limits, thresholds, and magic numbers.
 * Organized by domain for maintainability and discoverability.
 */

// =============================================================================
// PROCESS TABLE
// =============================================================================

/// Number of slots in the process table (NPROC)
pub const MAX_PROCESSES: usize = 64;

/// First process id handed out after boot
pub const FIRST_PID: u32 = 1;

/// Process name capacity including the terminator, names keep at most 15 bytes
pub const PROC_NAME_LEN: usize = 16;

/// Name given to the bootstrap process
pub const BOOTSTRAP_NAME: &str = "initcode";

// =============================================================================
// KERNEL MEMORY
// =============================================================================

/// Size of one kernel memory block (one page)
pub const PAGE_SIZE: usize = 4096;

/// Kernel stack reserved at the top of every process block
pub const KSTACK_SIZE: usize = 1024;

/// Bytes of user memory below the kernel stack in a process block
pub const USER_MEMORY_SIZE: usize = PAGE_SIZE - KSTACK_SIZE;

/// Default number of pages in the kernel page pool (one per slot)
pub const DEFAULT_PAGE_POOL: usize = MAX_PROCESSES;

// =============================================================================
// SCHEDULER
// =============================================================================

/// Consecutive foreground dispatches allowed before a waiting background
/// process must be dispatched
pub const FOREGROUND_QUOTA: u32 = 9;

/// Maximum full passes a roaming cursor makes over the table per round
pub const CURSOR_SCAN_PASSES: u32 = 2;

/// Fewest passes that still reach every slot from any cursor position
pub const MIN_SCAN_PASSES: u32 = 2;

/// Rounds the kernel binary runs before halting
pub const DEFAULT_RUN_ROUNDS: u64 = 1000;

// =============================================================================
// X86 SEGMENTS AND FLAGS
// =============================================================================

/// User code segment index in the GDT
pub const SEG_UCODE: u32 = 3;

/// User data segment index in the GDT
pub const SEG_UDATA: u32 = 4;

/// User privilege level
pub const DPL_USER: u32 = 3;

// =============================================================================
// SYSCALL RETURN CODES
// =============================================================================

/// Invalid argument [LINUX-COMPAT]
pub const EINVAL: i32 = 22;

/// Generic failure, also used when an argument cannot be fetched
pub const SYSCALL_FAILURE: i32 = -1;
