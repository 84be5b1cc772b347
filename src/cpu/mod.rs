/*!
 * Virtual CPU
 * The single CPU the scheduler runs on
 */

pub mod interrupts;

pub use interrupts::InterruptState;

use crate::core::types::SlotIndex;
use crate::process::Context;
use tracing::error;

/// Per-CPU state
#[derive(Debug, Default)]
pub struct Cpu {
    /// Slot of the process running on this CPU, if any
    pub current: Option<SlotIndex>,
    /// Saved context of the scheduler loop
    pub scheduler: Context,
    /// Live callee-saved registers of whichever unit holds the CPU
    pub regs: Context,
    pub interrupts: InterruptState,
}

impl Cpu {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Fatal kernel invariant violation
///
/// Never returns. The panic unwinds the offending execution unit and the
/// machine re-raises it from the scheduler, taking the whole system down.
#[track_caller]
pub fn kernel_panic(msg: &str) -> ! {
    error!(msg, "kernel panic");
    panic!("kernel panic: {msg}");
}
