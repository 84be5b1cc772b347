/*!
 * Syscall Dispatch
 * Routes a trapped system call to its handler and writes the return value
 */

use super::handlers::{SchedulerHandler, SyscallHandler};
use super::types::SyscallNumber;
use crate::core::limits::SYSCALL_FAILURE;
use crate::cpu::kernel_panic;
use crate::machine::Machine;
use tracing::{trace, warn};

const HANDLERS: &[&dyn SyscallHandler] = &[&SchedulerHandler];

/// Handle the system call of the process running on the CPU
///
/// The number is read from `eax` of its trap frame and the result is
/// written back to `eax`. Unknown numbers return -1.
pub(crate) fn syscall(m: &mut Machine) {
    let Some(slot) = m.cpu.current else {
        kernel_panic("syscall: no current process");
    };
    let Some(process) = m.table.get_mut(slot) else {
        kernel_panic("syscall: current slot out of range");
    };

    let num = process.trap_frame.eax;
    let ret = SyscallNumber::from_raw(num).and_then(|syscall| {
        HANDLERS.iter().find_map(|handler| {
            let ret = handler.handle(process, syscall)?;
            trace!(pid = process.pid(), %syscall, handler = handler.name(), ret, "syscall");
            Some(ret)
        })
    });

    let ret = ret.unwrap_or_else(|| {
        warn!(pid = process.pid(), name = process.name(), num, "unknown sys call");
        SYSCALL_FAILURE
    });
    process.trap_frame.eax = ret as u32;
}
