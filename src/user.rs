/*!
 * User Mode
 *
 * A process's user-mode behaviour is a [`UserProgram`]. Programs talk to
 * the kernel only through their [`UserContext`]: system calls trap with
 * arguments pushed on the user stack, and `yield_now` stands in for the
 * timer interrupt that would hand the CPU back to the scheduler.
 */

use crate::core::errors::Halted;
use crate::core::limits::SYSCALL_FAILURE;
use crate::core::types::{Address, Pid, SlotIndex};
use crate::machine::Shared;
use crate::switch;
use crate::syscalls::{dispatch, SYS_GET_SCHED_POLICY, SYS_SET_SCHED_POLICY, T_SYSCALL};
use std::fmt;
use std::sync::Arc;

/// Return address pushed below syscall arguments, never jumped to
const FAKE_RETURN: u32 = 0xffff_ffff;

/// User-mode code of a process
///
/// `run` is entered on the first return to user mode. Propagate the
/// `Halted` from `yield_now` to stop when the machine halts.
pub trait UserProgram: Send + 'static {
    fn run(self: Box<Self>, user: &mut UserContext) -> Result<(), Halted>;
}

impl<F> UserProgram for F
where
    F: FnOnce(&mut UserContext) -> Result<(), Halted> + Send + 'static,
{
    fn run(self: Box<Self>, user: &mut UserContext) -> Result<(), Halted> {
        (*self)(user)
    }
}

/// Registers and kernel entry points visible to a running program
pub struct UserContext {
    shared: Arc<Shared>,
    slot: SlotIndex,
    pid: Pid,
    esp: Address,
}

impl UserContext {
    pub(crate) fn new(shared: Arc<Shared>, slot: SlotIndex, pid: Pid, esp: Address) -> Self {
        Self {
            shared,
            slot,
            pid,
            esp,
        }
    }

    #[inline]
    pub fn pid(&self) -> Pid {
        self.pid
    }

    #[inline]
    pub fn slot(&self) -> SlotIndex {
        self.slot
    }

    /// Give the CPU back to the scheduler
    ///
    /// Returns when this process is dispatched again, right after the call.
    pub fn yield_now(&mut self) -> Result<(), Halted> {
        switch::yield_cpu(&self.shared, self.slot)
    }

    pub fn get_sched_policy(&mut self) -> i32 {
        self.syscall(SYS_GET_SCHED_POLICY, &[])
    }

    pub fn set_sched_policy(&mut self, policy: i32) -> i32 {
        self.syscall(SYS_SET_SCHED_POLICY, &[policy])
    }

    /// Issue system call `number` the way the user-space stubs do
    ///
    /// Arguments are pushed right to left followed by a return address,
    /// then the kernel is entered with `number` in `eax`. The stack pointer
    /// is restored afterwards.
    pub fn syscall(&mut self, number: u32, args: &[i32]) -> i32 {
        let saved = self.esp;
        for arg in args.iter().rev() {
            self.push(*arg as u32);
        }
        self.push(FAKE_RETURN);

        let ret = self.trap(number);
        self.esp = saved;
        ret
    }

    /// Enter the kernel through the syscall vector with the current stack
    pub fn trap(&mut self, number: u32) -> i32 {
        let mut guard = self.shared.acquire();
        let entered = match guard.table.get_mut(self.slot) {
            Some(process) => {
                process.trap_frame.trapno = T_SYSCALL;
                process.trap_frame.eax = number;
                process.trap_frame.esp = self.esp;
                true
            }
            None => false,
        };
        if !entered {
            Shared::release(guard);
            return SYSCALL_FAILURE;
        }

        dispatch::syscall(&mut guard);

        let ret = guard
            .table
            .get(self.slot)
            .map_or(SYSCALL_FAILURE, |p| p.trap_frame.eax as i32);
        Shared::release(guard);
        ret
    }

    #[inline]
    pub fn stack_pointer(&self) -> Address {
        self.esp
    }

    #[inline]
    pub fn set_stack_pointer(&mut self, esp: Address) {
        self.esp = esp;
    }

    /// Copy `len` bytes of this process's memory starting at `addr`
    pub fn read_memory(&self, addr: Address, len: usize) -> Option<Vec<u8>> {
        let guard = self.shared.acquire();
        let start = addr as usize;
        let bytes = guard
            .table
            .get(self.slot)
            .and_then(|p| p.user_memory().get(start..start.checked_add(len)?))
            .map(<[u8]>::to_vec);
        Shared::release(guard);
        bytes
    }

    /// Store `bytes` at `addr`; false if the range is outside user memory
    pub fn write_memory(&mut self, addr: Address, bytes: &[u8]) -> bool {
        let mut guard = self.shared.acquire();
        let start = addr as usize;
        let written = match (guard.table.get_mut(self.slot), start.checked_add(bytes.len())) {
            (Some(p), Some(end)) => match p.user_memory_mut().get_mut(start..end) {
                Some(dst) => {
                    dst.copy_from_slice(bytes);
                    true
                }
                None => false,
            },
            _ => false,
        };
        Shared::release(guard);
        written
    }

    /// Interrupt-enable flag of the CPU as seen by this process
    pub fn interrupts_enabled(&self) -> bool {
        self.shared.machine.lock().cpu.interrupts.enabled()
    }

    /// `cli`. Privileged; only meaningful for kernel-mode test programs.
    pub fn disable_interrupts(&mut self) {
        self.shared.machine.lock().cpu.interrupts.cli();
    }

    /// `sti`
    pub fn enable_interrupts(&mut self) {
        self.shared.machine.lock().cpu.interrupts.sti();
    }

    fn push(&mut self, value: u32) {
        let sp = self.esp.wrapping_sub(4);
        self.write_memory(sp, &value.to_le_bytes());
        self.esp = sp;
    }
}

impl fmt::Debug for UserContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserContext")
            .field("pid", &self.pid)
            .field("slot", &self.slot)
            .field("esp", &self.esp)
            .finish()
    }
}
