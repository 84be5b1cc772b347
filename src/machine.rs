/*!
 * Machine
 *
 * Everything protected by the process-table lock: the table itself, the
 * CPU, the scheduling policy, and the baton naming which execution unit
 * may run. Shared between the scheduler thread and every process thread.
 */

use crate::config::KernelConfig;
use crate::core::types::SlotIndex;
use crate::cpu::Cpu;
use crate::memory::PageAllocator;
use crate::process::{AddressSpace, DirectoryResolver, ProcessTable};
use crate::scheduler::{AtomicSchedulerStats, RatioPolicy};
use parking_lot::{Condvar, Mutex, MutexGuard};
use std::any::Any;
use std::sync::Arc;
use std::thread::JoinHandle;

/// An execution unit that can hold the CPU
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Scheduler,
    Process(SlotIndex),
}

/// Who may run, and whether anyone may run at all
#[derive(Default)]
pub(crate) struct Baton {
    pub holder: Option<Unit>,
    pub halted: bool,
    /// Panic raised by a process thread, re-raised on the scheduler
    pub panic: Option<Box<dyn Any + Send + 'static>>,
}

pub(crate) struct Machine {
    pub table: ProcessTable,
    pub cpu: Cpu,
    pub baton: Baton,
    pub policy: RatioPolicy,
    pub scheduler_active: bool,
}

impl Machine {
    pub fn new(config: &KernelConfig) -> Self {
        Self {
            table: ProcessTable::new(config.max_processes),
            cpu: Cpu::new(),
            baton: Baton::default(),
            policy: RatioPolicy::from_config(config),
            scheduler_active: false,
        }
    }
}

pub(crate) type MachineGuard<'a> = MutexGuard<'a, Machine>;

pub(crate) struct Shared {
    pub machine: Mutex<Machine>,
    /// Signalled on every baton change
    pub handoff: Condvar,
    pub config: KernelConfig,
    pub pages: Arc<dyn PageAllocator>,
    pub address_space: Arc<dyn AddressSpace>,
    pub resolver: Arc<dyn DirectoryResolver>,
    pub stats: AtomicSchedulerStats,
    pub threads: Mutex<Vec<JoinHandle<()>>>,
}

impl Shared {
    /// Take the table lock with interrupts pushed off (acquire)
    pub fn acquire(&self) -> MachineGuard<'_> {
        let mut guard = self.machine.lock();
        guard.cpu.interrupts.push_off();
        guard
    }

    /// Drop the table lock and pop the interrupt nesting (release)
    pub fn release(mut guard: MachineGuard<'_>) {
        guard.cpu.interrupts.pop_off();
        drop(guard);
    }
}
