/*!
 * Kernel
 *
 * Owns the machine and its collaborators. Creation paths, the scheduler
 * loop, diagnostics and shutdown are all reached through [`Kernel`].
 */

use crate::config::KernelConfig;
use crate::core::errors::Halted;
use crate::core::limits::BOOTSTRAP_NAME;
use crate::core::types::{KernelResult, Pid};
use crate::cpu::kernel_panic;
use crate::machine::{Machine, Shared};
use crate::memory::{PageAllocator, PagePool};
use crate::monitoring::{span_process_create, span_scheduler};
use crate::process::dump;
use crate::process::lifecycle::{allocate_process, make_runnable, UserSetup};
use crate::process::{
    AddressSpace, DirectoryResolver, InitCode, KernelOnlyAddressSpace, ProcessInfo,
    RootOnlyResolver, SchedPolicy, INITCODE,
};
use crate::scheduler::run;
use crate::scheduler::{AtomicSchedulerStats, DispatchRecord, RunBudget, RunReport, SchedulerStats};
use crate::user::{UserContext, UserProgram};
use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use std::thread;
use tracing::{info, warn};

/// Builder for [`Kernel`]
///
/// Collaborators left unset get the in-crate defaults: a [`PagePool`] sized
/// from the config, a single shared address space, and a resolver that only
/// knows `/`.
#[derive(Default)]
pub struct KernelBuilder {
    config: KernelConfig,
    pages: Option<Arc<dyn PageAllocator>>,
    address_space: Option<Arc<dyn AddressSpace>>,
    resolver: Option<Arc<dyn DirectoryResolver>>,
}

impl KernelBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: KernelConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_page_allocator(mut self, pages: Arc<dyn PageAllocator>) -> Self {
        self.pages = Some(pages);
        self
    }

    pub fn with_address_space(mut self, address_space: Arc<dyn AddressSpace>) -> Self {
        self.address_space = Some(address_space);
        self
    }

    pub fn with_resolver(mut self, resolver: Arc<dyn DirectoryResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    pub fn build(self) -> KernelResult<Kernel> {
        self.config.validate()?;

        let config = self.config;
        let pages = self
            .pages
            .unwrap_or_else(|| Arc::new(PagePool::new(config.page_pool_pages)));
        let address_space = self
            .address_space
            .unwrap_or_else(|| Arc::new(KernelOnlyAddressSpace));
        let resolver = self.resolver.unwrap_or_else(|| Arc::new(RootOnlyResolver));

        info!(
            nproc = config.max_processes,
            quota = config.foreground_quota,
            passes = config.scan_passes,
            free_pages = pages.free_pages(),
            "Kernel initialized"
        );

        Ok(Kernel {
            shared: Arc::new(Shared {
                machine: Mutex::new(Machine::new(&config)),
                handoff: Condvar::new(),
                config,
                pages,
                address_space,
                resolver,
                stats: AtomicSchedulerStats::new(),
                threads: Mutex::new(Vec::new()),
            }),
        })
    }
}

/// A single-CPU kernel instance
pub struct Kernel {
    shared: Arc<Shared>,
}

impl Kernel {
    /// Kernel with default collaborators
    pub fn new(config: KernelConfig) -> KernelResult<Self> {
        KernelBuilder::new().with_config(config).build()
    }

    pub fn builder() -> KernelBuilder {
        KernelBuilder::new()
    }

    #[inline]
    pub fn config(&self) -> &KernelConfig {
        &self.shared.config
    }

    /// Claim a slot and its kernel block, leaving it `Embryo` (allocproc)
    pub fn allocate(&self) -> KernelResult<Pid> {
        let mut guard = self.shared.acquire();
        let result = allocate_process(&mut guard.table, self.shared.pages.as_ref());
        Shared::release(guard);
        Ok(result?.1)
    }

    /// Create the first process running the bootstrap image (userinit)
    pub fn init_bootstrap(&self, policy: SchedPolicy) -> KernelResult<Pid> {
        self.create(BOOTSTRAP_NAME, policy, &INITCODE, Box::new(InitCode))
    }

    /// Create a runnable process executing `program`
    ///
    /// Set up exactly like the bootstrap process except that no image is
    /// copied into its memory.
    pub fn spawn<F>(&self, name: &str, policy: SchedPolicy, program: F) -> KernelResult<Pid>
    where
        F: FnOnce(&mut UserContext) -> Result<(), Halted> + Send + 'static,
    {
        self.spawn_program(name, policy, Box::new(program))
    }

    pub fn spawn_program(
        &self,
        name: &str,
        policy: SchedPolicy,
        program: Box<dyn UserProgram>,
    ) -> KernelResult<Pid> {
        self.create(name, policy, &[], program)
    }

    fn create(
        &self,
        name: &str,
        policy: SchedPolicy,
        image: &[u8],
        program: Box<dyn UserProgram>,
    ) -> KernelResult<Pid> {
        let span = span_process_create(name);
        let _enter = span.enter();

        let mut guard = self.shared.acquire();
        let slot = match allocate_process(&mut guard.table, self.shared.pages.as_ref()) {
            Ok((slot, _)) => slot,
            Err(e) => {
                Shared::release(guard);
                return Err(e.into());
            }
        };
        let setup = UserSetup {
            name,
            policy,
            image,
            program,
        };
        let pid = make_runnable(
            &mut guard.table,
            slot,
            setup,
            self.shared.resolver.as_ref(),
        );
        Shared::release(guard);

        let pid = pid.unwrap_or_else(|| kernel_panic("create: fresh slot is not an embryo"));
        span.record("pid", pid);
        Ok(pid)
    }

    /// Run the scheduler on the calling thread
    pub fn run(&self, budget: RunBudget) -> KernelResult<RunReport> {
        let span = span_scheduler(&budget);
        let _enter = span.enter();
        run::run(&self.shared, budget, |_| {})
    }

    /// Like [`run`](Self::run), also returning every dispatch in order
    pub fn run_traced(&self, budget: RunBudget) -> KernelResult<(RunReport, Vec<DispatchRecord>)> {
        let span = span_scheduler(&budget);
        let _enter = span.enter();
        let mut records = Vec::new();
        let report = run::run(&self.shared, budget, |record| records.push(record))?;
        Ok((report, records))
    }

    /// Lifetime scheduler statistics
    pub fn stats(&self) -> SchedulerStats {
        self.shared.stats.snapshot()
    }

    /// Consecutive foreground dispatches since the last background one
    pub fn foreground_streak(&self) -> u32 {
        self.shared.machine.lock().policy.streak()
    }

    pub fn process(&self, pid: Pid) -> Option<ProcessInfo> {
        let m = self.shared.machine.lock();
        let slot = m.table.find(pid)?;
        m.table.get(slot).map(|p| p.info(slot))
    }

    pub fn processes(&self) -> Vec<ProcessInfo> {
        dump::snapshot(&self.shared.machine.lock().table)
    }

    /// Console process listing (procdump)
    pub fn procdump(&self) -> String {
        dump::procdump(&self.shared.machine.lock().table)
    }

    pub fn procdump_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.processes())
    }

    /// Pid of the process on the CPU, if any
    pub fn current(&self) -> Option<Pid> {
        let m = self.shared.machine.lock();
        m.cpu
            .current
            .and_then(|slot| m.table.get(slot))
            .map(|p| p.pid())
    }

    pub fn free_pages(&self) -> usize {
        self.shared.pages.free_pages()
    }

    pub fn is_halted(&self) -> bool {
        self.shared.machine.lock().baton.halted
    }

    /// Stop the machine: wake every parked execution unit and join them
    ///
    /// A halted kernel refuses to run again.
    pub fn halt(&self) {
        {
            let mut m = self.shared.machine.lock();
            if !m.baton.halted {
                m.baton.halted = true;
                info!("Kernel halting");
            }
        }
        self.shared.handoff.notify_all();

        let threads = std::mem::take(&mut *self.shared.threads.lock());
        let me = thread::current().id();
        for handle in threads {
            if handle.thread().id() == me {
                continue;
            }
            let name = handle.thread().name().map(str::to_owned);
            if handle.join().is_err() {
                warn!(unit = ?name, "execution unit ended in a panic");
            }
        }
    }
}

impl Drop for Kernel {
    fn drop(&mut self) {
        self.halt();
    }
}

impl std::fmt::Debug for Kernel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Kernel")
            .field("config", &self.shared.config)
            .field("stats", &self.stats())
            .finish()
    }
}
