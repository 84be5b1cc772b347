/*!
 * Scheduler Loop
 *
 * Per-CPU scheduler. Each round it picks a runnable process with the ratio
 * policy, marks it running, and switches to it. Eventually that process
 * transfers control back by switching to the scheduler, and the next
 * round begins.
 */

use super::types::{DispatchRecord, RunBudget, RunReport};
use crate::core::errors::{Halted, SchedulerError};
use crate::core::types::KernelResult;
use crate::cpu::kernel_panic;
use crate::machine::{Shared, Unit};
use crate::process::{ProcState, SchedPolicy};
use crate::switch::swtch;
use std::panic;
use std::sync::Arc;
use std::thread;
use tracing::{debug, info, trace};

/// Marks the scheduler as running for as long as it is alive
struct ActiveLoop<'a> {
    shared: &'a Arc<Shared>,
}

impl Drop for ActiveLoop<'_> {
    fn drop(&mut self) {
        let mut m = self.shared.machine.lock();
        m.scheduler_active = false;
        if thread::panicking() {
            // The scheduler is going down with the kernel; release parked units
            m.baton.halted = true;
            drop(m);
            self.shared.handoff.notify_all();
        }
    }
}

/// Run the scheduler on the calling thread until `budget` is spent
///
/// `observer` sees every dispatch in order, after control has come back
/// from the process. A panic raised by a process is re-raised here.
pub(crate) fn run<F>(shared: &Arc<Shared>, budget: RunBudget, mut observer: F) -> KernelResult<RunReport>
where
    F: FnMut(DispatchRecord),
{
    {
        let mut m = shared.machine.lock();
        if m.baton.halted {
            return Err(Halted.into());
        }
        if m.scheduler_active {
            return Err(SchedulerError::AlreadyRunning.into());
        }
        m.scheduler_active = true;
        m.baton.holder = Some(Unit::Scheduler);
    }
    let _active = ActiveLoop { shared };

    info!(?budget, "scheduler started");
    let mut report = RunReport::default();
    while !budget.exhausted(&report) {
        if round(shared, &mut report, &mut observer).is_err() {
            let payload = shared.machine.lock().baton.panic.take();
            if let Some(payload) = payload {
                panic::resume_unwind(payload);
            }
            debug!("scheduler stopped by halt");
            break;
        }
    }

    info!(
        rounds = report.rounds,
        idle = report.idle_rounds,
        foreground = report.foreground_dispatches,
        background = report.background_dispatches,
        "scheduler finished"
    );
    Ok(report)
}

/// One selection round
fn round<F>(shared: &Arc<Shared>, report: &mut RunReport, observer: &mut F) -> Result<(), Halted>
where
    F: FnMut(DispatchRecord),
{
    // Enable interrupts on this processor, then loop over the table
    let mut guard = shared.machine.lock();
    guard.cpu.interrupts.sti();
    guard.cpu.interrupts.push_off();

    if guard.baton.halted {
        Shared::release(guard);
        return Err(Halted);
    }

    let round = report.rounds;
    report.rounds += 1;
    shared.stats.inc_rounds();

    let m = &mut *guard;
    let Some(choice) = m.policy.select(&m.table) else {
        Shared::release(guard);
        report.idle_rounds += 1;
        shared.stats.inc_idle();
        thread::yield_now();
        return Ok(());
    };

    // Switch to the chosen process. It is the process's job to release
    // the table lock and then reacquire it before jumping back to us.
    let (pid, size) = match m.table.get_mut(choice.slot) {
        Some(p) => {
            p.state = ProcState::Running;
            (p.pid(), p.size)
        }
        None => kernel_panic("scheduler: selected slot out of range"),
    };
    m.cpu.current = Some(choice.slot);
    shared.address_space.install(pid, size);

    match choice.class {
        SchedPolicy::Foreground => report.foreground_dispatches += 1,
        SchedPolicy::Background => report.background_dispatches += 1,
    }
    shared.stats.inc_dispatch(choice.class);
    trace!(round, pid, slot = choice.slot, class = %choice.class, streak = m.policy.streak(), "dispatch");

    let record = DispatchRecord {
        round,
        pid,
        slot: choice.slot,
        class: choice.class,
    };

    let outcome = match swtch(shared, guard, Unit::Scheduler, Unit::Process(choice.slot)) {
        Ok(mut guard) => {
            // Process is done running for now
            guard.cpu.current = None;
            Shared::release(guard);
            Ok(())
        }
        Err(halted) => Err(halted),
    };
    observer(record);
    outcome
}
