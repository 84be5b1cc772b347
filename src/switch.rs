/*!
 * Context Switch
 *
 * Symmetric handoff between the scheduler and process execution units.
 * Every unit runs on its own OS thread; only the unit named by the baton
 * makes progress. A switch saves the caller's registers, loads the
 * target's, passes the baton and parks the caller on the handoff condvar
 * until the baton comes back. Parking releases the table lock, so the lock
 * is held by the scheduler from selection through dispatch and is dropped
 * only across the transfer itself.
 */

use crate::core::errors::Halted;
use crate::core::types::{Pid, SlotIndex};
use crate::cpu::{kernel_panic, InterruptState};
use crate::machine::{Machine, MachineGuard, Shared, Unit};
use crate::process::{entry, Context, ProcState};
use crate::user::{UserContext, UserProgram};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;
use tracing::{debug, error, trace};

/// Transfer the CPU from `me` to `to` (swtch)
///
/// Returns once the baton is handed back to `me`, still holding the lock.
/// Fails if the machine halted while `me` was parked.
pub(crate) fn swtch<'a>(
    shared: &'a Arc<Shared>,
    mut guard: MachineGuard<'a>,
    me: Unit,
    to: Unit,
) -> Result<MachineGuard<'a>, Halted> {
    {
        let m = &mut *guard;
        let saved = Context {
            eip: entry::SWITCH_RETURN,
            ..m.cpu.regs
        };
        match me {
            Unit::Scheduler => m.cpu.scheduler = saved,
            Unit::Process(slot) => {
                if let Some(p) = m.table.get_mut(slot) {
                    p.context = saved;
                }
            }
        }

        let next = match to {
            Unit::Scheduler => m.cpu.scheduler,
            Unit::Process(slot) => match m.table.get(slot) {
                Some(p) => p.context,
                None => kernel_panic("swtch: target slot out of range"),
            },
        };
        m.cpu.regs = next;
        m.baton.holder = Some(to);

        if let Unit::Process(slot) = to {
            if next.resumes_at_trap_return() {
                start_unit(shared, m, slot);
            }
        }
        trace!(?me, ?to, eip = next.eip, "swtch");
    }

    shared.stats.inc_context_switches();
    shared.handoff.notify_all();
    shared
        .handoff
        .wait_while(&mut guard, |m| m.baton.holder != Some(me) && !m.baton.halted);

    if guard.baton.holder == Some(me) {
        Ok(guard)
    } else {
        Err(Halted)
    }
}

/// Give up the CPU voluntarily (yield)
pub(crate) fn yield_cpu(shared: &Arc<Shared>, slot: SlotIndex) -> Result<(), Halted> {
    let mut guard = shared.acquire();
    if guard.baton.halted {
        Shared::release(guard);
        return Err(Halted);
    }

    if let Some(p) = guard.table.get_mut(slot) {
        p.state = ProcState::Runnable;
    }
    let guard = sched(shared, guard, slot)?;
    Shared::release(guard);
    Ok(())
}

/// Enter the scheduler from process `slot` (sched)
///
/// The caller must hold exactly the table lock and must already have
/// changed the process state. The interrupt-enable state saved before the
/// switch belongs to this process and is restored once it runs again.
pub(crate) fn sched<'a>(
    shared: &'a Arc<Shared>,
    guard: MachineGuard<'a>,
    slot: SlotIndex,
) -> Result<MachineGuard<'a>, Halted> {
    let state = guard
        .table
        .get(slot)
        .map_or(ProcState::Unused, |p| p.state());
    assert_switch_preconditions(state, &guard.cpu.interrupts);

    let intena = guard.cpu.interrupts.intena();
    let mut guard = swtch(shared, guard, Unit::Process(slot), Unit::Scheduler)?;
    guard.cpu.interrupts.set_intena(intena);
    Ok(guard)
}

/// Fatal unless the table lock is the only lock held, the process is no
/// longer `Running`, and interrupts are off
pub fn assert_switch_preconditions(state: ProcState, interrupts: &InterruptState) {
    if interrupts.depth() != 1 {
        kernel_panic("sched locks");
    }
    if state == ProcState::Running {
        kernel_panic("sched running");
    }
    if interrupts.enabled() {
        kernel_panic("sched interruptible");
    }
}

/// Create the execution unit of a process on its first dispatch
fn start_unit(shared: &Arc<Shared>, m: &mut Machine, slot: SlotIndex) {
    let Some(process) = m.table.get_mut(slot) else {
        kernel_panic("swtch: target slot out of range");
    };
    let Some(program) = process.program.take() else {
        kernel_panic("swtch: first dispatch of a process without a program");
    };
    let pid = process.pid();

    let unit_shared = Arc::clone(shared);
    let spawned = thread::Builder::new()
        .name(format!("proc-{pid}"))
        .spawn(move || unit_main(unit_shared, slot, pid, program));

    match spawned {
        Ok(handle) => shared.threads.lock().push(handle),
        Err(e) => {
            error!(pid, error = %e, "failed to start execution unit");
            kernel_panic("swtch: cannot start execution unit");
        }
    }
}

/// Body of a process thread
///
/// A panic here halts the machine and is carried to the scheduler, which
/// re-raises it.
fn unit_main(shared: Arc<Shared>, slot: SlotIndex, pid: Pid, program: Box<dyn UserProgram>) {
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        enter_user(&shared, slot, pid, program);
    }));

    if let Err(payload) = result {
        let mut m = shared.machine.lock();
        if m.baton.panic.is_none() {
            m.baton.panic = Some(payload);
        }
        m.baton.halted = true;
        drop(m);
        shared.handoff.notify_all();
    }
    debug!(pid, slot, "execution unit exited");
}

/// First return to user mode (forkret + trapret), then the program
fn enter_user(shared: &Arc<Shared>, slot: SlotIndex, pid: Pid, program: Box<dyn UserProgram>) {
    let me = Unit::Process(slot);
    let mut guard = shared.machine.lock();
    shared
        .handoff
        .wait_while(&mut guard, |m| m.baton.holder != Some(me) && !m.baton.halted);
    if guard.baton.holder != Some(me) {
        return;
    }

    let Some(tf) = guard.table.get(slot).map(|p| p.trap_frame) else {
        kernel_panic("forkret: process slot vanished");
    };

    // Still holding the table lock taken by the scheduler
    guard.cpu.interrupts.pop_off();
    // iret restores eflags from the trap frame
    guard.cpu.interrupts.set_enabled(tf.interrupts_enabled());
    drop(guard);

    debug!(pid, slot, esp = tf.esp, eip = tf.eip, "entering user mode");
    let mut user = UserContext::new(Arc::clone(shared), slot, pid, tf.esp);
    if let Err(halted) = program.run(&mut user) {
        trace!(pid, %halted, "program stopped");
    }
    // Nothing to exit to: stay schedulable and give the CPU back each time
    while user.yield_now().is_ok() {}
}

#[cfg(test)]
mod tests {
    use super::*;

    fn locked_once(enabled: bool) -> InterruptState {
        let mut s = InterruptState::new();
        s.set_enabled(enabled);
        s.push_off();
        s
    }

    #[test]
    fn test_preconditions_hold() {
        assert_switch_preconditions(ProcState::Runnable, &locked_once(true));
    }

    #[test]
    #[should_panic(expected = "sched running")]
    fn test_switch_while_running_panics() {
        assert_switch_preconditions(ProcState::Running, &locked_once(true));
    }

    #[test]
    #[should_panic(expected = "sched locks")]
    fn test_switch_with_nested_locks_panics() {
        let mut s = locked_once(false);
        s.push_off();
        assert_switch_preconditions(ProcState::Runnable, &s);
    }

    #[test]
    #[should_panic(expected = "sched interruptible")]
    fn test_switch_with_interrupts_on_panics() {
        let mut s = locked_once(false);
        s.sti();
        assert_switch_preconditions(ProcState::Runnable, &s);
    }
}
