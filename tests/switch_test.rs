/*!
 * Context Switch Tests
 * Handoff between the scheduler and process execution units
 */

use duet_kernel::{
    Halted, Kernel, KernelConfig, KernelError, ProcState, RunBudget, SchedPolicy, UserContext,
};
use pretty_assertions::assert_eq;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};

fn yielder(user: &mut UserContext) -> Result<(), Halted> {
    loop {
        user.yield_now()?;
    }
}

fn kernel() -> Kernel {
    Kernel::new(KernelConfig::default().with_max_processes(4)).unwrap()
}

#[test]
fn test_first_dispatch_enters_user_mode_with_interrupts_on() {
    let kernel = kernel();
    let (tx, rx) = mpsc::channel();
    kernel
        .spawn("probe", SchedPolicy::Foreground, move |user| {
            let _ = tx.send((user.interrupts_enabled(), user.stack_pointer()));
            yielder(user)
        })
        .unwrap();

    kernel.run(RunBudget::Dispatches(1)).unwrap();
    assert_eq!(rx.recv(), Ok((true, 3072)));
}

#[test]
fn test_interrupt_state_restored_after_yield() {
    let kernel = kernel();
    let (tx, rx) = mpsc::channel();

    let quiet_tx = tx.clone();
    kernel
        .spawn("quiet", SchedPolicy::Foreground, move |user| {
            user.disable_interrupts();
            for _ in 0..3 {
                user.yield_now()?;
                let _ = quiet_tx.send(("quiet", user.interrupts_enabled()));
            }
            yielder(user)
        })
        .unwrap();
    kernel
        .spawn("loud", SchedPolicy::Foreground, move |user| {
            for _ in 0..3 {
                user.yield_now()?;
                let _ = tx.send(("loud", user.interrupts_enabled()));
            }
            yielder(user)
        })
        .unwrap();

    kernel.run(RunBudget::Dispatches(8)).unwrap();
    let seen: Vec<_> = rx.try_iter().collect();
    assert_eq!(seen.len(), 6);
    for (who, enabled) in seen {
        assert_eq!(enabled, who == "loud", "{who} resumed with wrong interrupt state");
    }
}

#[test]
fn test_resume_continues_after_yield_call_site() {
    let kernel = kernel();
    let log = Arc::new(Mutex::new(Vec::new()));

    let steps = Arc::clone(&log);
    let pid = kernel
        .spawn("stepper", SchedPolicy::Foreground, move |user| {
            steps.lock().unwrap().push("start");
            assert!(user.write_memory(16, &[7, 7, 7, 7]));
            user.yield_now()?;
            steps.lock().unwrap().push("after first yield");
            assert_eq!(user.read_memory(16, 4), Some(vec![7, 7, 7, 7]));
            user.yield_now()?;
            steps.lock().unwrap().push("after second yield");
            yielder(user)
        })
        .unwrap();

    kernel.run(RunBudget::Dispatches(2)).unwrap();
    assert_eq!(
        *log.lock().unwrap(),
        vec!["start", "after first yield"]
    );
    assert_eq!(kernel.process(pid).unwrap().state, ProcState::Runnable);

    kernel.run(RunBudget::Dispatches(1)).unwrap();
    assert_eq!(
        *log.lock().unwrap(),
        vec!["start", "after first yield", "after second yield"]
    );
}

#[test]
fn test_finished_program_stays_schedulable() {
    let kernel = kernel();
    let pid = kernel
        .spawn("oneshot", SchedPolicy::Background, |_| Ok(()))
        .unwrap();

    let (_, records) = kernel.run_traced(RunBudget::Dispatches(5)).unwrap();
    assert!(records.iter().all(|r| r.pid == pid));
    assert_eq!(kernel.process(pid).unwrap().state, ProcState::Runnable);
}

#[test]
fn test_bootstrap_process_runs() {
    let kernel = kernel();
    let init = kernel.init_bootstrap(SchedPolicy::Foreground).unwrap();

    let (report, records) = kernel.run_traced(RunBudget::Dispatches(4)).unwrap();
    assert_eq!(report.foreground_dispatches, 4);
    assert!(records.iter().all(|r| r.pid == init));
    assert_eq!(kernel.procdump(), "1 runble initcode\n");
}

#[test]
#[should_panic(expected = "boom")]
fn test_process_panic_reaches_scheduler() {
    let kernel = kernel();
    kernel.spawn("ok", SchedPolicy::Foreground, yielder).unwrap();
    kernel
        .spawn("bad", SchedPolicy::Foreground, |user| {
            user.yield_now()?;
            panic!("boom");
        })
        .unwrap();

    let _ = kernel.run(RunBudget::Forever);
}

#[test]
fn test_process_panic_halts_machine() {
    let kernel = kernel();
    kernel.spawn("ok", SchedPolicy::Foreground, yielder).unwrap();
    kernel
        .spawn("bad", SchedPolicy::Foreground, |_| panic!("boom"))
        .unwrap();

    let result = panic::catch_unwind(AssertUnwindSafe(|| kernel.run(RunBudget::Forever)));
    assert!(result.is_err());
    assert!(kernel.is_halted());
    assert!(matches!(
        kernel.run(RunBudget::Rounds(1)),
        Err(KernelError::Halted(_))
    ));
}

#[test]
fn test_halt_releases_parked_units() {
    let kernel = kernel();
    for name in ["a", "b", "c"] {
        kernel.spawn(name, SchedPolicy::Foreground, yielder).unwrap();
    }
    kernel.run(RunBudget::Dispatches(6)).unwrap();

    // Every unit is parked in a yield; halting must wake and join them all
    kernel.halt();
    assert!(kernel.is_halted());
    kernel.halt();
}

#[test]
fn test_halt_from_another_thread_stops_forever_loop() {
    let kernel = Arc::new(kernel());
    kernel.spawn("spin", SchedPolicy::Foreground, yielder).unwrap();

    let (tx, rx) = mpsc::channel();
    let runner = Arc::clone(&kernel);
    let handle = std::thread::spawn(move || {
        let _ = tx.send(runner.run(RunBudget::Forever).ok());
    });

    while kernel.stats().dispatches() < 10 {
        std::thread::yield_now();
    }
    kernel.halt();
    let report = rx.recv().unwrap().expect("halt ends the loop cleanly");
    assert!(report.dispatches() >= 10);
    // The round that notices the halt is not counted
    assert_eq!(report.rounds, report.idle_rounds + report.dispatches());
    assert_eq!(kernel.stats().rounds, report.rounds);
    handle.join().unwrap();
}
