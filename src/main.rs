/*!
 * Duet Kernel - Main Entry Point
 *
 * Boots a kernel with the bootstrap process plus a small mixed workload,
 * runs the scheduler for a fixed number of rounds, and prints the process
 * listing and statistics.
 *
 * Environment variables (in addition to the KERNEL_* config overrides):
 * - KERNEL_ROUNDS: scheduler rounds before halting (default: 1000)
 */

use duet_kernel::core::limits::DEFAULT_RUN_ROUNDS;
use duet_kernel::{init_tracing, Kernel, KernelConfig, KernelError, RunBudget, SchedPolicy};
use miette::Result;
use tracing::info;

fn main() -> Result<()> {
    init_tracing();

    info!("Duet kernel starting...");
    let config = KernelConfig::from_env()?;
    let rounds = run_rounds()?;
    let kernel = Kernel::new(config)?;

    let init = kernel.init_bootstrap(SchedPolicy::Foreground)?;
    info!(pid = init, "bootstrap process created");

    for name in ["editor", "shell"] {
        kernel.spawn(name, SchedPolicy::Foreground, |user| loop {
            user.get_sched_policy();
            user.yield_now()?;
        })?;
    }

    kernel.spawn("indexer", SchedPolicy::Background, |user| loop {
        user.yield_now()?;
    })?;

    // Starts in the foreground and demotes itself on its first run
    kernel.spawn("backup", SchedPolicy::Foreground, |user| {
        let ret = user.set_sched_policy(SchedPolicy::Background.as_raw());
        info!(pid = user.pid(), ret, "backup moved to background");
        loop {
            user.yield_now()?;
        }
    })?;

    let report = kernel.run(RunBudget::Rounds(rounds))?;
    info!(
        rounds = report.rounds,
        foreground = report.foreground_dispatches,
        background = report.background_dispatches,
        idle = report.idle_rounds,
        "run complete"
    );

    print!("{}", kernel.procdump());
    let stats = kernel.stats();
    println!(
        "dispatches: {} foreground, {} background, {} context switches",
        stats.foreground_dispatches, stats.background_dispatches, stats.context_switches
    );

    kernel.halt();
    info!("Duet kernel halted");
    Ok(())
}

fn run_rounds() -> Result<u64, KernelError> {
    match std::env::var("KERNEL_ROUNDS") {
        Err(_) => Ok(DEFAULT_RUN_ROUNDS),
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| KernelError::configuration(format!("KERNEL_ROUNDS={raw:?} is not a valid number"))),
    }
}
