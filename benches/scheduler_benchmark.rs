/*!
 * Scheduler Benchmarks
 *
 * Cost of a selection round and of full dispatch/yield round trips
 */

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use duet_kernel::process::ProcessTable;
use duet_kernel::scheduler::RatioPolicy;
use duet_kernel::{Halted, Kernel, KernelConfig, RunBudget, SchedPolicy, UserContext};

fn yielder(user: &mut UserContext) -> Result<(), Halted> {
    loop {
        user.yield_now()?;
    }
}

fn bench_idle_selection(c: &mut Criterion) {
    let mut group = c.benchmark_group("idle_selection");

    for slots in [8usize, 64, 256] {
        // Occupied but never runnable: both cursors scan their full bound
        let mut table = ProcessTable::new(slots);
        for _ in 0..slots {
            let _ = table.claim();
        }
        let mut policy = RatioPolicy::default();

        group.bench_with_input(BenchmarkId::from_parameter(slots), &slots, |b, _| {
            b.iter(|| black_box(policy.select(black_box(&table))));
        });
    }

    group.finish();
}

fn bench_dispatch_round_trip(c: &mut Criterion) {
    let mut group = c.benchmark_group("dispatch_round_trip");

    for (fg, bg) in [(1usize, 0usize), (9, 1), (32, 32)] {
        let kernel = Kernel::new(KernelConfig::default()).unwrap();
        for i in 0..fg {
            kernel
                .spawn(&format!("fg{i}"), SchedPolicy::Foreground, yielder)
                .unwrap();
        }
        for i in 0..bg {
            kernel
                .spawn(&format!("bg{i}"), SchedPolicy::Background, yielder)
                .unwrap();
        }

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{fg}fg_{bg}bg")),
            &kernel,
            |b, kernel| {
                b.iter(|| kernel.run(RunBudget::Dispatches(100)).unwrap());
            },
        );
        kernel.halt();
    }

    group.finish();
}

criterion_group!(benches, bench_idle_selection, bench_dispatch_round_trip);
criterion_main!(benches);
