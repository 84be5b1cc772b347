/*!
 * Process Tests
 * Process table allocation, creation paths, and diagnostics
 */

use duet_kernel::{
    InodeRef, Kernel, KernelConfig, KernelError, Page, PageAllocator, PagePool, ProcState,
    ProcessError, SchedPolicy,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Page allocator that can be told to refuse the next reservation
struct FlakyPages {
    pool: PagePool,
    fail: AtomicBool,
}

impl FlakyPages {
    fn new(pages: usize) -> Self {
        Self {
            pool: PagePool::new(pages),
            fail: AtomicBool::new(false),
        }
    }

    fn fail_next(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }
}

impl PageAllocator for FlakyPages {
    fn alloc_page(&self) -> Option<Page> {
        if self.fail.swap(false, Ordering::SeqCst) {
            return None;
        }
        self.pool.alloc_page()
    }

    fn free_page(&self, page: Page) {
        self.pool.free_page(page);
    }

    fn free_pages(&self) -> usize {
        self.pool.free_pages()
    }
}

fn kernel_with(slots: usize, pages: usize) -> Kernel {
    let config = KernelConfig::default()
        .with_max_processes(slots)
        .with_page_pool(pages);
    Kernel::new(config).unwrap()
}

#[test]
fn test_ids_increase_across_allocations() {
    let kernel = kernel_with(8, 8);

    let ids: Vec<_> = (0..5).map(|_| kernel.allocate().unwrap()).collect();
    assert_eq!(ids, vec![1, 2, 3, 4, 5]);

    for pid in &ids {
        let info = kernel.process(*pid).unwrap();
        assert_eq!(info.state, ProcState::Embryo);
        assert_eq!(info.policy, SchedPolicy::Foreground);
    }
}

#[test]
fn test_full_table_is_resource_exhausted() {
    let kernel = kernel_with(3, 8);
    for _ in 0..3 {
        kernel.allocate().unwrap();
    }
    let before = kernel.processes();
    let free_before = kernel.free_pages();

    let err = kernel.allocate().unwrap_err();
    assert!(matches!(
        err,
        KernelError::Process(ProcessError::ResourceExhausted { capacity: 3 })
    ));
    assert_eq!(kernel.processes(), before);
    assert_eq!(kernel.free_pages(), free_before);
}

#[test]
fn test_out_of_memory_releases_slot() {
    let kernel = kernel_with(4, 1);
    assert_eq!(kernel.allocate().unwrap(), 1);

    let err = kernel.allocate().unwrap_err();
    assert!(matches!(
        err,
        KernelError::Process(ProcessError::OutOfMemory { pid: 2 })
    ));
    assert_eq!(kernel.processes().len(), 1);
    assert_eq!(kernel.process(2), None);
}

#[test]
fn test_out_of_memory_consumes_id() {
    let pages = Arc::new(FlakyPages::new(4));
    let kernel = Kernel::builder()
        .with_config(KernelConfig::default().with_max_processes(4))
        .with_page_allocator(pages.clone())
        .build()
        .unwrap();

    assert_eq!(kernel.allocate().unwrap(), 1);
    pages.fail_next();
    assert!(kernel.allocate().is_err());
    assert_eq!(kernel.allocate().unwrap(), 3);

    // The failed slot was reused by the next allocation
    assert_eq!(kernel.process(3).unwrap().slot, 1);
}

#[test]
fn test_bootstrap_process_fields() {
    let kernel = kernel_with(4, 4);
    let pid = kernel.init_bootstrap(SchedPolicy::Background).unwrap();

    let info = kernel.process(pid).unwrap();
    assert_eq!(info.pid, 1);
    assert_eq!(info.slot, 0);
    assert_eq!(info.name.as_str(), "initcode");
    assert_eq!(info.state, ProcState::Runnable);
    assert_eq!(info.policy, SchedPolicy::Background);
    assert_eq!(info.size, 3072);
    assert_eq!(info.cwd, Some(InodeRef::ROOT));
}

#[test]
fn test_spawn_truncates_long_names() {
    let kernel = kernel_with(4, 4);
    let pid = kernel
        .spawn("averyveryverylongname", SchedPolicy::Foreground, |_| Ok(()))
        .unwrap();
    assert_eq!(kernel.process(pid).unwrap().name.as_str(), "averyveryverylo");
}

#[test]
fn test_procdump_lists_live_slots() {
    let kernel = kernel_with(4, 4);
    kernel.init_bootstrap(SchedPolicy::Foreground).unwrap();
    kernel.allocate().unwrap();

    assert_eq!(kernel.procdump(), "1 runble initcode\n2 embryo \n");

    let json = kernel.procdump_json().unwrap();
    assert!(json.contains("\"runnable\""));
    assert!(json.contains("\"initcode\""));
}

proptest! {
    #[test]
    fn prop_ids_strictly_increase(ops in proptest::collection::vec(any::<bool>(), 1..40)) {
        let pages = Arc::new(FlakyPages::new(64));
        let kernel = Kernel::builder()
            .with_config(KernelConfig::default())
            .with_page_allocator(pages.clone())
            .build()
            .unwrap();

        let mut expected = 1;
        for succeed in ops {
            if succeed {
                prop_assert_eq!(kernel.allocate().unwrap(), expected);
            } else {
                pages.fail_next();
                prop_assert!(kernel.allocate().is_err());
            }
            expected += 1;
        }
    }
}
