/*!
 * Kernel Page Pool
 * Fixed set of pages handed out through a lock-free free list
 */

use super::traits::PageAllocator;
use crate::core::limits::PAGE_SIZE;
use crossbeam_queue::ArrayQueue;
use std::ops::{Deref, DerefMut};
use tracing::{trace, warn};

/// Byte pattern written over freed pages to catch dangling use
const FREED_PAGE_FILL: u8 = 0x01;

/// One page of kernel memory
pub struct Page {
    frame: Box<[u8; PAGE_SIZE]>,
}

impl Page {
    #[inline]
    pub fn zeroed() -> Self {
        Self {
            frame: Box::new([0u8; PAGE_SIZE]),
        }
    }
}

impl Deref for Page {
    type Target = [u8];

    #[inline(always)]
    fn deref(&self) -> &[u8] {
        &self.frame[..]
    }
}

impl DerefMut for Page {
    #[inline(always)]
    fn deref_mut(&mut self) -> &mut [u8] {
        &mut self.frame[..]
    }
}

impl std::fmt::Debug for Page {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Page").field("size", &PAGE_SIZE).finish()
    }
}

/// Fixed-capacity page pool
///
/// # Performance
/// - O(1) lock-free alloc/free via `ArrayQueue`
/// - All pages are created up front, nothing is allocated after boot
pub struct PagePool {
    free: ArrayQueue<Page>,
    capacity: usize,
}

impl PagePool {
    pub fn new(pages: usize) -> Self {
        // ArrayQueue needs a non-zero capacity even for an empty pool
        let free = ArrayQueue::new(pages.max(1));
        for _ in 0..pages {
            let _ = free.push(Page::zeroed());
        }
        Self {
            free,
            capacity: pages,
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl PageAllocator for PagePool {
    fn alloc_page(&self) -> Option<Page> {
        let page = self.free.pop();
        trace!(remaining = self.free.len(), ok = page.is_some(), "alloc_page");
        page
    }

    fn free_page(&self, mut page: Page) {
        page.fill(FREED_PAGE_FILL);
        if self.free.push(page).is_err() {
            warn!(capacity = self.capacity, "free_page: pool already full, dropping page");
        }
    }

    fn free_pages(&self) -> usize {
        self.free.len()
    }
}
