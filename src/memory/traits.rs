/*!
 * Memory Traits
 * Kernel page allocation abstraction
 */

use super::Page;

/// Page allocator interface (kalloc/kfree)
///
/// Physical memory management lives outside the scheduling core; process
/// creation only needs one page per process and a way to hand it back.
pub trait PageAllocator: Send + Sync {
    /// Reserve one page, or `None` when memory is exhausted
    fn alloc_page(&self) -> Option<Page>;

    /// Return a page to the allocator
    ///
    /// Nothing in the scheduling core frees a block: there is no process
    /// exit, and a failed allocation never holds a page. Teardown code
    /// outside the core returns pages through this.
    fn free_page(&self, page: Page);

    /// Pages currently available
    fn free_pages(&self) -> usize;
}
