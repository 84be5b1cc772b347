/*!
 * Kernel Block
 *
 * One page per process. User memory starts at offset 0; the kernel stack
 * occupies the top of the page and is carved from high to low:
 *
 * ```text
 *   PAGE_SIZE  +-----------------+
 *              |   trap frame    |
 *              +-----------------+
 *              |    context      |
 *              +-----------------+
 *              |  kernel stack   |
 *   kstack lo  +-----------------+
 *              |  user memory    |
 *   0          +-----------------+
 * ```
 */

use super::context::{Context, TrapFrame};
use crate::core::limits::{KSTACK_SIZE, PAGE_SIZE};
use crate::memory::Page;
use std::ops::Range;

/// Offsets of the regions carved from a kernel block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockLayout {
    pub kstack_base: usize,
    pub trap_frame: usize,
    pub context: usize,
}

impl BlockLayout {
    pub const fn standard() -> Self {
        let trap_frame = PAGE_SIZE - TrapFrame::SIZE;
        Self {
            kstack_base: PAGE_SIZE - KSTACK_SIZE,
            trap_frame,
            context: trap_frame - Context::SIZE,
        }
    }

    #[inline]
    pub fn kernel_stack(&self) -> Range<usize> {
        self.kstack_base..PAGE_SIZE
    }
}

/// A process's reserved page together with its layout
#[derive(Debug)]
pub struct KernelBlock {
    page: Page,
    layout: BlockLayout,
}

impl KernelBlock {
    pub fn new(page: Page) -> Self {
        Self {
            page,
            layout: BlockLayout::standard(),
        }
    }

    #[inline]
    pub fn layout(&self) -> BlockLayout {
        self.layout
    }

    pub fn user_memory(&self, size: usize) -> &[u8] {
        &self.page[..size.min(self.layout.kstack_base)]
    }

    pub fn user_memory_mut(&mut self, size: usize) -> &mut [u8] {
        let end = size.min(self.layout.kstack_base);
        &mut self.page[..end]
    }
}
