/*!
 * Memory Module
 * Kernel page allocation used for per-process execution resources
 */

pub mod pool;
pub mod traits;

pub use pool::{Page, PagePool};
pub use traits::PageAllocator;
