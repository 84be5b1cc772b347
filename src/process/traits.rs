/*!
 * Process Collaborators
 * Interfaces to the subsystems the process core calls but does not own
 */

use crate::core::types::Pid;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Handle on a filesystem inode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InodeRef {
    pub dev: u32,
    pub inum: u32,
}

impl InodeRef {
    pub const ROOT: Self = Self { dev: 1, inum: 1 };
}

/// Address-space switching (switchuvm)
///
/// Called by the scheduler right before it transfers control to a process.
pub trait AddressSpace: Send + Sync {
    fn install(&self, pid: Pid, size: usize);
}

/// Directory lookup (namei)
pub trait DirectoryResolver: Send + Sync {
    fn resolve(&self, path: &str) -> Option<InodeRef>;
}

/// Single address space shared by every process
#[derive(Debug, Default, Clone, Copy)]
pub struct KernelOnlyAddressSpace;

impl AddressSpace for KernelOnlyAddressSpace {
    fn install(&self, pid: Pid, size: usize) {
        trace!(pid, size, "switchuvm");
    }
}

/// Resolver that only knows the root directory
#[derive(Debug, Default, Clone, Copy)]
pub struct RootOnlyResolver;

impl DirectoryResolver for RootOnlyResolver {
    fn resolve(&self, path: &str) -> Option<InodeRef> {
        (path == "/").then_some(InodeRef::ROOT)
    }
}
