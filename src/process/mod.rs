/*!
 * Process Module
 * Process table, per-process kernel resources, and creation paths
 */

pub mod block;
pub mod context;
pub mod dump;
pub mod initcode;
pub mod lifecycle;
pub mod table;
pub mod traits;
pub mod types;

// Re-export for convenience
pub use block::{BlockLayout, KernelBlock};
pub use context::{entry, Context, EFlags, TrapFrame};
pub use initcode::{InitCode, INITCODE};
pub use table::ProcessTable;
pub use traits::{
    AddressSpace, DirectoryResolver, InodeRef, KernelOnlyAddressSpace, RootOnlyResolver,
};
pub use types::{ProcState, Process, ProcessInfo, ProcessResult, SchedPolicy};
