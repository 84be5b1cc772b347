/*!
 * Process Lifecycle
 * Slot allocation (allocproc) and first-process setup (userinit)
 */

use super::block::KernelBlock;
use super::context::{Context, TrapFrame};
use super::table::ProcessTable;
use super::traits::DirectoryResolver;
use super::types::{ProcState, ProcessResult, SchedPolicy};
use crate::core::data_structures::InlineString;
use crate::core::errors::ProcessError;
use crate::core::limits::{PROC_NAME_LEN, USER_MEMORY_SIZE};
use crate::core::types::{Address, Pid, SlotIndex};
use crate::memory::PageAllocator;
use crate::user::UserProgram;
use tracing::{debug, info, warn};

/// Claim a slot and reserve its kernel block
///
/// On return the slot is `Embryo` and its saved context resumes in trap
/// return. If the block cannot be reserved the slot goes back to `Unused`
/// before the error is reported; the id it received stays consumed.
pub(crate) fn allocate_process(
    table: &mut ProcessTable,
    pages: &dyn PageAllocator,
) -> ProcessResult<(SlotIndex, Pid)> {
    let (slot, pid) = table.claim().map_err(|e| {
        warn!(error = %e, "allocproc: no free slot");
        e
    })?;

    let Some(page) = pages.alloc_page() else {
        table.release(slot);
        warn!(pid, slot, "allocproc: kernel block reservation failed");
        return Err(ProcessError::OutOfMemory { pid });
    };

    if let Some(process) = table.get_mut(slot) {
        process.block = Some(KernelBlock::new(page));
        process.size = USER_MEMORY_SIZE;
        process.trap_frame = TrapFrame::default();
        process.context = Context::first_entry();
    }

    debug!(pid, slot, "allocproc: embryo ready");
    Ok((slot, pid))
}

/// Everything needed to turn an embryo into a runnable user process
pub(crate) struct UserSetup<'a> {
    pub name: &'a str,
    pub policy: SchedPolicy,
    /// Code copied to user address 0, empty when the program is native
    pub image: &'a [u8],
    pub program: Box<dyn UserProgram>,
}

/// Prepare an embryo for its first trap return and mark it `Runnable`
pub(crate) fn make_runnable(
    table: &mut ProcessTable,
    slot: SlotIndex,
    setup: UserSetup<'_>,
    resolver: &dyn DirectoryResolver,
) -> Option<Pid> {
    let process = table.get_mut(slot)?;
    if process.state != ProcState::Embryo {
        return None;
    }

    process.policy = setup.policy;

    let memory = process.user_memory_mut();
    let len = setup.image.len().min(memory.len());
    memory[..len].copy_from_slice(&setup.image[..len]);

    process.trap_frame = TrapFrame::user_entry(process.size as Address);
    process.name = InlineString::truncated(setup.name, PROC_NAME_LEN - 1);
    process.cwd = resolver.resolve("/");
    process.program = Some(setup.program);
    process.state = ProcState::Runnable;

    info!(
        pid = process.pid,
        slot,
        name = %process.name,
        policy = %process.policy,
        "process runnable"
    );
    Some(process.pid)
}
