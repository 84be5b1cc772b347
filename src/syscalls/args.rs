/*!
 * Syscall Arguments
 *
 * Arguments live on the caller's user stack. At trap time `esp` points at
 * the return address pushed by the call into the syscall stub, so argument
 * `n` sits at `esp + 4 + 4*n`.
 */

use crate::core::errors::SyscallError;
use crate::core::types::Address;
use crate::process::Process;

/// Read a 32-bit little-endian integer at `addr` of user memory
///
/// Fails when any of the four bytes lies at or beyond the end of memory.
#[inline]
pub fn fetch_int(memory: &[u8], addr: Address) -> Option<i32> {
    let start = addr as usize;
    let end = start.checked_add(4)?;
    let bytes: [u8; 4] = memory.get(start..end)?.try_into().ok()?;
    Some(i32::from_le_bytes(bytes))
}

/// Fetch the `n`th integer argument of the current syscall
pub fn arg_int(process: &Process, n: usize) -> Result<i32, SyscallError> {
    let fetch_error = |address| SyscallError::ArgumentFetch { index: n, address };

    let offset = u32::try_from(n)
        .ok()
        .and_then(|n| n.checked_mul(4))
        .and_then(|off| off.checked_add(4))
        .ok_or_else(|| fetch_error(process.trap_frame.esp))?;
    let address = process
        .trap_frame
        .esp
        .checked_add(offset)
        .ok_or_else(|| fetch_error(process.trap_frame.esp))?;

    fetch_int(process.user_memory(), address).ok_or_else(|| fetch_error(address))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_int_bounds() {
        let memory = [1u8, 0, 0, 0, 0xff, 0xff, 0xff, 0xff];
        assert_eq!(fetch_int(&memory, 0), Some(1));
        assert_eq!(fetch_int(&memory, 4), Some(-1));
        assert_eq!(fetch_int(&memory, 5), None);
        assert_eq!(fetch_int(&memory, 8), None);
        assert_eq!(fetch_int(&memory, u32::MAX), None);
    }

    #[test]
    fn test_arg_int_without_memory_fails() {
        let process = Process::unused();
        let err = arg_int(&process, 0).unwrap_err();
        assert_eq!(err, SyscallError::ArgumentFetch { index: 0, address: 4 });
        assert_eq!(err.errno(), -1);
    }
}
