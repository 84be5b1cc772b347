/*!
 * Bootstrap Program
 *
 * The first process runs a tiny fixed image:
 *
 * ```text
 * start:
 *     mov  $SYS_get_sched_policy, %eax
 *     int  $T_SYSCALL
 *     jmp  start
 * ```
 */

use crate::core::errors::Halted;
use crate::user::{UserContext, UserProgram};

/// Machine code of the bootstrap loop, copied to user address 0
pub const INITCODE: [u8; 9] = [
    0xb8, 0x16, 0x00, 0x00, 0x00, // mov $22, %eax
    0xcd, 0x40, // int $64
    0xeb, 0xf7, // jmp start
];

/// Behaviour of the bootstrap image
///
/// Each iteration issues the policy query and then gives the CPU back, so
/// the bootstrap process never monopolises the scheduler.
#[derive(Debug, Default, Clone, Copy)]
pub struct InitCode;

impl UserProgram for InitCode {
    fn run(self: Box<Self>, user: &mut UserContext) -> Result<(), Halted> {
        loop {
            user.get_sched_policy();
            user.yield_now()?;
        }
    }
}
