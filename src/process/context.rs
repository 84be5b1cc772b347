/*!
 * Register Images
 *
 * - `TrapFrame`: user-mode registers saved on entry to the kernel and
 *   restored by trap return
 * - `Context`: callee-saved kernel registers captured by a context switch
 */

use crate::core::limits::{DPL_USER, SEG_UCODE, SEG_UDATA};
use crate::core::types::Address;
use bitflags::bitflags;

/// Kernel text addresses used as resume points
pub mod entry {
    use crate::core::types::Address;

    /// Return-to-user path; a new process's first dispatch resumes here
    pub const TRAP_RETURN: Address = 0x8010_2f3c;

    /// Instruction following the switch call; every yielded unit resumes here
    pub const SWITCH_RETURN: Address = 0x8010_4a1e;
}

bitflags! {
    /// EFLAGS register bits
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct EFlags: u32 {
        const CF = 1 << 0;
        const ZF = 1 << 6;
        const SF = 1 << 7;
        const TF = 1 << 8;
        /// Interrupt enable
        const IF = 1 << 9;
        const DF = 1 << 10;
        const OF = 1 << 11;
    }
}

/// Layout of the user register image pushed by a trap
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrapFrame {
    // pushed by pusha
    pub edi: u32,
    pub esi: u32,
    pub ebp: u32,
    pub oesp: u32,
    pub ebx: u32,
    pub edx: u32,
    pub ecx: u32,
    pub eax: u32,

    // segment registers
    pub gs: u32,
    pub fs: u32,
    pub es: u32,
    pub ds: u32,
    pub trapno: u32,

    // pushed by the hardware
    pub err: u32,
    pub eip: Address,
    pub cs: u32,
    pub eflags: EFlags,

    // only when crossing rings
    pub esp: Address,
    pub ss: u32,
}

impl TrapFrame {
    /// Bytes the frame occupies at the top of the kernel stack
    pub const SIZE: usize = std::mem::size_of::<Self>();

    /// Fresh user-mode entry: user segments, interrupts on, stack at `stack_top`,
    /// execution from address 0
    pub fn user_entry(stack_top: Address) -> Self {
        let data = (SEG_UDATA << 3) | DPL_USER;
        Self {
            cs: (SEG_UCODE << 3) | DPL_USER,
            ds: data,
            es: data,
            ss: data,
            eflags: EFlags::IF,
            esp: stack_top,
            eip: 0,
            ..Self::default()
        }
    }

    #[inline]
    pub fn interrupts_enabled(&self) -> bool {
        self.eflags.contains(EFlags::IF)
    }
}

/// Saved kernel registers of one execution unit
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Context {
    pub edi: u32,
    pub esi: u32,
    pub ebx: u32,
    pub ebp: u32,
    pub eip: Address,
}

impl Context {
    pub const SIZE: usize = std::mem::size_of::<Self>();

    /// Context of a unit that has never run: resumes in trap return
    pub fn first_entry() -> Self {
        Self {
            eip: entry::TRAP_RETURN,
            ..Self::default()
        }
    }

    #[inline]
    pub fn resumes_at_trap_return(&self) -> bool {
        self.eip == entry::TRAP_RETURN
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_image_sizes() {
        assert_eq!(TrapFrame::SIZE, 19 * 4);
        assert_eq!(Context::SIZE, 5 * 4);
    }

    #[test]
    fn test_user_entry_frame() {
        let tf = TrapFrame::user_entry(3072);
        assert_eq!(tf.cs, 0x1b);
        assert_eq!(tf.ds, 0x23);
        assert_eq!(tf.es, tf.ds);
        assert_eq!(tf.ss, tf.ds);
        assert_eq!(tf.eflags, EFlags::IF);
        assert!(tf.interrupts_enabled());
        assert_eq!(tf.esp, 3072);
        assert_eq!(tf.eip, 0);
        assert_eq!(tf.eax, 0);
    }

    #[test]
    fn test_first_entry_context() {
        let ctx = Context::first_entry();
        assert!(ctx.resumes_at_trap_return());
        assert_eq!(ctx.ebp, 0);
        assert!(!Context::default().resumes_at_trap_return());
    }
}
