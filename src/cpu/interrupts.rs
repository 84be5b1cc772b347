/*!
 * Interrupt State
 *
 * Nested interrupt disabling. `push_off`/`pop_off` are like `cli`/`sti`
 * except that they are matched: two `push_off`s need two `pop_off`s to
 * undo, and if interrupts were off to begin with they stay off.
 */

use super::kernel_panic;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InterruptState {
    enabled: bool,
    /// Depth of `push_off` nesting
    ncli: u32,
    /// Were interrupts enabled before the outermost `push_off`?
    intena: bool,
}

impl InterruptState {
    pub const fn new() -> Self {
        Self {
            enabled: false,
            ncli: 0,
            intena: false,
        }
    }

    #[inline(always)]
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    #[inline]
    pub fn sti(&mut self) {
        self.enabled = true;
    }

    #[inline]
    pub fn cli(&mut self) {
        self.enabled = false;
    }

    #[inline]
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn push_off(&mut self) {
        let was_enabled = self.enabled;
        self.cli();
        if self.ncli == 0 {
            self.intena = was_enabled;
        }
        self.ncli += 1;
    }

    pub fn pop_off(&mut self) {
        if self.enabled {
            kernel_panic("pop_off - interruptible");
        }
        if self.ncli == 0 {
            kernel_panic("pop_off");
        }
        self.ncli -= 1;
        if self.ncli == 0 && self.intena {
            self.sti();
        }
    }

    #[inline(always)]
    pub fn depth(&self) -> u32 {
        self.ncli
    }

    #[inline(always)]
    pub fn intena(&self) -> bool {
        self.intena
    }

    /// Restore the saved pre-`push_off` state of a resumed execution unit
    #[inline]
    pub fn set_intena(&mut self, intena: bool) {
        self.intena = intena;
    }
}
