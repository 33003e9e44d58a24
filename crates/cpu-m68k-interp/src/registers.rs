//! CPU register file.
//!
//! - D0-D7: 8 data registers (32-bit)
//! - A0-A7: 8 address registers (32-bit, A7 is the active stack pointer)
//! - USP/SSP: the two A7 banks; which one A7 names depends on the S bit
//! - PC: program counter
//! - SR: status register
//!
//! The A7 bank selection is centralized here: `a(7)`/`set_a(7)` consult the
//! supervisor bit at the moment of access, never a cached copy. The struct is
//! `Copy` and doubles as the debugger snapshot; `Cpu::registers()` hands out
//! the whole thing and `Cpu::set_registers()` swallows it back atomically.

use crate::flags::{S, SR_MASK, T};

/// Full 68k register set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Registers {
    /// Data registers D0-D7.
    pub d: [u32; 8],
    /// Address registers A0-A6 (A7 lives in `usp`/`ssp`).
    pub a: [u32; 7],
    /// User stack pointer (A7 when the S bit is clear).
    pub usp: u32,
    /// Supervisor stack pointer (A7 when the S bit is set).
    pub ssp: u32,
    /// Program counter.
    pub pc: u32,
    /// Status register.
    pub sr: u16,
}

impl Default for Registers {
    fn default() -> Self {
        Self::new()
    }
}

impl Registers {
    /// Registers in reset state: supervisor mode, interrupt mask 7.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            d: [0; 8],
            a: [0; 7],
            usp: 0,
            ssp: 0,
            pc: 0,
            sr: 0x2700,
        }
    }

    /// Address register by index (0-7). Index 7 resolves through the active
    /// stack-pointer bank.
    #[must_use]
    pub fn a(&self, n: usize) -> u32 {
        debug_assert!(n < 8);
        if n < 7 { self.a[n] } else { self.active_sp() }
    }

    /// Set address register by index (0-7).
    pub fn set_a(&mut self, n: usize, value: u32) {
        debug_assert!(n < 8);
        if n < 7 {
            self.a[n] = value;
        } else {
            self.set_active_sp(value);
        }
    }

    /// The active stack pointer (USP or SSP per the S bit).
    #[must_use]
    pub const fn active_sp(&self) -> u32 {
        if self.is_supervisor() { self.ssp } else { self.usp }
    }

    /// Set the active stack pointer.
    pub fn set_active_sp(&mut self, value: u32) {
        if self.is_supervisor() {
            self.ssp = value;
        } else {
            self.usp = value;
        }
    }

    /// True when the S bit is set.
    #[must_use]
    pub const fn is_supervisor(&self) -> bool {
        self.sr & S != 0
    }

    pub fn set_supervisor(&mut self, supervisor: bool) {
        if supervisor {
            self.sr |= S;
        } else {
            self.sr &= !S;
        }
    }

    /// True when the trace bit is set.
    #[must_use]
    pub const fn is_trace(&self) -> bool {
        self.sr & T != 0
    }

    /// The 3-bit interrupt mask.
    #[must_use]
    pub const fn interrupt_mask(&self) -> u8 {
        ((self.sr >> 8) & 0x07) as u8
    }

    /// Set the interrupt mask (0-7).
    pub fn set_interrupt_mask(&mut self, level: u8) {
        self.sr = (self.sr & !0x0700) | (u16::from(level & 0x07) << 8);
    }

    /// The condition code register (low byte of SR).
    #[must_use]
    pub const fn ccr(&self) -> u8 {
        (self.sr & 0xFF) as u8
    }

    /// Replace only the condition codes.
    pub fn set_ccr(&mut self, value: u8) {
        self.sr = (self.sr & 0xFF00) | (u16::from(value) & 0x1F);
    }

    /// Replace the whole SR, masking reserved bits.
    pub fn set_sr(&mut self, value: u16) {
        self.sr = value & SR_MASK;
    }
}
