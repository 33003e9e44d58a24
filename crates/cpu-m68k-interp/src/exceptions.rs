//! Exception and interrupt entry.
//!
//! Every architectural exception funnels through [`Cpu::enter_exception`]:
//! switch to supervisor state, push a frame on the supervisor stack, fetch
//! the handler address from the vector table. The frame is the 68000 group
//! 1/2 shape throughout, PC pushed first so SR ends up on top.

use log::warn;

use crate::alu::Size;
use crate::bus::{Bus, BusFault};
use crate::cpu::Cpu;
use crate::flags;

/// Exception vector numbers. Multiply by 4 for the table offset.
pub mod vector {
    pub const ADDRESS_ERROR: u8 = 3;
    pub const ILLEGAL: u8 = 4;
    pub const ZERO_DIVIDE: u8 = 5;
    pub const CHK: u8 = 6;
    pub const TRAPV: u8 = 7;
    pub const PRIVILEGE: u8 = 8;
    pub const TRACE: u8 = 9;
    pub const LINE_A: u8 = 10;
    pub const LINE_F: u8 = 11;
    pub const UNINITIALIZED: u8 = 15;
    pub const AUTOVECTOR_BASE: u8 = 24;
    pub const TRAP_BASE: u8 = 32;
}

impl Cpu {
    /// Take an exception: push `pc` and the pre-exception SR on the
    /// supervisor stack and jump through `vector`.
    ///
    /// A handler address of zero means the vector table entry was never
    /// initialized; such exceptions are redirected through the dedicated
    /// uninitialized-interrupt vector (15), matching what a 68000 does for
    /// uninitialized peripheral vectors.
    pub(crate) fn enter_exception<B: Bus>(
        &mut self,
        bus: &mut B,
        vector: u8,
        pc: u32,
    ) -> Result<(), BusFault> {
        let old_sr = self.regs.sr;
        self.regs.set_supervisor(true);
        self.regs.sr &= !flags::T;

        let sp = self.regs.a(7).wrapping_sub(4);
        bus.write(pc, sp, pc, Size::Long)?;
        let sp = sp.wrapping_sub(2);
        bus.write(pc, sp, u32::from(old_sr), Size::Word)?;
        self.regs.set_a(7, sp);

        let mut handler = bus.read(pc, u32::from(vector) * 4, Size::Long)?;
        if handler == 0 && vector != vector::UNINITIALIZED {
            warn!("vector {vector} uninitialized, redirecting through vector 15");
            handler = bus.read(pc, u32::from(vector::UNINITIALIZED) * 4, Size::Long)?;
        }
        self.regs.pc = handler;
        Ok(())
    }

    /// Take a pending interrupt at `level` (1..=7): autovectored entry that
    /// also raises the interrupt mask to the taken level and releases a
    /// `STOP` state.
    pub(crate) fn enter_interrupt<B: Bus>(
        &mut self,
        bus: &mut B,
        level: u8,
    ) -> Result<(), BusFault> {
        let pc = self.regs.pc;
        self.enter_exception(bus, vector::AUTOVECTOR_BASE + level, pc)?;
        self.regs.set_interrupt_mask(level);
        self.set_stopped(false);
        Ok(())
    }
}
