//! Control flow: conditional branches, the decrement-and-branch loop
//! primitive, condition-to-byte, jumps, subroutine linkage and stack
//! frames.
//!
//! Branch displacements are relative to the address just past the opcode
//! word, before any displacement extension is fetched.

use crate::alu::Size;
use crate::bus::Bus;
use crate::cpu::{Cpu, Exec};
use crate::ea::{AddrMode, EffectiveAddress};
use crate::flags::Status;

impl Cpu {
    /// Bcc, plus BRA (condition 0) and BSR (condition 1). An 8-bit
    /// displacement of 0 selects a 16-bit extension; 0xFF selects a 32-bit
    /// one where the model supports it.
    pub(crate) fn exec_bcc<B: Bus>(&mut self, bus: &mut B, cond: u8, disp: i8) -> Exec<()> {
        let base = self.regs.pc;
        let disp = match disp {
            0 => i32::from(self.fetch_word(bus)? as i16),
            -1 if self.caps().long_branch => self.fetch_long(bus)? as i32,
            d => i32::from(d),
        };
        let target = base.wrapping_add(disp as u32);

        if cond == 1 {
            // BSR pushes the address after the displacement
            let ret = self.regs.pc;
            self.push_long(bus, ret)?;
            self.regs.pc = target;
            return Ok(());
        }
        if cond == 0 || Status::condition(self.regs.sr, cond) {
            self.regs.pc = target;
        }
        Ok(())
    }

    /// DBcc: if the condition holds, fall through; otherwise decrement the
    /// counter word and branch unless it ran past zero.
    pub(crate) fn exec_dbcc<B: Bus>(&mut self, bus: &mut B, cond: u8, dn: u8) -> Exec<()> {
        let base = self.regs.pc;
        let disp = i32::from(self.fetch_word(bus)? as i16);
        if Status::condition(self.regs.sr, cond) {
            return Ok(());
        }
        let counter = (self.regs.d[dn as usize] as u16).wrapping_sub(1);
        let reg = &mut self.regs.d[dn as usize];
        *reg = Size::Word.merge(*reg, u32::from(counter));
        if counter != 0xFFFF {
            self.regs.pc = base.wrapping_add(disp as u32);
        }
        Ok(())
    }

    /// Scc: destination byte becomes 0xFF or 0x00. Flags untouched.
    pub(crate) fn exec_scc<B: Bus>(&mut self, bus: &mut B, cond: u8, dst: AddrMode) -> Exec<()> {
        let value = if Status::condition(self.regs.sr, cond) { 0xFF } else { 0x00 };
        let dst = self.resolve_ea(bus, dst, Size::Byte)?;
        self.ea_write(bus, dst, value, Size::Byte)
    }

    pub(crate) fn exec_jmp<B: Bus>(&mut self, bus: &mut B, target: AddrMode) -> Exec<()> {
        let EffectiveAddress::Memory(addr) = self.resolve_ea(bus, target, Size::Long)? else {
            return Err(self.illegal());
        };
        self.regs.pc = addr;
        Ok(())
    }

    pub(crate) fn exec_jsr<B: Bus>(&mut self, bus: &mut B, target: AddrMode) -> Exec<()> {
        let EffectiveAddress::Memory(addr) = self.resolve_ea(bus, target, Size::Long)? else {
            return Err(self.illegal());
        };
        let ret = self.regs.pc;
        self.push_long(bus, ret)?;
        self.regs.pc = addr;
        Ok(())
    }

    pub(crate) fn exec_rts<B: Bus>(&mut self, bus: &mut B) -> Exec<()> {
        self.regs.pc = self.pop_long(bus)?;
        Ok(())
    }

    /// RTR: pop the CCR byte (supervisor half discarded), then the return
    /// address.
    pub(crate) fn exec_rtr<B: Bus>(&mut self, bus: &mut B) -> Exec<()> {
        let ccr = self.pop_word(bus)?;
        self.regs.set_ccr(ccr as u8);
        self.regs.pc = self.pop_long(bus)?;
        Ok(())
    }

    pub(crate) fn exec_link<B: Bus>(&mut self, bus: &mut B, an: u8) -> Exec<()> {
        let disp = i32::from(self.fetch_word(bus)? as i16);
        let frame = self.regs.a(an as usize);
        self.push_long(bus, frame)?;
        let sp = self.regs.a(7);
        self.regs.set_a(an as usize, sp);
        self.regs.set_a(7, sp.wrapping_add(disp as u32));
        Ok(())
    }

    pub(crate) fn exec_unlk<B: Bus>(&mut self, bus: &mut B, an: u8) -> Exec<()> {
        self.regs.set_a(7, self.regs.a(an as usize));
        let frame = self.pop_long(bus)?;
        self.regs.set_a(an as usize, frame);
        Ok(())
    }
}
