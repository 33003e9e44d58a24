//! Boolean operations and single-bit manipulation.
//!
//! The bit instructions size themselves by destination: a data register is
//! a 32-bit bit array (bit number modulo 32), memory is an 8-bit one
//! (modulo 8). Z always reflects the tested bit before any modification.

use crate::alu::Size;
use crate::bus::Bus;
use crate::cpu::{Cpu, Exec};
use crate::decode::BitOp;
use crate::ea::AddrMode;
use crate::flags::{self, Status};

impl Cpu {
    pub(crate) fn exec_and<B: Bus>(
        &mut self,
        bus: &mut B,
        size: Size,
        dn: u8,
        to_ea: bool,
        ea: AddrMode,
    ) -> Exec<()> {
        self.logic_op(bus, size, dn, to_ea, ea, |a, b| a & b)
    }

    pub(crate) fn exec_or<B: Bus>(
        &mut self,
        bus: &mut B,
        size: Size,
        dn: u8,
        to_ea: bool,
        ea: AddrMode,
    ) -> Exec<()> {
        self.logic_op(bus, size, dn, to_ea, ea, |a, b| a | b)
    }

    fn logic_op<B: Bus>(
        &mut self,
        bus: &mut B,
        size: Size,
        dn: u8,
        to_ea: bool,
        ea: AddrMode,
        op: fn(u32, u32) -> u32,
    ) -> Exec<()> {
        let ea = self.resolve_ea(bus, ea, size)?;
        let ea_value = self.ea_read(bus, ea, size)?;
        let reg_value = self.regs.d[dn as usize] & size.mask();
        let result = op(ea_value, reg_value);
        if to_ea {
            self.ea_write(bus, ea, result, size)?;
        } else {
            let reg = &mut self.regs.d[dn as usize];
            *reg = size.merge(*reg, result);
        }
        self.regs.sr = Status::nz_clear_vc(self.regs.sr, result, size);
        Ok(())
    }

    /// EOR only exists in the `Dn -> <ea>` direction.
    pub(crate) fn exec_eor<B: Bus>(
        &mut self,
        bus: &mut B,
        size: Size,
        dn: u8,
        ea: AddrMode,
    ) -> Exec<()> {
        let ea = self.resolve_ea(bus, ea, size)?;
        let result = self.ea_read(bus, ea, size)? ^ (self.regs.d[dn as usize] & size.mask());
        self.ea_write(bus, ea, result, size)?;
        self.regs.sr = Status::nz_clear_vc(self.regs.sr, result, size);
        Ok(())
    }

    pub(crate) fn exec_not<B: Bus>(&mut self, bus: &mut B, size: Size, dst: AddrMode) -> Exec<()> {
        let dst = self.resolve_ea(bus, dst, size)?;
        let result = !self.ea_read(bus, dst, size)? & size.mask();
        self.ea_write(bus, dst, result, size)?;
        self.regs.sr = Status::nz_clear_vc(self.regs.sr, result, size);
        Ok(())
    }

    /// TAS reads, sets N/Z from the value, then writes it back with bit 7
    /// set. The bus sees a plain read and write here; the locked
    /// read-modify-write cycle is a bus-level concern this core does not
    /// model.
    pub(crate) fn exec_tas<B: Bus>(&mut self, bus: &mut B, dst: AddrMode) -> Exec<()> {
        let dst = self.resolve_ea(bus, dst, Size::Byte)?;
        let value = self.ea_read(bus, dst, Size::Byte)?;
        self.regs.sr = Status::nz_clear_vc(self.regs.sr, value, Size::Byte);
        self.ea_write(bus, dst, value | 0x80, Size::Byte)
    }

    pub(crate) fn exec_bit_static<B: Bus>(
        &mut self,
        bus: &mut B,
        op: BitOp,
        dst: AddrMode,
    ) -> Exec<()> {
        let bit = u32::from(self.fetch_word(bus)?) & 0xFF;
        self.bit_op(bus, op, bit, dst)
    }

    pub(crate) fn exec_bit_dynamic<B: Bus>(
        &mut self,
        bus: &mut B,
        op: BitOp,
        dn: u8,
        dst: AddrMode,
    ) -> Exec<()> {
        let bit = self.regs.d[dn as usize];
        self.bit_op(bus, op, bit, dst)
    }

    fn bit_op<B: Bus>(&mut self, bus: &mut B, op: BitOp, bit: u32, dst: AddrMode) -> Exec<()> {
        let (size, bit) = if matches!(dst, AddrMode::DataReg(_)) {
            (Size::Long, bit & 31)
        } else {
            (Size::Byte, bit & 7)
        };
        let dst = self.resolve_ea(bus, dst, size)?;
        let value = self.ea_read(bus, dst, size)?;
        let mask = 1 << bit;
        self.regs.sr = Status::set_if(self.regs.sr, flags::Z, value & mask == 0);
        let result = match op {
            BitOp::Btst => return Ok(()),
            BitOp::Bchg => value ^ mask,
            BitOp::Bclr => value & !mask,
            BitOp::Bset => value | mask,
        };
        self.ea_write(bus, dst, result, size)
    }
}
