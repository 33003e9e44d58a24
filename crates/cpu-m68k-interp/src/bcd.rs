//! Packed binary-coded-decimal arithmetic: ABCD, SBCD, NBCD.
//!
//! Two digits per byte, always with the X flag in the chain. The nibble
//! correction algorithms and the undefined-on-paper N/V behavior live in
//! [`crate::alu`]; this module handles the register/predecrement operand
//! plumbing, which is the same two-form shape as ADDX/SUBX.

use crate::alu::{self, Size};
use crate::bus::Bus;
use crate::cpu::{Cpu, Exec};
use crate::ea::{step_for, AddrMode};
use crate::flags::{self, Status};

impl Cpu {
    pub(crate) fn exec_abcd<B: Bus>(&mut self, bus: &mut B, rx: u8, ry: u8, mem: bool) -> Exec<()> {
        self.bcd_binary(bus, rx, ry, mem, alu::bcd_add)
    }

    pub(crate) fn exec_sbcd<B: Bus>(&mut self, bus: &mut B, rx: u8, ry: u8, mem: bool) -> Exec<()> {
        self.bcd_binary(bus, rx, ry, mem, alu::bcd_sub)
    }

    fn bcd_binary<B: Bus>(
        &mut self,
        bus: &mut B,
        rx: u8,
        ry: u8,
        mem: bool,
        op: fn(u8, u8, u8) -> (u8, bool, bool),
    ) -> Exec<()> {
        let x = u8::from(Status::test(self.regs.sr, flags::X));
        if mem {
            let src_addr = self.regs.a(ry as usize).wrapping_sub(step_for(ry, Size::Byte));
            self.regs.set_a(ry as usize, src_addr);
            let src = self.read_bus(bus, src_addr, Size::Byte)? as u8;
            let dst_addr = self.regs.a(rx as usize).wrapping_sub(step_for(rx, Size::Byte));
            self.regs.set_a(rx as usize, dst_addr);
            let dst = self.read_bus(bus, dst_addr, Size::Byte)? as u8;
            let (result, carry, overflow) = op(src, dst, x);
            self.write_bus(bus, dst_addr, u32::from(result), Size::Byte)?;
            self.apply_bcd_flags(result, carry, overflow);
        } else {
            let src = self.regs.d[ry as usize] as u8;
            let dst = self.regs.d[rx as usize] as u8;
            let (result, carry, overflow) = op(src, dst, x);
            let reg = &mut self.regs.d[rx as usize];
            *reg = Size::Byte.merge(*reg, u32::from(result));
            self.apply_bcd_flags(result, carry, overflow);
        }
        Ok(())
    }

    pub(crate) fn exec_nbcd<B: Bus>(&mut self, bus: &mut B, dst: AddrMode) -> Exec<()> {
        let x = u8::from(Status::test(self.regs.sr, flags::X));
        let dst = self.resolve_ea(bus, dst, Size::Byte)?;
        let value = self.ea_read(bus, dst, Size::Byte)? as u8;
        let (result, carry, overflow) = alu::bcd_neg(value, x);
        self.ea_write(bus, dst, u32::from(result), Size::Byte)?;
        self.apply_bcd_flags(result, carry, overflow);
        Ok(())
    }

    /// BCD flag rule: X and C from the decimal carry, Z only ever cleared,
    /// N from the result's top bit, V from the correction step.
    fn apply_bcd_flags(&mut self, result: u8, carry: bool, overflow: bool) {
        let mut sr = self.regs.sr;
        sr = Status::set_if(sr, flags::X, carry);
        sr = Status::set_if(sr, flags::C, carry);
        if result != 0 {
            sr &= !flags::Z;
        }
        sr = Status::set_if(sr, flags::N, result & 0x80 != 0);
        sr = Status::set_if(sr, flags::V, overflow);
        self.regs.sr = sr;
    }
}
