//! Integer arithmetic: binary add/sub in all four encodings (register,
//! address, quick, extended), compares, negation, multiply and divide.
//!
//! Flag production lives in [`crate::alu`]; this module wires operand
//! fetch and writeback around it. Two rules repeat throughout: address
//! register destinations never touch flags, and the X-accumulating forms
//! (ADDX, SUBX, NEGX) can clear Z but never set it.

use crate::alu::{self, Size};
use crate::bus::Bus;
use crate::cpu::{Cpu, Exec};
use crate::decode::ImmOp;
use crate::ea::{step_for, AddrMode};
use crate::exceptions::vector;
use crate::flags::{self, Status};

impl Cpu {
    pub(crate) fn exec_add<B: Bus>(
        &mut self,
        bus: &mut B,
        size: Size,
        dn: u8,
        to_ea: bool,
        ea: AddrMode,
    ) -> Exec<()> {
        self.binary_op(bus, size, dn, to_ea, ea, alu::add)
    }

    pub(crate) fn exec_sub<B: Bus>(
        &mut self,
        bus: &mut B,
        size: Size,
        dn: u8,
        to_ea: bool,
        ea: AddrMode,
    ) -> Exec<()> {
        self.binary_op(bus, size, dn, to_ea, ea, alu::sub)
    }

    /// Shared ADD/SUB shape. `to_ea` selects the `Dn op <ea> -> <ea>`
    /// direction; otherwise the data register is the destination.
    fn binary_op<B: Bus>(
        &mut self,
        bus: &mut B,
        size: Size,
        dn: u8,
        to_ea: bool,
        ea: AddrMode,
        op: fn(u32, u32, Size, u16) -> (u32, u16),
    ) -> Exec<()> {
        let ea = self.resolve_ea(bus, ea, size)?;
        let ea_value = self.ea_read(bus, ea, size)?;
        let reg_value = self.regs.d[dn as usize] & size.mask();
        if to_ea {
            let (result, sr) = op(reg_value, ea_value, size, self.regs.sr);
            self.ea_write(bus, ea, result, size)?;
            self.regs.sr = sr;
        } else {
            let (result, sr) = op(ea_value, reg_value, size, self.regs.sr);
            let reg = &mut self.regs.d[dn as usize];
            *reg = size.merge(*reg, result);
            self.regs.sr = sr;
        }
        Ok(())
    }

    pub(crate) fn exec_adda<B: Bus>(
        &mut self,
        bus: &mut B,
        size: Size,
        an: u8,
        ea: AddrMode,
    ) -> Exec<()> {
        let ea = self.resolve_ea(bus, ea, size)?;
        let value = size.sign_extend(self.ea_read(bus, ea, size)?);
        let result = self.regs.a(an as usize).wrapping_add(value);
        self.regs.set_a(an as usize, result);
        Ok(())
    }

    pub(crate) fn exec_suba<B: Bus>(
        &mut self,
        bus: &mut B,
        size: Size,
        an: u8,
        ea: AddrMode,
    ) -> Exec<()> {
        let ea = self.resolve_ea(bus, ea, size)?;
        let value = size.sign_extend(self.ea_read(bus, ea, size)?);
        let result = self.regs.a(an as usize).wrapping_sub(value);
        self.regs.set_a(an as usize, result);
        Ok(())
    }

    pub(crate) fn exec_addx<B: Bus>(
        &mut self,
        bus: &mut B,
        size: Size,
        rx: u8,
        ry: u8,
        mem: bool,
    ) -> Exec<()> {
        self.extended_op(bus, size, rx, ry, mem, alu::addx)
    }

    pub(crate) fn exec_subx<B: Bus>(
        &mut self,
        bus: &mut B,
        size: Size,
        rx: u8,
        ry: u8,
        mem: bool,
    ) -> Exec<()> {
        self.extended_op(bus, size, rx, ry, mem, alu::subx)
    }

    /// ADDX/SUBX operand plumbing. The memory form predecrements the
    /// source register first, then the destination, mirroring how the
    /// hardware sequences the two accesses.
    fn extended_op<B: Bus>(
        &mut self,
        bus: &mut B,
        size: Size,
        rx: u8,
        ry: u8,
        mem: bool,
        op: fn(u32, u32, Size, u16) -> (u32, u16),
    ) -> Exec<()> {
        if mem {
            let src_addr = self.regs.a(ry as usize).wrapping_sub(step_for(ry, size));
            self.regs.set_a(ry as usize, src_addr);
            let src = self.read_bus(bus, src_addr, size)?;
            let dst_addr = self.regs.a(rx as usize).wrapping_sub(step_for(rx, size));
            self.regs.set_a(rx as usize, dst_addr);
            let dst = self.read_bus(bus, dst_addr, size)?;
            let (result, sr) = op(src, dst, size, self.regs.sr);
            self.write_bus(bus, dst_addr, result, size)?;
            self.regs.sr = sr;
        } else {
            let src = self.regs.d[ry as usize] & size.mask();
            let dst = self.regs.d[rx as usize] & size.mask();
            let (result, sr) = op(src, dst, size, self.regs.sr);
            let reg = &mut self.regs.d[rx as usize];
            *reg = size.merge(*reg, result);
            self.regs.sr = sr;
        }
        Ok(())
    }

    pub(crate) fn exec_addq<B: Bus>(
        &mut self,
        bus: &mut B,
        data: u8,
        size: Size,
        dst: AddrMode,
    ) -> Exec<()> {
        self.quick_op(bus, data, size, dst, true)
    }

    pub(crate) fn exec_subq<B: Bus>(
        &mut self,
        bus: &mut B,
        data: u8,
        size: Size,
        dst: AddrMode,
    ) -> Exec<()> {
        self.quick_op(bus, data, size, dst, false)
    }

    fn quick_op<B: Bus>(
        &mut self,
        bus: &mut B,
        data: u8,
        size: Size,
        dst: AddrMode,
        is_add: bool,
    ) -> Exec<()> {
        // Quick math on an address register always works on the full
        // register and leaves the flags alone, regardless of size.
        if let AddrMode::AddrReg(r) = dst {
            let current = self.regs.a(r as usize);
            let value = u32::from(data);
            let result = if is_add {
                current.wrapping_add(value)
            } else {
                current.wrapping_sub(value)
            };
            self.regs.set_a(r as usize, result);
            return Ok(());
        }
        let dst = self.resolve_ea(bus, dst, size)?;
        let current = self.ea_read(bus, dst, size)?;
        let op = if is_add { alu::add } else { alu::sub };
        let (result, sr) = op(u32::from(data), current, size, self.regs.sr);
        self.ea_write(bus, dst, result, size)?;
        self.regs.sr = sr;
        Ok(())
    }

    pub(crate) fn exec_cmp<B: Bus>(
        &mut self,
        bus: &mut B,
        size: Size,
        dn: u8,
        ea: AddrMode,
    ) -> Exec<()> {
        let ea = self.resolve_ea(bus, ea, size)?;
        let src = self.ea_read(bus, ea, size)?;
        let dst = self.regs.d[dn as usize] & size.mask();
        self.regs.sr = alu::cmp(src, dst, size, self.regs.sr);
        Ok(())
    }

    /// CMPA sign extends word sources and always compares the full 32-bit
    /// address register.
    pub(crate) fn exec_cmpa<B: Bus>(
        &mut self,
        bus: &mut B,
        size: Size,
        an: u8,
        ea: AddrMode,
    ) -> Exec<()> {
        let ea = self.resolve_ea(bus, ea, size)?;
        let src = size.sign_extend(self.ea_read(bus, ea, size)?);
        let dst = self.regs.a(an as usize);
        self.regs.sr = alu::cmp(src, dst, Size::Long, self.regs.sr);
        Ok(())
    }

    pub(crate) fn exec_cmpm<B: Bus>(
        &mut self,
        bus: &mut B,
        size: Size,
        ax: u8,
        ay: u8,
    ) -> Exec<()> {
        // Both registers postincrement, source (Ay) first.
        let src_addr = self.regs.a(ay as usize);
        self.regs.set_a(ay as usize, src_addr.wrapping_add(step_for(ay, size)));
        let src = self.read_bus(bus, src_addr, size)?;
        let dst_addr = self.regs.a(ax as usize);
        self.regs.set_a(ax as usize, dst_addr.wrapping_add(step_for(ax, size)));
        let dst = self.read_bus(bus, dst_addr, size)?;
        self.regs.sr = alu::cmp(src, dst, size, self.regs.sr);
        Ok(())
    }

    pub(crate) fn exec_neg<B: Bus>(&mut self, bus: &mut B, size: Size, dst: AddrMode) -> Exec<()> {
        self.unary_op(bus, size, dst, alu::neg)
    }

    pub(crate) fn exec_negx<B: Bus>(&mut self, bus: &mut B, size: Size, dst: AddrMode) -> Exec<()> {
        self.unary_op(bus, size, dst, alu::negx)
    }

    fn unary_op<B: Bus>(
        &mut self,
        bus: &mut B,
        size: Size,
        dst: AddrMode,
        op: fn(u32, Size, u16) -> (u32, u16),
    ) -> Exec<()> {
        let dst = self.resolve_ea(bus, dst, size)?;
        let value = self.ea_read(bus, dst, size)?;
        let (result, sr) = op(value, size, self.regs.sr);
        self.ea_write(bus, dst, result, size)?;
        self.regs.sr = sr;
        Ok(())
    }

    pub(crate) fn exec_tst<B: Bus>(&mut self, bus: &mut B, size: Size, src: AddrMode) -> Exec<()> {
        let src = self.resolve_ea(bus, src, size)?;
        let value = self.ea_read(bus, src, size)?;
        self.regs.sr = Status::nz_clear_vc(self.regs.sr, value, size);
        Ok(())
    }

    /// Immediate ALU group. CMPI only reads; the others read, combine and
    /// write back.
    pub(crate) fn exec_imm<B: Bus>(
        &mut self,
        bus: &mut B,
        op: ImmOp,
        size: Size,
        dst: AddrMode,
    ) -> Exec<()> {
        let imm = match size {
            Size::Byte => u32::from(self.fetch_word(bus)?) & 0xFF,
            Size::Word => u32::from(self.fetch_word(bus)?),
            Size::Long => self.fetch_long(bus)?,
        };
        let dst = self.resolve_ea(bus, dst, size)?;
        let current = self.ea_read(bus, dst, size)?;
        let (result, sr) = match op {
            ImmOp::Addi => alu::add(imm, current, size, self.regs.sr),
            ImmOp::Subi => alu::sub(imm, current, size, self.regs.sr),
            ImmOp::Cmpi => {
                self.regs.sr = alu::cmp(imm, current, size, self.regs.sr);
                return Ok(());
            }
            ImmOp::Andi => {
                let r = current & imm;
                (r, Status::nz_clear_vc(self.regs.sr, r, size))
            }
            ImmOp::Ori => {
                let r = current | imm;
                (r, Status::nz_clear_vc(self.regs.sr, r, size))
            }
            ImmOp::Eori => {
                let r = current ^ imm;
                (r, Status::nz_clear_vc(self.regs.sr, r, size))
            }
        };
        self.ea_write(bus, dst, result, size)?;
        self.regs.sr = sr;
        Ok(())
    }

    pub(crate) fn exec_mulu<B: Bus>(&mut self, bus: &mut B, dn: u8, src: AddrMode) -> Exec<()> {
        let src = self.resolve_ea(bus, src, Size::Word)?;
        let src = self.ea_read(bus, src, Size::Word)?;
        let dst = self.regs.d[dn as usize] & 0xFFFF;
        let result = src * dst;
        self.regs.d[dn as usize] = result;
        self.regs.sr = Status::nz_clear_vc(self.regs.sr, result, Size::Long);
        Ok(())
    }

    pub(crate) fn exec_muls<B: Bus>(&mut self, bus: &mut B, dn: u8, src: AddrMode) -> Exec<()> {
        let src = self.resolve_ea(bus, src, Size::Word)?;
        let src = self.ea_read(bus, src, Size::Word)? as u16 as i16;
        let dst = self.regs.d[dn as usize] as u16 as i16;
        let result = (i32::from(src) * i32::from(dst)) as u32;
        self.regs.d[dn as usize] = result;
        self.regs.sr = Status::nz_clear_vc(self.regs.sr, result, Size::Long);
        Ok(())
    }

    /// DIVU: 32/16 unsigned. Divide by zero traps through vector 5 with
    /// the destination untouched; quotient overflow sets V (and N) and
    /// also leaves the destination untouched.
    pub(crate) fn exec_divu<B: Bus>(&mut self, bus: &mut B, dn: u8, src: AddrMode) -> Exec<()> {
        let src = self.resolve_ea(bus, src, Size::Word)?;
        let divisor = self.ea_read(bus, src, Size::Word)?;
        if divisor == 0 {
            return Err(self.trap(vector::ZERO_DIVIDE));
        }
        let dividend = self.regs.d[dn as usize];
        let quotient = dividend / divisor;
        let remainder = dividend % divisor;
        if quotient > 0xFFFF {
            self.regs.sr = (self.regs.sr & !(flags::Z | flags::C)) | flags::V | flags::N;
            return Ok(());
        }
        self.regs.d[dn as usize] = (remainder << 16) | quotient;
        let mut sr = self.regs.sr & !(flags::V | flags::C);
        sr = Status::set_if(sr, flags::N, quotient & 0x8000 != 0);
        sr = Status::set_if(sr, flags::Z, quotient == 0);
        self.regs.sr = sr;
        Ok(())
    }

    /// DIVS: 32/16 signed, truncating toward zero, remainder taking the
    /// dividend's sign. Same trap and overflow contract as DIVU.
    pub(crate) fn exec_divs<B: Bus>(&mut self, bus: &mut B, dn: u8, src: AddrMode) -> Exec<()> {
        let src = self.resolve_ea(bus, src, Size::Word)?;
        let divisor = i32::from(self.ea_read(bus, src, Size::Word)? as u16 as i16);
        if divisor == 0 {
            return Err(self.trap(vector::ZERO_DIVIDE));
        }
        let dividend = self.regs.d[dn as usize] as i32;
        let quotient = dividend.wrapping_div(divisor);
        let remainder = dividend.wrapping_rem(divisor);
        if quotient < i32::from(i16::MIN) || quotient > i32::from(i16::MAX) {
            self.regs.sr = (self.regs.sr & !(flags::Z | flags::C)) | flags::V | flags::N;
            return Ok(());
        }
        self.regs.d[dn as usize] = ((remainder as u32) << 16) | (quotient as u32 & 0xFFFF);
        let mut sr = self.regs.sr & !(flags::V | flags::C);
        sr = Status::set_if(sr, flags::N, quotient < 0);
        sr = Status::set_if(sr, flags::Z, quotient == 0);
        self.regs.sr = sr;
        Ok(())
    }

    /// MULU.L/MULS.L, 32x32 -> 32. The 64-bit form (extension bit 10) is
    /// not implemented and decodes as illegal.
    pub(crate) fn exec_mul_long<B: Bus>(&mut self, bus: &mut B, src: AddrMode) -> Exec<()> {
        let ext = self.fetch_word(bus)?;
        if ext & 0x0400 != 0 {
            return Err(self.illegal());
        }
        let dl = ((ext >> 12) & 7) as usize;
        let signed = ext & 0x0800 != 0;
        let src = self.resolve_ea(bus, src, Size::Long)?;
        let src = self.ea_read(bus, src, Size::Long)?;
        let dst = self.regs.d[dl];
        let (result, overflow) = if signed {
            let wide = i64::from(src as i32) * i64::from(dst as i32);
            (wide as u32, wide != i64::from(wide as i32))
        } else {
            let wide = u64::from(src) * u64::from(dst);
            (wide as u32, wide > u64::from(u32::MAX))
        };
        self.regs.d[dl] = result;
        let mut sr = Status::nz(self.regs.sr, result, Size::Long) & !flags::C;
        sr = Status::set_if(sr, flags::V, overflow);
        self.regs.sr = sr;
        Ok(())
    }

    /// DIVU.L/DIVS.L, 32/32 -> 32 quotient in Dq and remainder in Dr.
    pub(crate) fn exec_div_long<B: Bus>(&mut self, bus: &mut B, src: AddrMode) -> Exec<()> {
        let ext = self.fetch_word(bus)?;
        if ext & 0x0400 != 0 {
            return Err(self.illegal());
        }
        let dq = ((ext >> 12) & 7) as usize;
        let dr = (ext & 7) as usize;
        let signed = ext & 0x0800 != 0;
        let src = self.resolve_ea(bus, src, Size::Long)?;
        let divisor = self.ea_read(bus, src, Size::Long)?;
        if divisor == 0 {
            return Err(self.trap(vector::ZERO_DIVIDE));
        }
        let dividend = self.regs.d[dq];
        let (quotient, remainder, overflow) = if signed {
            let (n, d) = (dividend as i32, divisor as i32);
            if n == i32::MIN && d == -1 {
                (0, 0, true)
            } else {
                ((n / d) as u32, (n % d) as u32, false)
            }
        } else {
            (dividend / divisor, dividend % divisor, false)
        };
        if overflow {
            self.regs.sr = (self.regs.sr & !flags::C) | flags::V;
            return Ok(());
        }
        self.regs.d[dq] = quotient;
        if dr != dq {
            self.regs.d[dr] = remainder;
        }
        let mut sr = Status::nz(self.regs.sr, quotient, Size::Long);
        sr &= !(flags::V | flags::C);
        self.regs.sr = sr;
        Ok(())
    }
}
