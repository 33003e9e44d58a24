//! Status-register access, privilege-checked instructions and the
//! trap-generating group (TRAP, TRAPV, CHK, RTE, STOP, RESET).

use crate::alu::Size;
use crate::bus::Bus;
use crate::cpu::{Cpu, Exec};
use crate::decode::ImmOp;
use crate::ea::AddrMode;
use crate::exceptions::vector;
use crate::flags::{self, Status};

impl Cpu {
    /// MOVE from SR. Unprivileged on the 68000; the later cores made it
    /// supervisor-only and gave user code MOVE from CCR instead.
    pub(crate) fn exec_move_from_sr<B: Bus>(&mut self, bus: &mut B, dst: AddrMode) -> Exec<()> {
        if self.caps().move_from_ccr {
            self.require_supervisor()?;
        }
        let sr = self.regs.sr;
        let dst = self.resolve_ea(bus, dst, Size::Word)?;
        self.ea_write(bus, dst, u32::from(sr), Size::Word)
    }

    pub(crate) fn exec_move_from_ccr<B: Bus>(&mut self, bus: &mut B, dst: AddrMode) -> Exec<()> {
        let ccr = self.regs.ccr();
        let dst = self.resolve_ea(bus, dst, Size::Word)?;
        self.ea_write(bus, dst, u32::from(ccr), Size::Word)
    }

    /// MOVE to CCR reads a word operand but only the low byte lands.
    pub(crate) fn exec_move_to_ccr<B: Bus>(&mut self, bus: &mut B, src: AddrMode) -> Exec<()> {
        let src = self.resolve_ea(bus, src, Size::Word)?;
        let value = self.ea_read(bus, src, Size::Word)?;
        self.regs.set_ccr(value as u8);
        Ok(())
    }

    pub(crate) fn exec_move_to_sr<B: Bus>(&mut self, bus: &mut B, src: AddrMode) -> Exec<()> {
        self.require_supervisor()?;
        let src = self.resolve_ea(bus, src, Size::Word)?;
        let value = self.ea_read(bus, src, Size::Word)?;
        self.regs.set_sr(value as u16);
        Ok(())
    }

    pub(crate) fn exec_imm_to_ccr<B: Bus>(&mut self, bus: &mut B, op: ImmOp) -> Exec<()> {
        let imm = self.fetch_word(bus)? as u8;
        let ccr = self.regs.ccr();
        self.regs.set_ccr(combine(op, ccr, imm));
        Ok(())
    }

    pub(crate) fn exec_imm_to_sr<B: Bus>(&mut self, bus: &mut B, op: ImmOp) -> Exec<()> {
        self.require_supervisor()?;
        let imm = self.fetch_word(bus)?;
        let sr = self.regs.sr;
        let value = match op {
            ImmOp::Andi => sr & imm,
            ImmOp::Ori => sr | imm,
            _ => sr ^ imm,
        };
        self.regs.set_sr(value);
        Ok(())
    }

    pub(crate) fn exec_move_to_usp(&mut self, an: u8) -> Exec<()> {
        self.require_supervisor()?;
        self.regs.usp = self.regs.a(an as usize);
        Ok(())
    }

    pub(crate) fn exec_move_from_usp(&mut self, an: u8) -> Exec<()> {
        self.require_supervisor()?;
        let usp = self.regs.usp;
        self.regs.set_a(an as usize, usp);
        Ok(())
    }

    pub(crate) fn exec_trapv(&mut self) -> Exec<()> {
        if Status::test(self.regs.sr, flags::V) {
            return Err(self.trap(vector::TRAPV));
        }
        Ok(())
    }

    /// CHK: trap through vector 6 when the register word is negative or
    /// above the bound. N tells the handler which side was violated; Z, V
    /// and C come out cleared either way, X survives.
    pub(crate) fn exec_chk<B: Bus>(&mut self, bus: &mut B, dn: u8, src: AddrMode) -> Exec<()> {
        let src = self.resolve_ea(bus, src, Size::Word)?;
        let bound = self.ea_read(bus, src, Size::Word)? as u16 as i16;
        let value = self.regs.d[dn as usize] as u16 as i16;
        let mut sr = self.regs.sr & !(flags::N | flags::Z | flags::V | flags::C);
        if value < 0 {
            sr |= flags::N;
            self.regs.sr = sr;
            return Err(self.trap(vector::CHK));
        }
        if value > bound {
            self.regs.sr = sr;
            return Err(self.trap(vector::CHK));
        }
        self.regs.sr = sr;
        Ok(())
    }

    /// RTE: the SR word is popped and applied first, so the PC pop that
    /// follows already goes through the stack pointer bank the restored SR
    /// selects.
    pub(crate) fn exec_rte<B: Bus>(&mut self, bus: &mut B) -> Exec<()> {
        self.require_supervisor()?;
        let sr = self.pop_word(bus)?;
        self.regs.set_sr(sr);
        self.regs.pc = self.pop_long(bus)?;
        Ok(())
    }

    /// STOP: load SR from the immediate and idle until an interrupt is
    /// taken.
    pub(crate) fn exec_stop<B: Bus>(&mut self, bus: &mut B) -> Exec<()> {
        self.require_supervisor()?;
        let imm = self.fetch_word(bus)?;
        self.regs.set_sr(imm);
        self.set_stopped(true);
        Ok(())
    }

    /// RESET asserts the external reset line for peripherals. There is no
    /// such line on the bus trait, so only the privilege check remains.
    pub(crate) fn exec_reset(&mut self) -> Exec<()> {
        self.require_supervisor()?;
        Ok(())
    }
}

fn combine(op: ImmOp, current: u8, imm: u8) -> u8 {
    match op {
        ImmOp::Andi => current & imm,
        ImmOp::Ori => current | imm,
        _ => current ^ imm,
    }
}
