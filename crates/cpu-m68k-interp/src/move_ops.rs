//! Data-movement instructions: MOVE and its register, multi-register and
//! peripheral variants, plus the register-shuffling group (EXG, SWAP, EXT,
//! LEA, PEA, CLR).

use crate::alu::Size;
use crate::bus::Bus;
use crate::cpu::{Cpu, Exec};
use crate::decode::ExgPair;
use crate::ea::{AddrMode, EffectiveAddress};
use crate::flags::Status;

impl Cpu {
    pub(crate) fn exec_move<B: Bus>(
        &mut self,
        bus: &mut B,
        size: Size,
        src: AddrMode,
        dst: AddrMode,
    ) -> Exec<()> {
        let src = self.resolve_ea(bus, src, size)?;
        let value = self.ea_read(bus, src, size)?;
        self.regs.sr = Status::nz_clear_vc(self.regs.sr, value, size);
        let dst = self.resolve_ea(bus, dst, size)?;
        self.ea_write(bus, dst, value, size)
    }

    /// MOVEA: the full address register is replaced, word sources sign
    /// extend, and no flag changes.
    pub(crate) fn exec_movea<B: Bus>(
        &mut self,
        bus: &mut B,
        size: Size,
        src: AddrMode,
        an: u8,
    ) -> Exec<()> {
        let src = self.resolve_ea(bus, src, size)?;
        let value = self.ea_read(bus, src, size)?;
        self.regs.set_a(an as usize, size.sign_extend(value));
        Ok(())
    }

    pub(crate) fn exec_moveq(&mut self, dn: u8, data: i8) -> Exec<()> {
        let value = data as i32 as u32;
        self.regs.d[dn as usize] = value;
        self.regs.sr = Status::nz_clear_vc(self.regs.sr, value, Size::Long);
        Ok(())
    }

    /// MOVEM. The predecrement form stores A7 down to D0 at descending
    /// addresses; every other form transfers D0 up to A7 ascending. Word
    /// loads sign extend into the full register.
    pub(crate) fn exec_movem<B: Bus>(
        &mut self,
        bus: &mut B,
        to_mem: bool,
        long: bool,
        ea: AddrMode,
    ) -> Exec<()> {
        let mask = self.fetch_word(bus)?;
        let size = if long { Size::Long } else { Size::Word };
        let step = size.bytes();

        if to_mem {
            if let AddrMode::AddrIndPreDec(r) = ea {
                // Register values are sampled before the base register is
                // committed, so a list containing the base stores its
                // original value.
                let mut addr = self.regs.a(r as usize);
                for bit in 0..16usize {
                    if (mask >> bit) & 1 == 0 {
                        continue;
                    }
                    let value = if bit < 8 {
                        self.regs.a(7 - bit)
                    } else {
                        self.regs.d[15 - bit]
                    };
                    addr = addr.wrapping_sub(step);
                    self.write_bus(bus, addr, value, size)?;
                }
                self.regs.set_a(r as usize, addr);
                return Ok(());
            }
            let EffectiveAddress::Memory(mut addr) = self.resolve_ea(bus, ea, size)? else {
                return Err(self.illegal());
            };
            for bit in 0..16usize {
                if (mask >> bit) & 1 == 0 {
                    continue;
                }
                let value = if bit < 8 {
                    self.regs.d[bit]
                } else {
                    self.regs.a(bit - 8)
                };
                self.write_bus(bus, addr, value, size)?;
                addr = addr.wrapping_add(step);
            }
            return Ok(());
        }

        let (mut addr, postinc_reg) = if let AddrMode::AddrIndPostInc(r) = ea {
            (self.regs.a(r as usize), Some(r as usize))
        } else {
            let EffectiveAddress::Memory(addr) = self.resolve_ea(bus, ea, size)? else {
                return Err(self.illegal());
            };
            (addr, None)
        };
        for bit in 0..16usize {
            if (mask >> bit) & 1 == 0 {
                continue;
            }
            let value = size.sign_extend(self.read_bus(bus, addr, size)?);
            if bit < 8 {
                self.regs.d[bit] = value;
            } else {
                self.regs.set_a(bit - 8, value);
            }
            addr = addr.wrapping_add(step);
        }
        if let Some(r) = postinc_reg {
            self.regs.set_a(r, addr);
        }
        Ok(())
    }

    /// MOVEP transfers a register to or from alternate bytes of memory,
    /// high byte first, for 8-bit peripherals on a 16-bit bus.
    pub(crate) fn exec_movep<B: Bus>(
        &mut self,
        bus: &mut B,
        dn: u8,
        an: u8,
        to_mem: bool,
        long: bool,
    ) -> Exec<()> {
        let disp = self.fetch_word(bus)? as i16;
        let mut addr = self.regs.a(an as usize).wrapping_add(disp as u32);
        let count = if long { 4 } else { 2 };

        if to_mem {
            let value = self.regs.d[dn as usize];
            for i in (0..count).rev() {
                self.write_bus(bus, addr, (value >> (i * 8)) & 0xFF, Size::Byte)?;
                addr = addr.wrapping_add(2);
            }
        } else {
            let mut value = 0u32;
            for _ in 0..count {
                value = (value << 8) | self.read_bus(bus, addr, Size::Byte)?;
                addr = addr.wrapping_add(2);
            }
            let reg = &mut self.regs.d[dn as usize];
            *reg = if long { value } else { Size::Word.merge(*reg, value) };
        }
        Ok(())
    }

    pub(crate) fn exec_lea<B: Bus>(&mut self, bus: &mut B, an: u8, src: AddrMode) -> Exec<()> {
        let EffectiveAddress::Memory(addr) = self.resolve_ea(bus, src, Size::Long)? else {
            return Err(self.illegal());
        };
        self.regs.set_a(an as usize, addr);
        Ok(())
    }

    pub(crate) fn exec_pea<B: Bus>(&mut self, bus: &mut B, src: AddrMode) -> Exec<()> {
        let EffectiveAddress::Memory(addr) = self.resolve_ea(bus, src, Size::Long)? else {
            return Err(self.illegal());
        };
        self.push_long(bus, addr)
    }

    pub(crate) fn exec_exg(&mut self, pair: ExgPair, rx: u8, ry: u8) -> Exec<()> {
        let (rx, ry) = (rx as usize, ry as usize);
        match pair {
            ExgPair::DataData => self.regs.d.swap(rx, ry),
            ExgPair::AddrAddr => {
                let tmp = self.regs.a(rx);
                let other = self.regs.a(ry);
                self.regs.set_a(rx, other);
                self.regs.set_a(ry, tmp);
            }
            ExgPair::DataAddr => {
                let tmp = self.regs.d[rx];
                self.regs.d[rx] = self.regs.a(ry);
                self.regs.set_a(ry, tmp);
            }
        }
        Ok(())
    }

    pub(crate) fn exec_swap(&mut self, dn: u8) -> Exec<()> {
        let value = self.regs.d[dn as usize].rotate_right(16);
        self.regs.d[dn as usize] = value;
        self.regs.sr = Status::nz_clear_vc(self.regs.sr, value, Size::Long);
        Ok(())
    }

    pub(crate) fn exec_ext(&mut self, dn: u8, long: bool) -> Exec<()> {
        let reg = &mut self.regs.d[dn as usize];
        let size = if long {
            *reg = Size::Word.sign_extend(*reg);
            Size::Long
        } else {
            *reg = Size::Word.merge(*reg, Size::Byte.sign_extend(*reg));
            Size::Word
        };
        let result = self.regs.d[dn as usize];
        self.regs.sr = Status::nz_clear_vc(self.regs.sr, result, size);
        Ok(())
    }

    pub(crate) fn exec_extb(&mut self, dn: u8) -> Exec<()> {
        let value = Size::Byte.sign_extend(self.regs.d[dn as usize]);
        self.regs.d[dn as usize] = value;
        self.regs.sr = Status::nz_clear_vc(self.regs.sr, value, Size::Long);
        Ok(())
    }

    pub(crate) fn exec_clr<B: Bus>(&mut self, bus: &mut B, size: Size, dst: AddrMode) -> Exec<()> {
        let dst = self.resolve_ea(bus, dst, size)?;
        self.ea_write(bus, dst, 0, size)?;
        self.regs.sr = Status::nz_clear_vc(self.regs.sr, 0, size);
        Ok(())
    }
}
