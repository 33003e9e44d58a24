//! Addressing modes and effective-address resolution.
//!
//! `resolve_ea` turns a decoded [`AddrMode`] into an [`EffectiveAddress`],
//! consuming extension words from the instruction stream and committing
//! post-increment/pre-decrement side effects exactly once. The resolved value
//! can then be read and written any number of times (read-modify-write
//! instructions need both) without re-firing side effects.
//!
//! Legality is the caller's job: each instruction validates its addressing
//! mode *before* resolving, so an illegal combination never gets far enough
//! to move a register. The category predicates on `AddrMode` encode the
//! standard 68k EA classes (data, memory, control, alterable).

use crate::alu::Size;
use crate::bus::Bus;
use crate::cpu::{Cpu, Exec};
use crate::exceptions::vector;

/// A decoded 6-bit mode+register addressing field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddrMode {
    /// `Dn`
    DataReg(u8),
    /// `An`
    AddrReg(u8),
    /// `(An)`
    AddrInd(u8),
    /// `(An)+`
    AddrIndPostInc(u8),
    /// `-(An)`
    AddrIndPreDec(u8),
    /// `d16(An)`
    AddrIndDisp(u8),
    /// `d8(An,Xn)` (brief or, on the EC020, full extension word)
    AddrIndIndex(u8),
    /// `(xxx).W`
    AbsShort,
    /// `(xxx).L`
    AbsLong,
    /// `d16(PC)`
    PcDisp,
    /// `d8(PC,Xn)`
    PcIndex,
    /// `#imm` (mode 7 register 4), reserved exclusively for immediates.
    Immediate,
}

impl AddrMode {
    /// Decode a mode/register field pair. Returns `None` for the reserved
    /// mode-7 encodings (registers 5-7).
    #[must_use]
    pub const fn decode(mode: u8, reg: u8) -> Option<Self> {
        match mode {
            0 => Some(Self::DataReg(reg)),
            1 => Some(Self::AddrReg(reg)),
            2 => Some(Self::AddrInd(reg)),
            3 => Some(Self::AddrIndPostInc(reg)),
            4 => Some(Self::AddrIndPreDec(reg)),
            5 => Some(Self::AddrIndDisp(reg)),
            6 => Some(Self::AddrIndIndex(reg)),
            7 => match reg {
                0 => Some(Self::AbsShort),
                1 => Some(Self::AbsLong),
                2 => Some(Self::PcDisp),
                3 => Some(Self::PcIndex),
                4 => Some(Self::Immediate),
                _ => None,
            },
            _ => None,
        }
    }

    /// Data EAs: everything except address-register direct.
    #[must_use]
    pub const fn is_data(self) -> bool {
        !matches!(self, Self::AddrReg(_))
    }

    /// Memory EAs: everything except register direct.
    #[must_use]
    pub const fn is_memory(self) -> bool {
        !matches!(self, Self::DataReg(_) | Self::AddrReg(_))
    }

    /// Control EAs: memory without increment/decrement or immediate.
    #[must_use]
    pub const fn is_control(self) -> bool {
        matches!(
            self,
            Self::AddrInd(_)
                | Self::AddrIndDisp(_)
                | Self::AddrIndIndex(_)
                | Self::AbsShort
                | Self::AbsLong
                | Self::PcDisp
                | Self::PcIndex
        )
    }

    /// Alterable EAs: excludes PC-relative and immediate destinations.
    #[must_use]
    pub const fn is_alterable(self) -> bool {
        !matches!(self, Self::PcDisp | Self::PcIndex | Self::Immediate)
    }

    /// Data-alterable: data and alterable.
    #[must_use]
    pub const fn is_data_alterable(self) -> bool {
        self.is_data() && self.is_alterable()
    }

    /// Memory-alterable: memory and alterable.
    #[must_use]
    pub const fn is_memory_alterable(self) -> bool {
        self.is_memory() && self.is_alterable()
    }
}

/// A resolved operand location. Transient: lives for one instruction.
#[derive(Debug, Clone, Copy)]
pub enum EffectiveAddress {
    /// Operand lives in `Dn`.
    DataReg(u8),
    /// Operand lives in `An` (through the active A7 bank).
    AddrReg(u8),
    /// Operand lives in memory at this address.
    Memory(u32),
    /// The operand is this immediate value, already consumed from the
    /// instruction stream.
    Immediate(u32),
}

impl Cpu {
    /// Resolve an addressing mode to an operand location.
    ///
    /// Consumes 0-2 extension words (more for EC020 full-format indexing),
    /// advancing the PC past them; fires increment/decrement side effects.
    pub(crate) fn resolve_ea<B: Bus>(
        &mut self,
        bus: &mut B,
        mode: AddrMode,
        size: Size,
    ) -> Exec<EffectiveAddress> {
        match mode {
            AddrMode::DataReg(r) => Ok(EffectiveAddress::DataReg(r)),
            AddrMode::AddrReg(r) => Ok(EffectiveAddress::AddrReg(r)),
            AddrMode::AddrInd(r) => Ok(EffectiveAddress::Memory(self.regs.a(r as usize))),
            AddrMode::AddrIndPostInc(r) => {
                let addr = self.regs.a(r as usize);
                self.regs
                    .set_a(r as usize, addr.wrapping_add(step_for(r, size)));
                Ok(EffectiveAddress::Memory(addr))
            }
            AddrMode::AddrIndPreDec(r) => {
                let addr = self.regs.a(r as usize).wrapping_sub(step_for(r, size));
                self.regs.set_a(r as usize, addr);
                Ok(EffectiveAddress::Memory(addr))
            }
            AddrMode::AddrIndDisp(r) => {
                let base = self.regs.a(r as usize);
                let disp = self.fetch_word(bus)? as i16;
                Ok(EffectiveAddress::Memory(
                    base.wrapping_add(disp as i32 as u32),
                ))
            }
            AddrMode::AddrIndIndex(r) => {
                let base = self.regs.a(r as usize);
                let addr = self.indexed_address(bus, base)?;
                Ok(EffectiveAddress::Memory(addr))
            }
            AddrMode::AbsShort => {
                let addr = self.fetch_word(bus)? as i16 as i32 as u32;
                Ok(EffectiveAddress::Memory(addr))
            }
            AddrMode::AbsLong => {
                let addr = self.fetch_long(bus)?;
                Ok(EffectiveAddress::Memory(addr))
            }
            AddrMode::PcDisp => {
                // Base is the PC of the extension word, not the instruction end
                let base = self.regs.pc;
                let disp = self.fetch_word(bus)? as i16;
                Ok(EffectiveAddress::Memory(
                    base.wrapping_add(disp as i32 as u32),
                ))
            }
            AddrMode::PcIndex => {
                let base = self.regs.pc;
                let addr = self.indexed_address(bus, base)?;
                Ok(EffectiveAddress::Memory(addr))
            }
            AddrMode::Immediate => {
                let value = match size {
                    Size::Byte => u32::from(self.fetch_word(bus)?) & 0xFF,
                    Size::Word => u32::from(self.fetch_word(bus)?),
                    Size::Long => self.fetch_long(bus)?,
                };
                Ok(EffectiveAddress::Immediate(value))
            }
        }
    }

    /// Compute an indexed address from a base and the extension word(s).
    ///
    /// Brief format (all models):
    ///   `D/A | reg | W/L | scale | 0 | d8`, index sign-extended from 16
    ///   bits unless the W/L bit selects the full register. The 68000
    ///   ignores the scale field; the EC020 applies it.
    ///
    /// Full format (EC020 only, bit 8 set): base suppress, index suppress,
    /// and a null/word/long base displacement. The memory-indirect modes
    /// (I/IS field non-zero) are not implemented and fault as illegal.
    fn indexed_address<B: Bus>(&mut self, bus: &mut B, base: u32) -> Exec<u32> {
        let ext = self.fetch_word(bus)?;

        let index_reg = ((ext >> 12) & 0x0F) as usize;
        let index_long = ext & 0x0800 != 0;
        let raw = if index_reg < 8 {
            self.regs.d[index_reg]
        } else {
            self.regs.a(index_reg - 8)
        };
        let mut index = if index_long {
            raw
        } else {
            Size::Word.sign_extend(raw)
        };
        if self.caps().full_ext_word {
            index <<= (ext >> 9) & 3;
        }

        if ext & 0x0100 == 0 || !self.caps().full_ext_word {
            // Brief format: base + index + sign-extended d8
            let disp = ext as u8 as i8 as i32 as u32;
            return Ok(base.wrapping_add(index).wrapping_add(disp));
        }

        // Full format
        if ext & 0x0007 != 0 {
            // Memory indirect: unsupported, treated as an illegal encoding
            return Err(self.illegal());
        }
        let base = if ext & 0x0080 != 0 { 0 } else { base };
        let index = if ext & 0x0040 != 0 { 0 } else { index };
        let bd = match (ext >> 4) & 3 {
            1 => 0,
            2 => self.fetch_word(bus)? as i16 as i32 as u32,
            3 => self.fetch_long(bus)?,
            _ => return Err(self.illegal()),
        };
        Ok(base.wrapping_add(bd).wrapping_add(index))
    }

    /// Read through a resolved effective address.
    ///
    /// Returns the operand in the low bits, zero-padded; instructions that
    /// need native-width arithmetic sign-extend via [`Size::sign_extend`].
    pub(crate) fn ea_read<B: Bus>(
        &mut self,
        bus: &mut B,
        ea: EffectiveAddress,
        size: Size,
    ) -> Exec<u32> {
        match ea {
            EffectiveAddress::DataReg(r) => Ok(self.regs.d[r as usize] & size.mask()),
            EffectiveAddress::AddrReg(r) => Ok(self.regs.a(r as usize) & size.mask()),
            EffectiveAddress::Memory(addr) => self.read_bus(bus, addr, size),
            EffectiveAddress::Immediate(value) => Ok(value & size.mask()),
        }
    }

    /// Write through a resolved effective address.
    ///
    /// Word writes to an address register sign-extend into the full
    /// register; byte writes to an address register are architecturally
    /// undefined and fault.
    pub(crate) fn ea_write<B: Bus>(
        &mut self,
        bus: &mut B,
        ea: EffectiveAddress,
        value: u32,
        size: Size,
    ) -> Exec<()> {
        match ea {
            EffectiveAddress::DataReg(r) => {
                let reg = &mut self.regs.d[r as usize];
                *reg = size.merge(*reg, value);
                Ok(())
            }
            EffectiveAddress::AddrReg(r) => match size {
                Size::Byte => Err(self.illegal()),
                Size::Word => {
                    self.regs.set_a(r as usize, Size::Word.sign_extend(value));
                    Ok(())
                }
                Size::Long => {
                    self.regs.set_a(r as usize, value);
                    Ok(())
                }
            },
            EffectiveAddress::Memory(addr) => self.write_bus(bus, addr, value, size),
            EffectiveAddress::Immediate(_) => Err(self.guest_fault(vector::ILLEGAL)),
        }
    }
}

/// Increment/decrement amount: operand size, except byte accesses through A7
/// which always move by 2 to keep the stack word-aligned.
pub(crate) const fn step_for(reg: u8, size: Size) -> u32 {
    if reg == 7 && matches!(size, Size::Byte) {
        2
    } else {
        size.bytes()
    }
}
