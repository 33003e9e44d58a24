//! Opcode classification and the precomputed dispatch table.
//!
//! The 68k opcode space routes on the top 4 bits into 11 families and then
//! on progressively smaller bit fields. Rather than re-deriving those masks
//! on every step, `DecodeTable` classifies all 65536 opcode words once at
//! CPU construction into [`Op`] values, a closed sum type over the
//! instruction set, so dispatch is one table index and one `match`.
//!
//! Addressing-mode legality is part of classification: an encoding whose EA
//! field names a mode the instruction forbids (address register destination
//! for a byte op, immediate as a store target, PC-relative as anything
//! alterable...) decodes to `Op::Illegal` and traps through vector 4 without
//! ever touching a register.
//!
//! The table depends on the CPU model: EC020-only encodings (`EXTB.L`, long
//! multiply/divide, `MOVE from CCR`) classify as `Op::Illegal` on the 68000.

use crate::alu::Size;
use crate::ea::AddrMode;
use crate::model::CpuCapabilities;

/// Immediate-operand ALU group (`ORI`/`ANDI`/`SUBI`/`ADDI`/`EORI`/`CMPI`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ImmOp {
    Ori,
    Andi,
    Subi,
    Addi,
    Eori,
    Cmpi,
}

/// Bit-manipulation group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BitOp {
    Btst,
    Bchg,
    Bclr,
    Bset,
}

/// Shift/rotate kind (the 2-bit type field of group 0xE).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ShiftOp {
    /// ASL/ASR.
    Arithmetic,
    /// LSL/LSR.
    Logical,
    /// ROXL/ROXR.
    RotateX,
    /// ROL/ROR.
    Rotate,
}

/// Register-exchange pairing for `EXG`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ExgPair {
    DataData,
    AddrAddr,
    DataAddr,
}

/// One classified opcode word.
///
/// Fields are pre-extracted so execution never re-derives bit positions.
/// Extension words (immediates, displacements, bit numbers, register masks)
/// are *not* part of classification; they are consumed from the instruction
/// stream at execution time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Op {
    /// Unrecognized or illegally-addressed encoding (vector 4).
    Illegal,
    /// 0xAxxx reserved opcode space (vector 10).
    LineA,
    /// 0xFxxx reserved opcode space (vector 11).
    LineF,

    // --- group 0x0: immediates, bit ops, MOVEP ---
    Imm { op: ImmOp, size: Size, dst: AddrMode },
    ImmToCcr { op: ImmOp },
    ImmToSr { op: ImmOp },
    BitStatic { op: BitOp, dst: AddrMode },
    BitDynamic { op: BitOp, dn: u8, dst: AddrMode },
    Movep { dn: u8, an: u8, to_mem: bool, long: bool },

    // --- groups 0x1-0x3: moves ---
    Move { size: Size, src: AddrMode, dst: AddrMode },
    Movea { size: Size, src: AddrMode, an: u8 },

    // --- group 0x4: miscellaneous ---
    MoveFromSr { dst: AddrMode },
    MoveFromCcr { dst: AddrMode },
    MoveToCcr { src: AddrMode },
    MoveToSr { src: AddrMode },
    Negx { size: Size, dst: AddrMode },
    Clr { size: Size, dst: AddrMode },
    Neg { size: Size, dst: AddrMode },
    Not { size: Size, dst: AddrMode },
    Ext { dn: u8, long: bool },
    ExtbL { dn: u8 },
    Nbcd { dst: AddrMode },
    Swap { dn: u8 },
    Pea { src: AddrMode },
    IllegalInstr,
    Tas { dst: AddrMode },
    Tst { size: Size, src: AddrMode },
    MulLong { dn: u8, src: AddrMode },
    DivLong { dn: u8, src: AddrMode },
    Trap { vec: u8 },
    Link { an: u8 },
    Unlk { an: u8 },
    MoveToUsp { an: u8 },
    MoveFromUsp { an: u8 },
    Reset,
    Nop,
    Stop,
    Rte,
    Rts,
    Trapv,
    Rtr,
    Jsr { target: AddrMode },
    Jmp { target: AddrMode },
    Movem { to_mem: bool, long: bool, ea: AddrMode },
    Lea { an: u8, src: AddrMode },
    Chk { dn: u8, src: AddrMode },

    // --- group 0x5 ---
    Addq { data: u8, size: Size, dst: AddrMode },
    Subq { data: u8, size: Size, dst: AddrMode },
    Scc { cond: u8, dst: AddrMode },
    Dbcc { cond: u8, dn: u8 },

    // --- group 0x6 ---
    Bcc { cond: u8, disp: i8 },

    // --- group 0x7 ---
    Moveq { dn: u8, data: i8 },

    // --- groups 0x8, 0xC: logic, mul/div, BCD, EXG ---
    Or { size: Size, dn: u8, to_ea: bool, ea: AddrMode },
    And { size: Size, dn: u8, to_ea: bool, ea: AddrMode },
    Divu { dn: u8, src: AddrMode },
    Divs { dn: u8, src: AddrMode },
    Mulu { dn: u8, src: AddrMode },
    Muls { dn: u8, src: AddrMode },
    Sbcd { rx: u8, ry: u8, mem: bool },
    Abcd { rx: u8, ry: u8, mem: bool },
    Exg { pair: ExgPair, rx: u8, ry: u8 },

    // --- groups 0x9, 0xD: add/sub ---
    Add { size: Size, dn: u8, to_ea: bool, ea: AddrMode },
    Sub { size: Size, dn: u8, to_ea: bool, ea: AddrMode },
    Adda { size: Size, an: u8, ea: AddrMode },
    Suba { size: Size, an: u8, ea: AddrMode },
    Addx { size: Size, rx: u8, ry: u8, mem: bool },
    Subx { size: Size, rx: u8, ry: u8, mem: bool },

    // --- group 0xB: compare, EOR ---
    Cmp { size: Size, dn: u8, ea: AddrMode },
    Cmpa { size: Size, an: u8, ea: AddrMode },
    Cmpm { size: Size, ax: u8, ay: u8 },
    Eor { size: Size, dn: u8, ea: AddrMode },

    // --- group 0xE: shifts/rotates ---
    ShiftReg { op: ShiftOp, left: bool, size: Size, count_is_reg: bool, count: u8, dn: u8 },
    ShiftMem { op: ShiftOp, left: bool, dst: AddrMode },
}

/// The 65536-entry dispatch table.
pub(crate) struct DecodeTable {
    entries: Vec<Op>,
}

impl DecodeTable {
    /// Classify every opcode word for the given capability set.
    pub(crate) fn new(caps: CpuCapabilities) -> Self {
        let entries = (0..=u16::MAX).map(|w| classify(w, caps)).collect();
        Self { entries }
    }

    /// Look up a fetched opcode word.
    #[inline]
    pub(crate) fn lookup(&self, opcode: u16) -> Op {
        self.entries[opcode as usize]
    }
}

/// Decode the 6-bit mode/register EA field from the opcode's low bits.
fn ea_field(opcode: u16) -> Option<AddrMode> {
    AddrMode::decode(((opcode >> 3) & 7) as u8, (opcode & 7) as u8)
}

/// Classify one opcode word. Pure; called 65536 times at table build.
fn classify(opcode: u16, caps: CpuCapabilities) -> Op {
    match opcode >> 12 {
        0x0 => classify_group0(opcode),
        0x1 | 0x2 | 0x3 => classify_move(opcode),
        0x4 => classify_group4(opcode, caps),
        0x5 => classify_group5(opcode),
        0x6 => classify_branch(opcode),
        0x7 => {
            if opcode & 0x0100 == 0 {
                Op::Moveq {
                    dn: ((opcode >> 9) & 7) as u8,
                    data: opcode as u8 as i8,
                }
            } else {
                Op::Illegal
            }
        }
        0x8 => classify_or_div(opcode),
        0x9 => classify_add_sub(opcode, false),
        0xA => Op::LineA,
        0xB => classify_cmp_eor(opcode),
        0xC => classify_and_mul(opcode),
        0xD => classify_add_sub(opcode, true),
        0xE => classify_shift(opcode),
        0xF => Op::LineF,
        _ => unreachable!(),
    }
}

/// Group 0x0: ORI/ANDI/SUBI/ADDI/EORI/CMPI, static/dynamic bit ops, MOVEP.
fn classify_group0(opcode: u16) -> Op {
    let reg9 = ((opcode >> 9) & 7) as u8;
    let mode = ((opcode >> 3) & 7) as u8;

    if opcode & 0x0100 != 0 {
        // Dynamic bit op or MOVEP
        if mode == 1 {
            let opmode = (opcode >> 6) & 3;
            return Op::Movep {
                dn: reg9,
                an: (opcode & 7) as u8,
                to_mem: opmode & 2 != 0,
                long: opmode & 1 != 0,
            };
        }
        let Some(dst) = ea_field(opcode) else {
            return Op::Illegal;
        };
        let op = match (opcode >> 6) & 3 {
            0 => BitOp::Btst,
            1 => BitOp::Bchg,
            2 => BitOp::Bclr,
            _ => BitOp::Bset,
        };
        return classify_bit(op, reg9, false, dst);
    }

    if reg9 == 4 {
        // Static bit op: bit number in the following extension word
        let Some(dst) = ea_field(opcode) else {
            return Op::Illegal;
        };
        let op = match (opcode >> 6) & 3 {
            0 => BitOp::Btst,
            1 => BitOp::Bchg,
            2 => BitOp::Bclr,
            _ => BitOp::Bset,
        };
        return classify_bit(op, 0, true, dst);
    }

    let op = match reg9 {
        0 => ImmOp::Ori,
        1 => ImmOp::Andi,
        2 => ImmOp::Subi,
        3 => ImmOp::Addi,
        5 => ImmOp::Eori,
        6 => ImmOp::Cmpi,
        _ => return Op::Illegal,
    };

    // ORI/ANDI/EORI to CCR (byte) or SR (word): EA field is #imm
    if opcode & 0x00FF == 0x003C && matches!(op, ImmOp::Ori | ImmOp::Andi | ImmOp::Eori) {
        return Op::ImmToCcr { op };
    }
    if opcode & 0x00FF == 0x007C && matches!(op, ImmOp::Ori | ImmOp::Andi | ImmOp::Eori) {
        return Op::ImmToSr { op };
    }

    let Some(size) = Size::from_bits(((opcode >> 6) & 3) as u8) else {
        return Op::Illegal;
    };
    let Some(dst) = ea_field(opcode) else {
        return Op::Illegal;
    };
    if !dst.is_data_alterable() {
        return Op::Illegal;
    }
    Op::Imm { op, size, dst }
}

fn classify_bit(op: BitOp, dn: u8, is_static: bool, dst: AddrMode) -> Op {
    // BTST reads only and accepts any data EA except immediate;
    // the modifying forms need a data-alterable destination.
    let legal = if op == BitOp::Btst {
        dst.is_data() && dst != AddrMode::Immediate
    } else {
        dst.is_data_alterable()
    };
    if !legal {
        return Op::Illegal;
    }
    if is_static {
        Op::BitStatic { op, dst }
    } else {
        Op::BitDynamic { op, dn, dst }
    }
}

/// Groups 0x1-0x3: MOVE and MOVEA.
fn classify_move(opcode: u16) -> Op {
    let size = match opcode >> 12 {
        1 => Size::Byte,
        2 => Size::Long,
        3 => Size::Word,
        _ => unreachable!(),
    };
    let Some(src) = ea_field(opcode) else {
        return Op::Illegal;
    };
    if size == Size::Byte && matches!(src, AddrMode::AddrReg(_)) {
        return Op::Illegal;
    }

    let dst_mode = ((opcode >> 6) & 7) as u8;
    let dst_reg = ((opcode >> 9) & 7) as u8;
    if dst_mode == 1 {
        // MOVEA: word/long only, no flags
        if size == Size::Byte {
            return Op::Illegal;
        }
        return Op::Movea { size, src, an: dst_reg };
    }
    let Some(dst) = AddrMode::decode(dst_mode, dst_reg) else {
        return Op::Illegal;
    };
    if !dst.is_data_alterable() {
        return Op::Illegal;
    }
    Op::Move { size, src, dst }
}

/// Group 0x4: the miscellaneous zoo.
fn classify_group4(opcode: u16, caps: CpuCapabilities) -> Op {
    let reg9 = ((opcode >> 9) & 7) as u8;
    let opmode = ((opcode >> 6) & 7) as u8;
    let mode = ((opcode >> 3) & 7) as u8;
    let reg = (opcode & 7) as u8;

    // LEA and CHK sit across the whole group on opmodes 7 and 6
    if opmode == 7 {
        // EXTB.L shares LEA's opmode with a data-register "EA"
        if reg9 == 4 && mode == 0 {
            return if caps.extb { Op::ExtbL { dn: reg } } else { Op::Illegal };
        }
        let Some(src) = ea_field(opcode) else {
            return Op::Illegal;
        };
        if !src.is_control() {
            return Op::Illegal;
        }
        return Op::Lea { an: reg9, src };
    }
    if opmode == 6 {
        // CHK.W (the EC020's CHK.L form is not implemented)
        let Some(src) = ea_field(opcode) else {
            return Op::Illegal;
        };
        if !src.is_data() {
            return Op::Illegal;
        }
        return Op::Chk { dn: reg9, src };
    }
    if opcode & 0x0100 != 0 {
        return Op::Illegal;
    }

    match reg9 {
        0 => {
            // NEGX / MOVE from SR
            if opmode == 3 {
                let Some(dst) = ea_field(opcode) else {
                    return Op::Illegal;
                };
                if !dst.is_data_alterable() {
                    return Op::Illegal;
                }
                return Op::MoveFromSr { dst };
            }
            unary_alterable(opcode, |size, dst| Op::Negx { size, dst })
        }
        1 => {
            // CLR / MOVE from CCR (68010+)
            if opmode == 3 {
                if !caps.move_from_ccr {
                    return Op::Illegal;
                }
                let Some(dst) = ea_field(opcode) else {
                    return Op::Illegal;
                };
                if !dst.is_data_alterable() {
                    return Op::Illegal;
                }
                return Op::MoveFromCcr { dst };
            }
            unary_alterable(opcode, |size, dst| Op::Clr { size, dst })
        }
        2 => {
            // NEG / MOVE to CCR
            if opmode == 3 {
                let Some(src) = ea_field(opcode) else {
                    return Op::Illegal;
                };
                if !src.is_data() {
                    return Op::Illegal;
                }
                return Op::MoveToCcr { src };
            }
            unary_alterable(opcode, |size, dst| Op::Neg { size, dst })
        }
        3 => {
            // NOT / MOVE to SR
            if opmode == 3 {
                let Some(src) = ea_field(opcode) else {
                    return Op::Illegal;
                };
                if !src.is_data() {
                    return Op::Illegal;
                }
                return Op::MoveToSr { src };
            }
            unary_alterable(opcode, |size, dst| Op::Not { size, dst })
        }
        4 => match opmode {
            0 => {
                // NBCD
                let Some(dst) = ea_field(opcode) else {
                    return Op::Illegal;
                };
                if !dst.is_data_alterable() {
                    return Op::Illegal;
                }
                Op::Nbcd { dst }
            }
            1 => {
                if mode == 0 {
                    Op::Swap { dn: reg }
                } else {
                    let Some(src) = ea_field(opcode) else {
                        return Op::Illegal;
                    };
                    if !src.is_control() {
                        return Op::Illegal;
                    }
                    Op::Pea { src }
                }
            }
            2 | 3 => {
                if mode == 0 {
                    return Op::Ext { dn: reg, long: opmode == 3 };
                }
                // MOVEM registers → memory: control-alterable or -(An)
                let Some(ea) = ea_field(opcode) else {
                    return Op::Illegal;
                };
                let legal = matches!(ea, AddrMode::AddrIndPreDec(_))
                    || (ea.is_control() && ea.is_alterable());
                if !legal {
                    return Op::Illegal;
                }
                Op::Movem { to_mem: true, long: opmode == 3, ea }
            }
            _ => Op::Illegal,
        },
        5 => match opmode {
            0 | 1 | 2 => {
                // TST: the 68000 needs a data-alterable EA; the EC020
                // additionally accepts An, PC-relative and immediate.
                let Some(size) = Size::from_bits(opmode) else {
                    return Op::Illegal;
                };
                let Some(src) = ea_field(opcode) else {
                    return Op::Illegal;
                };
                let legal = if caps.full_ext_word {
                    !(size == Size::Byte && matches!(src, AddrMode::AddrReg(_)))
                } else {
                    src.is_data_alterable()
                };
                if !legal {
                    return Op::Illegal;
                }
                Op::Tst { size, src }
            }
            3 => {
                if opcode == 0x4AFC {
                    return Op::IllegalInstr;
                }
                let Some(dst) = ea_field(opcode) else {
                    return Op::Illegal;
                };
                if !dst.is_data_alterable() {
                    return Op::Illegal;
                }
                Op::Tas { dst }
            }
            _ => Op::Illegal,
        },
        6 => {
            // 0x4C00/0x4C40: long multiply/divide (EC020);
            // 0x4C80/0x4CC0: MOVEM memory → registers
            match opmode {
                0 | 1 => {
                    if !caps.long_muldiv {
                        return Op::Illegal;
                    }
                    let Some(src) = ea_field(opcode) else {
                        return Op::Illegal;
                    };
                    if !src.is_data() {
                        return Op::Illegal;
                    }
                    // Register fields live in the required extension word
                    if opmode == 0 {
                        Op::MulLong { dn: 0, src }
                    } else {
                        Op::DivLong { dn: 0, src }
                    }
                }
                2 | 3 => {
                    let Some(ea) = ea_field(opcode) else {
                        return Op::Illegal;
                    };
                    let legal = matches!(ea, AddrMode::AddrIndPostInc(_)) || ea.is_control();
                    if !legal {
                        return Op::Illegal;
                    }
                    Op::Movem { to_mem: false, long: opmode == 3, ea }
                }
                _ => Op::Illegal,
            }
        }
        7 => match opmode {
            1 => match mode {
                0 | 1 => Op::Trap { vec: (opcode & 0x0F) as u8 },
                2 => Op::Link { an: reg },
                3 => Op::Unlk { an: reg },
                4 => Op::MoveToUsp { an: reg },
                5 => Op::MoveFromUsp { an: reg },
                6 => match reg {
                    0 => Op::Reset,
                    1 => Op::Nop,
                    2 => Op::Stop,
                    3 => Op::Rte,
                    5 => Op::Rts,
                    6 => Op::Trapv,
                    7 => Op::Rtr,
                    _ => Op::Illegal,
                },
                _ => Op::Illegal,
            },
            2 | 3 => {
                let Some(target) = ea_field(opcode) else {
                    return Op::Illegal;
                };
                if !target.is_control() {
                    return Op::Illegal;
                }
                if opmode == 2 {
                    Op::Jsr { target }
                } else {
                    Op::Jmp { target }
                }
            }
            _ => Op::Illegal,
        },
        _ => Op::Illegal,
    }
}

/// NEGX/CLR/NEG/NOT share a size field and a data-alterable destination.
fn unary_alterable(opcode: u16, build: impl Fn(Size, AddrMode) -> Op) -> Op {
    let Some(size) = Size::from_bits(((opcode >> 6) & 3) as u8) else {
        return Op::Illegal;
    };
    let Some(dst) = ea_field(opcode) else {
        return Op::Illegal;
    };
    if !dst.is_data_alterable() {
        return Op::Illegal;
    }
    build(size, dst)
}

/// Group 0x5: ADDQ/SUBQ/Scc/DBcc.
fn classify_group5(opcode: u16) -> Op {
    let size_bits = ((opcode >> 6) & 3) as u8;
    if size_bits == 3 {
        let cond = ((opcode >> 8) & 0x0F) as u8;
        if (opcode >> 3) & 7 == 1 {
            return Op::Dbcc { cond, dn: (opcode & 7) as u8 };
        }
        let Some(dst) = ea_field(opcode) else {
            return Op::Illegal;
        };
        if !dst.is_data_alterable() {
            return Op::Illegal;
        }
        return Op::Scc { cond, dst };
    }

    let Some(size) = Size::from_bits(size_bits) else {
        return Op::Illegal;
    };
    let Some(dst) = ea_field(opcode) else {
        return Op::Illegal;
    };
    // Alterable including An (word/long); quick byte math on An is illegal
    let legal = if matches!(dst, AddrMode::AddrReg(_)) {
        size != Size::Byte
    } else {
        dst.is_data_alterable()
    };
    if !legal {
        return Op::Illegal;
    }
    let data = match (opcode >> 9) & 7 {
        0 => 8,
        n => n as u8,
    };
    if opcode & 0x0100 == 0 {
        Op::Addq { data, size, dst }
    } else {
        Op::Subq { data, size, dst }
    }
}

/// Group 0x6: Bcc/BRA/BSR.
fn classify_branch(opcode: u16) -> Op {
    // 0xFF selects a 32-bit displacement on the EC020; the 68000 takes it
    // as a plain -1 byte displacement (the execution side tells them apart).
    let disp = opcode as u8 as i8;
    Op::Bcc { cond: ((opcode >> 8) & 0x0F) as u8, disp }
}

/// Group 0x8: OR, DIVU/DIVS, SBCD.
fn classify_or_div(opcode: u16) -> Op {
    let dn = ((opcode >> 9) & 7) as u8;
    let opmode = ((opcode >> 6) & 7) as u8;
    let mode = ((opcode >> 3) & 7) as u8;
    let reg = (opcode & 7) as u8;

    match opmode {
        3 | 7 => {
            let Some(src) = ea_field(opcode) else {
                return Op::Illegal;
            };
            if !src.is_data() {
                return Op::Illegal;
            }
            if opmode == 3 {
                Op::Divu { dn, src }
            } else {
                Op::Divs { dn, src }
            }
        }
        4 if mode <= 1 => Op::Sbcd { rx: dn, ry: reg, mem: mode == 1 },
        _ => classify_logic_common(opcode, |size, dn, to_ea, ea| Op::Or { size, dn, to_ea, ea }),
    }
}

/// Group 0xC: AND, MULU/MULS, ABCD, EXG.
fn classify_and_mul(opcode: u16) -> Op {
    let dn = ((opcode >> 9) & 7) as u8;
    let opmode = ((opcode >> 6) & 7) as u8;
    let mode = ((opcode >> 3) & 7) as u8;
    let reg = (opcode & 7) as u8;

    match opmode {
        3 | 7 => {
            let Some(src) = ea_field(opcode) else {
                return Op::Illegal;
            };
            if !src.is_data() {
                return Op::Illegal;
            }
            if opmode == 3 {
                Op::Mulu { dn, src }
            } else {
                Op::Muls { dn, src }
            }
        }
        4 if mode <= 1 => Op::Abcd { rx: dn, ry: reg, mem: mode == 1 },
        5 if mode <= 1 => {
            if mode == 0 {
                Op::Exg { pair: ExgPair::DataData, rx: dn, ry: reg }
            } else {
                Op::Exg { pair: ExgPair::AddrAddr, rx: dn, ry: reg }
            }
        }
        6 if mode == 1 => Op::Exg { pair: ExgPair::DataAddr, rx: dn, ry: reg },
        _ => classify_logic_common(opcode, |size, dn, to_ea, ea| Op::And { size, dn, to_ea, ea }),
    }
}

/// Shared AND/OR shape: opmodes 0-2 are `<ea> op Dn → Dn`, 4-6 are
/// `Dn op <ea> → <ea>`.
fn classify_logic_common(opcode: u16, build: impl Fn(Size, u8, bool, AddrMode) -> Op) -> Op {
    let dn = ((opcode >> 9) & 7) as u8;
    let opmode = ((opcode >> 6) & 7) as u8;
    let Some(ea) = ea_field(opcode) else {
        return Op::Illegal;
    };
    let Some(size) = Size::from_bits(opmode & 3) else {
        return Op::Illegal;
    };
    if opmode < 4 {
        if !ea.is_data() {
            return Op::Illegal;
        }
        build(size, dn, false, ea)
    } else {
        if !ea.is_memory_alterable() {
            return Op::Illegal;
        }
        build(size, dn, true, ea)
    }
}

/// Groups 0x9 (SUB) and 0xD (ADD), including the A and X forms.
fn classify_add_sub(opcode: u16, is_add: bool) -> Op {
    let rn = ((opcode >> 9) & 7) as u8;
    let opmode = ((opcode >> 6) & 7) as u8;
    let mode = ((opcode >> 3) & 7) as u8;
    let reg = (opcode & 7) as u8;

    match opmode {
        3 | 7 => {
            let size = if opmode == 3 { Size::Word } else { Size::Long };
            let Some(ea) = ea_field(opcode) else {
                return Op::Illegal;
            };
            if is_add {
                Op::Adda { size, an: rn, ea }
            } else {
                Op::Suba { size, an: rn, ea }
            }
        }
        0 | 1 | 2 => {
            let Some(size) = Size::from_bits(opmode) else {
                return Op::Illegal;
            };
            let Some(ea) = ea_field(opcode) else {
                return Op::Illegal;
            };
            if size == Size::Byte && matches!(ea, AddrMode::AddrReg(_)) {
                return Op::Illegal;
            }
            if is_add {
                Op::Add { size, dn: rn, to_ea: false, ea }
            } else {
                Op::Sub { size, dn: rn, to_ea: false, ea }
            }
        }
        4 | 5 | 6 => {
            let Some(size) = Size::from_bits(opmode & 3) else {
                return Op::Illegal;
            };
            if mode <= 1 {
                // ADDX/SUBX carved out of the Dn→EA direction
                let mem = mode == 1;
                return if is_add {
                    Op::Addx { size, rx: rn, ry: reg, mem }
                } else {
                    Op::Subx { size, rx: rn, ry: reg, mem }
                };
            }
            let Some(ea) = ea_field(opcode) else {
                return Op::Illegal;
            };
            if !ea.is_memory_alterable() {
                return Op::Illegal;
            }
            if is_add {
                Op::Add { size, dn: rn, to_ea: true, ea }
            } else {
                Op::Sub { size, dn: rn, to_ea: true, ea }
            }
        }
        _ => Op::Illegal,
    }
}

/// Group 0xB: CMP/CMPA/CMPM/EOR.
fn classify_cmp_eor(opcode: u16) -> Op {
    let rn = ((opcode >> 9) & 7) as u8;
    let opmode = ((opcode >> 6) & 7) as u8;
    let mode = ((opcode >> 3) & 7) as u8;
    let reg = (opcode & 7) as u8;

    match opmode {
        3 | 7 => {
            let size = if opmode == 3 { Size::Word } else { Size::Long };
            let Some(ea) = ea_field(opcode) else {
                return Op::Illegal;
            };
            Op::Cmpa { size, an: rn, ea }
        }
        0 | 1 | 2 => {
            let Some(size) = Size::from_bits(opmode) else {
                return Op::Illegal;
            };
            let Some(ea) = ea_field(opcode) else {
                return Op::Illegal;
            };
            if size == Size::Byte && matches!(ea, AddrMode::AddrReg(_)) {
                return Op::Illegal;
            }
            Op::Cmp { size, dn: rn, ea }
        }
        4 | 5 | 6 => {
            let Some(size) = Size::from_bits(opmode & 3) else {
                return Op::Illegal;
            };
            if mode == 1 {
                return Op::Cmpm { size, ax: rn, ay: reg };
            }
            let Some(ea) = ea_field(opcode) else {
                return Op::Illegal;
            };
            if !ea.is_data_alterable() {
                return Op::Illegal;
            }
            Op::Eor { size, dn: rn, ea }
        }
        _ => Op::Illegal,
    }
}

/// Group 0xE: shift/rotate register and memory forms.
fn classify_shift(opcode: u16) -> Op {
    let size_bits = ((opcode >> 6) & 3) as u8;
    let left = opcode & 0x0100 != 0;

    if size_bits == 3 {
        // Memory form: shift by one, word-sized, bits 10-9 select the kind
        if opcode & 0x0800 != 0 {
            return Op::Illegal;
        }
        let op = match (opcode >> 9) & 3 {
            0 => ShiftOp::Arithmetic,
            1 => ShiftOp::Logical,
            2 => ShiftOp::RotateX,
            _ => ShiftOp::Rotate,
        };
        let Some(dst) = ea_field(opcode) else {
            return Op::Illegal;
        };
        if !dst.is_memory_alterable() {
            return Op::Illegal;
        }
        return Op::ShiftMem { op, left, dst };
    }

    let Some(size) = Size::from_bits(size_bits) else {
        return Op::Illegal;
    };
    let op = match (opcode >> 3) & 3 {
        0 => ShiftOp::Arithmetic,
        1 => ShiftOp::Logical,
        2 => ShiftOp::RotateX,
        _ => ShiftOp::Rotate,
    };
    Op::ShiftReg {
        op,
        left,
        size,
        count_is_reg: opcode & 0x0020 != 0,
        count: ((opcode >> 9) & 7) as u8,
        dn: (opcode & 7) as u8,
    }
}

#[cfg(test)]
mod tests {
    use super::{DecodeTable, ImmOp, Op, ShiftOp};
    use crate::alu::Size;
    use crate::ea::AddrMode;
    use crate::model::CpuModel;

    fn table() -> DecodeTable {
        DecodeTable::new(CpuModel::M68000.capabilities())
    }

    #[test]
    fn classifies_reference_encodings() {
        let t = table();
        // MOVEQ #-5,D0
        assert_eq!(t.lookup(0x70FB), Op::Moveq { dn: 0, data: -5 });
        // NOP
        assert_eq!(t.lookup(0x4E71), Op::Nop);
        // MOVE.W (A0),D0
        assert_eq!(
            t.lookup(0x3010),
            Op::Move {
                size: Size::Word,
                src: AddrMode::AddrInd(0),
                dst: AddrMode::DataReg(0)
            }
        );
        // DIVU #imm,D0
        assert_eq!(
            t.lookup(0x80FC),
            Op::Divu { dn: 0, src: AddrMode::Immediate }
        );
        // ABCD D1,D0 / SBCD -(A1),-(A0)
        assert_eq!(t.lookup(0xC101), Op::Abcd { rx: 0, ry: 1, mem: false });
        assert_eq!(t.lookup(0x8109), Op::Sbcd { rx: 0, ry: 1, mem: true });
        // ASL.W #3,D2
        assert_eq!(
            t.lookup(0xE742),
            Op::ShiftReg {
                op: ShiftOp::Arithmetic,
                left: true,
                size: Size::Word,
                count_is_reg: false,
                count: 3,
                dn: 2
            }
        );
    }

    #[test]
    fn addressing_mode_legality_is_baked_in() {
        let t = table();
        // MOVE.B A0,D0: byte reads of address registers are illegal
        assert_eq!(t.lookup(0x1008), Op::Illegal);
        // CLR.W A0: address register is not data-alterable
        assert_eq!(t.lookup(0x4248), Op::Illegal);
        // MOVE.W D0,d16(PC): PC-relative destination
        assert_eq!(t.lookup(0x35C0), Op::Illegal);
        // ADDI.B #n,A0
        assert_eq!(t.lookup(0x0608), Op::Illegal);
        // JMP D0: register direct is not a control EA
        assert_eq!(t.lookup(0x4EC0), Op::Illegal);
        // Mode 7 reg 5-7 are reserved
        assert_eq!(t.lookup(0x303D), Op::Illegal);
    }

    #[test]
    fn reserved_lines_route_to_emulator_traps() {
        let t = table();
        assert_eq!(t.lookup(0xA000), Op::LineA);
        assert_eq!(t.lookup(0xFFFF), Op::LineF);
        assert_eq!(t.lookup(0x4AFC), Op::IllegalInstr);
    }

    #[test]
    fn ec020_only_encodings_gate_on_model() {
        let base = table();
        let ec020 = DecodeTable::new(CpuModel::M68EC020.capabilities());
        // EXTB.L D3
        assert_eq!(base.lookup(0x49C3), Op::Illegal);
        assert_eq!(ec020.lookup(0x49C3), Op::ExtbL { dn: 3 });
        // MULU.L (A0),D1 family opword
        assert_eq!(base.lookup(0x4C10), Op::Illegal);
        assert!(matches!(ec020.lookup(0x4C10), Op::MulLong { .. }));
        // TST.W A0 is EC020-only
        assert_eq!(base.lookup(0x4A48), Op::Illegal);
        assert!(matches!(ec020.lookup(0x4A48), Op::Tst { .. }));
    }

    #[test]
    fn immediate_group_decodes_with_size() {
        let t = table();
        assert_eq!(
            t.lookup(0x0640),
            Op::Imm {
                op: ImmOp::Addi,
                size: Size::Word,
                dst: AddrMode::DataReg(0)
            }
        );
        assert_eq!(t.lookup(0x003C), Op::ImmToCcr { op: ImmOp::Ori });
        assert_eq!(t.lookup(0x027C), Op::ImmToSr { op: ImmOp::Andi });
    }
}
