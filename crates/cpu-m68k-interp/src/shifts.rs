//! Shifts and rotates, register and memory forms.
//!
//! One engine serves all eight mnemonics: the shift is applied one step at
//! a time, tracking the last bit out and (for ASL) whether the sign bit
//! ever changed. Register counts go modulo 64, so up to 63 steps; the
//! memory form is always one word-sized step.
//!
//! Flag rules by kind: AS/LS/ROX update X from the last bit out, RO never
//! touches X. A count of zero clears C (ROX instead copies X into C) and
//! leaves X alone. Only ASL can set V.

use crate::alu::Size;
use crate::bus::Bus;
use crate::cpu::{Cpu, Exec};
use crate::decode::ShiftOp;
use crate::ea::AddrMode;
use crate::flags::{self, Status};

struct ShiftResult {
    value: u32,
    carry: bool,
    x: Option<bool>,
    overflow: bool,
}

/// Apply `count` single-bit steps of the given shift/rotate.
fn run_shift(op: ShiftOp, left: bool, size: Size, count: u32, value: u32, x_in: bool) -> ShiftResult {
    let msb = size.msb();
    let mask = size.mask();
    let mut value = value & mask;
    let mut x = x_in;
    let mut carry = false;
    let mut overflow = false;

    for _ in 0..count {
        let bit_out = if left { value & msb != 0 } else { value & 1 != 0 };
        let msb_before = value & msb != 0;
        value = if left { (value << 1) & mask } else { value >> 1 };
        match op {
            ShiftOp::Arithmetic => {
                if !left && msb_before {
                    value |= msb;
                }
                if left && (value & msb != 0) != msb_before {
                    overflow = true;
                }
                x = bit_out;
            }
            ShiftOp::Logical => {
                x = bit_out;
            }
            ShiftOp::RotateX => {
                if left {
                    if x {
                        value |= 1;
                    }
                } else if x {
                    value |= msb;
                }
                x = bit_out;
            }
            ShiftOp::Rotate => {
                if left {
                    if bit_out {
                        value |= 1;
                    }
                } else if bit_out {
                    value |= msb;
                }
            }
        }
        carry = bit_out;
    }

    let x_out = match op {
        ShiftOp::Rotate => None,
        _ if count == 0 => None,
        _ => Some(x),
    };
    // A zero count leaves C clear, except ROXd which reflects X.
    if count == 0 {
        carry = op == ShiftOp::RotateX && x_in;
    }
    ShiftResult { value, carry, x: x_out, overflow }
}

impl Cpu {
    pub(crate) fn exec_shift_reg(
        &mut self,
        op: ShiftOp,
        left: bool,
        size: Size,
        count_is_reg: bool,
        count: u8,
        dn: u8,
    ) -> Exec<()> {
        let count = if count_is_reg {
            self.regs.d[count as usize] & 63
        } else if count == 0 {
            8
        } else {
            u32::from(count)
        };
        let value = self.regs.d[dn as usize] & size.mask();
        let result = run_shift(op, left, size, count, value, Status::test(self.regs.sr, flags::X));
        let reg = &mut self.regs.d[dn as usize];
        *reg = size.merge(*reg, result.value);
        self.apply_shift_flags(&result, size);
        Ok(())
    }

    /// Memory form: shift one place, word-sized.
    pub(crate) fn exec_shift_mem<B: Bus>(
        &mut self,
        bus: &mut B,
        op: ShiftOp,
        left: bool,
        dst: AddrMode,
    ) -> Exec<()> {
        let dst = self.resolve_ea(bus, dst, Size::Word)?;
        let value = self.ea_read(bus, dst, Size::Word)?;
        let result = run_shift(op, left, Size::Word, 1, value, Status::test(self.regs.sr, flags::X));
        self.ea_write(bus, dst, result.value, Size::Word)?;
        self.apply_shift_flags(&result, Size::Word);
        Ok(())
    }

    fn apply_shift_flags(&mut self, result: &ShiftResult, size: Size) {
        let mut sr = Status::nz(self.regs.sr, result.value, size);
        sr = Status::set_if(sr, flags::C, result.carry);
        sr = Status::set_if(sr, flags::V, result.overflow);
        if let Some(x) = result.x {
            sr = Status::set_if(sr, flags::X, x);
        }
        self.regs.sr = sr;
    }
}
