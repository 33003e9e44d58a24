//! Status register layout and condition-code helpers.
//!
//! The status register is 16 bits:
//! - Bits 0-4: Condition code register (CCR)
//!   - C (bit 0): Carry
//!   - V (bit 1): Overflow
//!   - Z (bit 2): Zero
//!   - N (bit 3): Negative
//!   - X (bit 4): Extend (copy of C for multi-precision arithmetic)
//! - Bits 8-10: Interrupt mask (I0, I1, I2)
//! - Bit 13: Supervisor mode (S)
//! - Bit 15: Trace mode (T)
//!
//! All remaining bits read as zero and are masked off on every SR write.

use crate::alu::Size;

/// Carry flag.
pub const C: u16 = 0x0001;
/// Overflow flag.
pub const V: u16 = 0x0002;
/// Zero flag.
pub const Z: u16 = 0x0004;
/// Negative flag.
pub const N: u16 = 0x0008;
/// Extend flag.
pub const X: u16 = 0x0010;

/// Supervisor mode flag.
pub const S: u16 = 0x2000;
/// Trace mode flag.
pub const T: u16 = 0x8000;

/// Mask for condition codes only (bits 0-4).
pub const CCR_MASK: u16 = 0x001F;
/// Mask for valid SR bits (excluding reserved bits).
pub const SR_MASK: u16 = 0xA71F;

/// Status register helper functions.
///
/// These are pure: they take the current SR and return the updated one, so
/// call sites read as `sr = Status::nz(sr, result, size)`.
pub struct Status;

impl Status {
    /// Set or clear a flag from a condition.
    #[must_use]
    pub fn set_if(sr: u16, flag: u16, condition: bool) -> u16 {
        if condition { sr | flag } else { sr & !flag }
    }

    /// Test a flag.
    #[must_use]
    pub fn test(sr: u16, flag: u16) -> bool {
        sr & flag != 0
    }

    /// Update N and Z from a result truncated to `size`.
    #[must_use]
    pub fn nz(sr: u16, value: u32, size: Size) -> u16 {
        let value = value & size.mask();
        let sr = Self::set_if(sr, Z, value == 0);
        Self::set_if(sr, N, value & size.msb() != 0)
    }

    /// Update N, Z and clear V, C (MOVE, AND, OR, EOR, NOT, TST...).
    #[must_use]
    pub fn nz_clear_vc(sr: u16, value: u32, size: Size) -> u16 {
        Self::nz(sr, value, size) & !(V | C)
    }

    /// Set C (and optionally X) from a carry out of the `size`-wide result.
    ///
    /// `result` is the untruncated native-width sum/difference; any bits
    /// above the operand size indicate a carry/borrow.
    #[must_use]
    pub fn carry(sr: u16, result: u64, size: Size, with_x: bool) -> u16 {
        let c = result > u64::from(size.mask());
        let sr = Self::set_if(sr, C, c);
        if with_x { Self::set_if(sr, X, c) } else { sr }
    }

    /// Set V from a signed overflow check on a `size`-wide addition:
    /// both operands share a sign the result does not.
    #[must_use]
    pub fn overflow_add(sr: u16, src: u32, dst: u32, result: u32, size: Size) -> u16 {
        let msb = size.msb();
        let v = (src ^ result) & (dst ^ result) & msb != 0;
        Self::set_if(sr, V, v)
    }

    /// Set V from a signed overflow check on a `size`-wide subtraction
    /// (`dst - src`): operands differ in sign and the result has the
    /// source's sign.
    #[must_use]
    pub fn overflow_sub(sr: u16, src: u32, dst: u32, result: u32, size: Size) -> u16 {
        let msb = size.msb();
        let v = (src ^ dst) & (dst ^ result) & msb != 0;
        Self::set_if(sr, V, v)
    }

    /// Evaluate a conditional-test field (0-15) against the current flags.
    #[must_use]
    pub fn condition(sr: u16, cc: u8) -> bool {
        let n = sr & N != 0;
        let z = sr & Z != 0;
        let v = sr & V != 0;
        let c = sr & C != 0;
        match cc & 0x0F {
            0x0 => true,       // T
            0x1 => false,      // F
            0x2 => !c && !z,   // HI
            0x3 => c || z,     // LS
            0x4 => !c,         // CC/HS
            0x5 => c,          // CS/LO
            0x6 => !z,         // NE
            0x7 => z,          // EQ
            0x8 => !v,         // VC
            0x9 => v,          // VS
            0xA => !n,         // PL
            0xB => n,          // MI
            0xC => n == v,     // GE
            0xD => n != v,     // LT
            0xE => !z && n == v, // GT
            0xF => z || n != v,  // LE
            _ => unreachable!(),
        }
    }
}
