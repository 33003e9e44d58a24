//! Bus and interrupt-controller traits consumed by the interpreter.
//!
//! The 68000 family is big-endian; a `Long` access is by convention two
//! big-endian word accesses. The core issues every architecturally required
//! access exactly once, in program order; an implementation may have side
//! effects on any call (chip registers, DMA state) and depends on this.
//!
//! `fetch` is used only for the instruction stream (opcodes, extension words,
//! immediates); `read` for data operands. A driver may instrument them
//! differently (e.g. execute-only memory), but both must return the same
//! bytes for ordinary RAM.
//!
//! Every method takes the current instruction's PC as a diagnostics argument
//! so a bus implementation can attribute accesses without reaching back into
//! the CPU.

use crate::alu::Size;

/// Fatal, host-level bus failure.
///
/// This is *not* how guest-visible faults are reported: address errors,
/// illegal instructions and the like become CPU traps inside
/// [`step`](crate::Cpu::step). A `BusFault` means the surrounding system is
/// broken (unmapped fatal region, device wedged) and is propagated to the
/// driver as a hard error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusFault {
    /// Address of the failing access.
    pub addr: u32,
    /// Access size.
    pub size: Size,
    /// True for a write access.
    pub is_write: bool,
}

impl std::fmt::Display for BusFault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "bus fault: {} {:?} at {:06X}",
            if self.is_write { "write" } else { "read" },
            self.size,
            self.addr
        )
    }
}

impl std::error::Error for BusFault {}

/// Memory-mapped bus the CPU core executes against.
pub trait Bus {
    /// Read from the instruction stream. `pc` is diagnostic only.
    fn fetch(&mut self, pc: u32, addr: u32, size: Size) -> Result<u32, BusFault>;

    /// Read a data operand. `pc` is diagnostic only.
    fn read(&mut self, pc: u32, addr: u32, size: Size) -> Result<u32, BusFault>;

    /// Write a data operand. `pc` is diagnostic only.
    fn write(&mut self, pc: u32, addr: u32, value: u32, size: Size) -> Result<(), BusFault>;
}

/// Pending-interrupt source polled once per instruction boundary.
pub trait InterruptController {
    /// Highest pending interrupt level, 0 (none) through 7 (non-maskable).
    fn pending_level(&self) -> u8;
}

/// No interrupt source. Useful for tests and single-step drivers.
impl InterruptController for () {
    fn pending_level(&self) -> u8 {
        0
    }
}
