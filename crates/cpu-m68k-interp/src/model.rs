//! CPU model/capability definitions for the supported 68k parts.
//!
//! The interpreter implements 68000 execution semantics plus the 68EC020
//! additions the surrounding machines need. The capability set gates decode
//! (the decode table is built per model) and a few runtime behaviors.

/// Selected Motorola 68k CPU model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CpuModel {
    /// Motorola MC68000.
    M68000,
    /// Motorola MC68EC020 (68020 without MMU support).
    M68EC020,
}

/// Capability flags for a specific CPU model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpuCapabilities {
    /// Full-format index extension words (scale, base displacement, suppress).
    pub full_ext_word: bool,
    /// `EXTB.L` is available.
    pub extb: bool,
    /// 32-bit `MULU`/`MULS`/`DIVU`/`DIVS` forms are available.
    pub long_muldiv: bool,
    /// `Bcc.L`/`BSR.L` with a 32-bit displacement word pair.
    pub long_branch: bool,
    /// `MOVE from CCR` (68010 and later).
    pub move_from_ccr: bool,
    /// Misaligned word/long data accesses complete instead of trapping.
    pub misaligned_access: bool,
}

impl CpuModel {
    /// Static capability set for this CPU model.
    #[must_use]
    pub const fn capabilities(self) -> CpuCapabilities {
        match self {
            Self::M68000 => CpuCapabilities {
                full_ext_word: false,
                extb: false,
                long_muldiv: false,
                long_branch: false,
                move_from_ccr: false,
                misaligned_access: false,
            },
            Self::M68EC020 => CpuCapabilities {
                full_ext_word: true,
                extb: true,
                long_muldiv: true,
                long_branch: true,
                move_from_ccr: true,
                misaligned_access: true,
            },
        }
    }
}
