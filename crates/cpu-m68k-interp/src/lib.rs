//! Motorola 68000/68EC020 instruction-level interpreter.
//!
//! This crate executes one whole instruction per `step()` call, with
//! bit-exact flag semantics but no cycle-level bus modelling. The opcode
//! space is classified once into a 65536-entry dispatch table at CPU
//! construction, so the hot path is a table index and a `match`.
//!
//! Memory is abstracted behind the [`Bus`] trait; interrupt requests behind
//! [`InterruptController`]. Architectural exceptions (traps, illegal
//! opcodes, address errors) resolve inside `step()` by entering the
//! handler; only host-level bus refusals surface as errors.

pub mod alu;
mod arith;
mod bcd;
mod branches;
pub mod bus;
pub mod cpu;
mod decode;
pub mod ea;
mod exceptions;
pub mod flags;
mod logic;
pub mod model;
mod move_ops;
pub mod registers;
mod shifts;
mod system;

pub use alu::Size;
pub use bus::{Bus, BusFault, InterruptController};
pub use cpu::{Cpu, TraceSink};
pub use ea::AddrMode;
pub use exceptions::vector;
pub use flags::{Status, C, N, S, T, V, X, Z};
pub use model::CpuModel;
pub use registers::Registers;
