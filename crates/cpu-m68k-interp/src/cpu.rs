//! The instruction stepper.
//!
//! `Cpu` owns the architectural state plus the dispatch table and advances
//! one whole instruction per [`Cpu::step`] call. Everything that can go
//! wrong during an instruction travels as a [`Fault`]: guest faults (traps,
//! illegal encodings, address errors) are resolved inside `step()` by
//! entering the corresponding exception, while host bus faults surface to
//! the caller as `Err(BusFault)` with the architectural state untouched by
//! the failing access.

use crate::alu::Size;
use crate::bus::{Bus, BusFault, InterruptController};
use crate::decode::{DecodeTable, Op};
use crate::exceptions::vector;
use crate::flags;
use crate::model::{CpuCapabilities, CpuModel};
use crate::registers::Registers;

/// Nominal cycle charges. This core is instruction-stepping, not
/// cycle-accurate; callers that pace execution get a coarse charge.
const CYCLES_INSTRUCTION: u32 = 4;
const CYCLES_EXCEPTION: u32 = 34;
const CYCLES_INTERRUPT: u32 = 44;
const CYCLES_STOPPED: u32 = 4;

/// Why an instruction could not run to completion.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Fault {
    /// An architectural exception. `pc` is the program counter value the
    /// exception frame will carry.
    Guest { vector: u8, pc: u32 },
    /// The host bus refused an access. Propagates out of `step()`.
    Bus(BusFault),
}

impl From<BusFault> for Fault {
    fn from(fault: BusFault) -> Self {
        Self::Bus(fault)
    }
}

/// Result alias used throughout instruction execution.
pub(crate) type Exec<T> = Result<T, Fault>;

/// Observer invoked once per instruction, before execution, with the
/// opcode word and a snapshot of the register file.
pub trait TraceSink {
    fn instruction(&mut self, pc: u32, opcode: u16, regs: &Registers);
}

/// A 68000 or 68EC020 core.
pub struct Cpu {
    model: CpuModel,
    caps: CpuCapabilities,
    pub regs: Registers,
    table: DecodeTable,
    stopped: bool,
    /// Address of the opcode word of the instruction in flight.
    instr_pc: u32,
    trace_sink: Option<Box<dyn TraceSink>>,
}

impl Cpu {
    /// Build a core for the given model. The 65536-entry dispatch table is
    /// computed here, once.
    #[must_use]
    pub fn new(model: CpuModel) -> Self {
        let caps = model.capabilities();
        Self {
            model,
            caps,
            regs: Registers::new(),
            table: DecodeTable::new(caps),
            stopped: false,
            instr_pc: 0,
            trace_sink: None,
        }
    }

    #[must_use]
    pub fn model(&self) -> CpuModel {
        self.model
    }

    pub(crate) fn caps(&self) -> CpuCapabilities {
        self.caps
    }

    /// Install or remove the per-instruction observer.
    pub fn set_trace_sink(&mut self, sink: Option<Box<dyn TraceSink>>) {
        self.trace_sink = sink;
    }

    /// True while a `STOP` instruction is holding the core. Cleared by the
    /// next taken interrupt.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Snapshot the register file.
    #[must_use]
    pub fn registers(&self) -> Registers {
        self.regs
    }

    /// Replace the register file wholesale. The SR value is masked to its
    /// implemented bits.
    pub fn set_registers(&mut self, regs: Registers) {
        self.regs = regs;
        self.regs.sr &= flags::SR_MASK;
    }

    pub fn set_pc(&mut self, pc: u32) {
        self.regs.pc = pc;
    }

    /// Hardware reset: load SSP from vector 0 and PC from vector 1, enter
    /// supervisor state with interrupts masked.
    pub fn reset<B: Bus>(&mut self, bus: &mut B) -> Result<(), BusFault> {
        self.regs = Registers::new();
        self.stopped = false;
        self.regs.ssp = bus.read(0, 0, Size::Long)?;
        self.regs.pc = bus.read(0, 4, Size::Long)?;
        Ok(())
    }

    /// Execute one instruction (or take one pending interrupt) and return
    /// a nominal cycle count.
    ///
    /// # Errors
    ///
    /// Returns the [`BusFault`] unchanged if the bus refuses an access.
    /// Architectural state is as it was before the failing access.
    pub fn step<B: Bus, I: InterruptController>(
        &mut self,
        bus: &mut B,
        irq: &mut I,
    ) -> Result<u32, BusFault> {
        let level = irq.pending_level() & 7;
        if level != 0 && (level == 7 || level > self.regs.interrupt_mask()) {
            self.enter_interrupt(bus, level)?;
            return Ok(CYCLES_INTERRUPT);
        }
        if self.stopped {
            return Ok(CYCLES_STOPPED);
        }

        let trace_pending = self.regs.is_trace();
        self.instr_pc = self.regs.pc;

        let opcode = match self.fetch_word(bus) {
            Ok(word) => word,
            Err(fault) => return self.resolve(bus, fault),
        };
        if let Some(sink) = self.trace_sink.as_mut() {
            sink.instruction(self.instr_pc, opcode, &self.regs);
        }

        match self.execute(bus, self.table.lookup(opcode)) {
            Ok(()) => {
                if trace_pending {
                    self.enter_exception(bus, vector::TRACE, self.regs.pc)?;
                    return Ok(CYCLES_EXCEPTION);
                }
                Ok(CYCLES_INSTRUCTION)
            }
            Err(fault) => self.resolve(bus, fault),
        }
    }

    /// Turn a fault into either an exception entry or a propagated host
    /// error.
    fn resolve<B: Bus>(&mut self, bus: &mut B, fault: Fault) -> Result<u32, BusFault> {
        match fault {
            Fault::Guest { vector, pc } => {
                self.enter_exception(bus, vector, pc)?;
                Ok(CYCLES_EXCEPTION)
            }
            Fault::Bus(fault) => Err(fault),
        }
    }

    fn execute<B: Bus>(&mut self, bus: &mut B, op: Op) -> Exec<()> {
        match op {
            Op::Illegal => Err(self.illegal()),
            Op::LineA => Err(self.guest_fault(vector::LINE_A)),
            Op::LineF => Err(self.guest_fault(vector::LINE_F)),
            Op::IllegalInstr => Err(self.guest_fault(vector::ILLEGAL)),

            Op::Imm { op, size, dst } => self.exec_imm(bus, op, size, dst),
            Op::ImmToCcr { op } => self.exec_imm_to_ccr(bus, op),
            Op::ImmToSr { op } => self.exec_imm_to_sr(bus, op),
            Op::BitStatic { op, dst } => self.exec_bit_static(bus, op, dst),
            Op::BitDynamic { op, dn, dst } => self.exec_bit_dynamic(bus, op, dn, dst),
            Op::Movep { dn, an, to_mem, long } => self.exec_movep(bus, dn, an, to_mem, long),

            Op::Move { size, src, dst } => self.exec_move(bus, size, src, dst),
            Op::Movea { size, src, an } => self.exec_movea(bus, size, src, an),
            Op::Moveq { dn, data } => self.exec_moveq(dn, data),
            Op::Movem { to_mem, long, ea } => self.exec_movem(bus, to_mem, long, ea),
            Op::Lea { an, src } => self.exec_lea(bus, an, src),
            Op::Pea { src } => self.exec_pea(bus, src),
            Op::Exg { pair, rx, ry } => self.exec_exg(pair, rx, ry),
            Op::Swap { dn } => self.exec_swap(dn),
            Op::Ext { dn, long } => self.exec_ext(dn, long),
            Op::ExtbL { dn } => self.exec_extb(dn),
            Op::Clr { size, dst } => self.exec_clr(bus, size, dst),

            Op::MoveFromSr { dst } => self.exec_move_from_sr(bus, dst),
            Op::MoveFromCcr { dst } => self.exec_move_from_ccr(bus, dst),
            Op::MoveToCcr { src } => self.exec_move_to_ccr(bus, src),
            Op::MoveToSr { src } => self.exec_move_to_sr(bus, src),
            Op::MoveToUsp { an } => self.exec_move_to_usp(an),
            Op::MoveFromUsp { an } => self.exec_move_from_usp(an),

            Op::Negx { size, dst } => self.exec_negx(bus, size, dst),
            Op::Neg { size, dst } => self.exec_neg(bus, size, dst),
            Op::Not { size, dst } => self.exec_not(bus, size, dst),
            Op::Tst { size, src } => self.exec_tst(bus, size, src),
            Op::Tas { dst } => self.exec_tas(bus, dst),

            Op::Add { size, dn, to_ea, ea } => self.exec_add(bus, size, dn, to_ea, ea),
            Op::Sub { size, dn, to_ea, ea } => self.exec_sub(bus, size, dn, to_ea, ea),
            Op::Adda { size, an, ea } => self.exec_adda(bus, size, an, ea),
            Op::Suba { size, an, ea } => self.exec_suba(bus, size, an, ea),
            Op::Addx { size, rx, ry, mem } => self.exec_addx(bus, size, rx, ry, mem),
            Op::Subx { size, rx, ry, mem } => self.exec_subx(bus, size, rx, ry, mem),
            Op::Addq { data, size, dst } => self.exec_addq(bus, data, size, dst),
            Op::Subq { data, size, dst } => self.exec_subq(bus, data, size, dst),
            Op::Cmp { size, dn, ea } => self.exec_cmp(bus, size, dn, ea),
            Op::Cmpa { size, an, ea } => self.exec_cmpa(bus, size, an, ea),
            Op::Cmpm { size, ax, ay } => self.exec_cmpm(bus, size, ax, ay),

            Op::Mulu { dn, src } => self.exec_mulu(bus, dn, src),
            Op::Muls { dn, src } => self.exec_muls(bus, dn, src),
            Op::Divu { dn, src } => self.exec_divu(bus, dn, src),
            Op::Divs { dn, src } => self.exec_divs(bus, dn, src),
            Op::MulLong { src, .. } => self.exec_mul_long(bus, src),
            Op::DivLong { src, .. } => self.exec_div_long(bus, src),

            Op::And { size, dn, to_ea, ea } => self.exec_and(bus, size, dn, to_ea, ea),
            Op::Or { size, dn, to_ea, ea } => self.exec_or(bus, size, dn, to_ea, ea),
            Op::Eor { size, dn, ea } => self.exec_eor(bus, size, dn, ea),

            Op::Abcd { rx, ry, mem } => self.exec_abcd(bus, rx, ry, mem),
            Op::Sbcd { rx, ry, mem } => self.exec_sbcd(bus, rx, ry, mem),
            Op::Nbcd { dst } => self.exec_nbcd(bus, dst),

            Op::ShiftReg { op, left, size, count_is_reg, count, dn } => {
                self.exec_shift_reg(op, left, size, count_is_reg, count, dn)
            }
            Op::ShiftMem { op, left, dst } => self.exec_shift_mem(bus, op, left, dst),

            Op::Bcc { cond, disp } => self.exec_bcc(bus, cond, disp),
            Op::Dbcc { cond, dn } => self.exec_dbcc(bus, cond, dn),
            Op::Scc { cond, dst } => self.exec_scc(bus, cond, dst),
            Op::Jmp { target } => self.exec_jmp(bus, target),
            Op::Jsr { target } => self.exec_jsr(bus, target),
            Op::Rts => self.exec_rts(bus),
            Op::Rtr => self.exec_rtr(bus),
            Op::Link { an } => self.exec_link(bus, an),
            Op::Unlk { an } => self.exec_unlk(bus, an),

            Op::Trap { vec } => Err(self.trap(vector::TRAP_BASE + vec)),
            Op::Trapv => self.exec_trapv(),
            Op::Chk { dn, src } => self.exec_chk(bus, dn, src),
            Op::Rte => self.exec_rte(bus),
            Op::Stop => self.exec_stop(bus),
            Op::Reset => self.exec_reset(),
            Op::Nop => Ok(()),
        }
    }

    // --- fault constructors -------------------------------------------

    /// Illegal-instruction fault framed at the current opcode.
    pub(crate) fn illegal(&self) -> Fault {
        Fault::Guest { vector: vector::ILLEGAL, pc: self.instr_pc }
    }

    /// Decode-class fault (illegal, privilege, line A/F): the frame points
    /// back at the faulting opcode so a handler can inspect or emulate it.
    pub(crate) fn guest_fault(&self, vector: u8) -> Fault {
        Fault::Guest { vector, pc: self.instr_pc }
    }

    /// Trap-class fault (TRAP, TRAPV, CHK, divide by zero): the frame
    /// points past the instruction so RTE resumes after it.
    pub(crate) fn trap(&self, vector: u8) -> Fault {
        Fault::Guest { vector, pc: self.regs.pc }
    }

    pub(crate) fn address_error(&self, _addr: u32) -> Fault {
        Fault::Guest { vector: vector::ADDRESS_ERROR, pc: self.instr_pc }
    }

    /// Privilege check for supervisor-only instructions.
    pub(crate) fn require_supervisor(&self) -> Exec<()> {
        if self.regs.is_supervisor() {
            Ok(())
        } else {
            Err(self.guest_fault(vector::PRIVILEGE))
        }
    }

    // --- instruction stream and data accesses -------------------------

    fn check_alignment(&self, addr: u32, size: Size) -> Exec<()> {
        if size != Size::Byte && addr & 1 != 0 && !self.caps.misaligned_access {
            return Err(self.address_error(addr));
        }
        Ok(())
    }

    /// The misalignment waiver covers data only: an odd PC is an address
    /// error on every model.
    fn check_fetch_alignment(&self, addr: u32) -> Exec<()> {
        if addr & 1 != 0 {
            return Err(self.address_error(addr));
        }
        Ok(())
    }

    /// Fetch the next instruction-stream word and advance PC.
    pub(crate) fn fetch_word<B: Bus>(&mut self, bus: &mut B) -> Exec<u16> {
        let addr = self.regs.pc;
        self.check_fetch_alignment(addr)?;
        let value = bus.fetch(self.instr_pc, addr, Size::Word)?;
        self.regs.pc = addr.wrapping_add(2);
        Ok(value as u16)
    }

    /// Fetch the next instruction-stream long and advance PC.
    pub(crate) fn fetch_long<B: Bus>(&mut self, bus: &mut B) -> Exec<u32> {
        let addr = self.regs.pc;
        self.check_fetch_alignment(addr)?;
        let value = bus.fetch(self.instr_pc, addr, Size::Long)?;
        self.regs.pc = addr.wrapping_add(4);
        Ok(value)
    }

    pub(crate) fn read_bus<B: Bus>(&mut self, bus: &mut B, addr: u32, size: Size) -> Exec<u32> {
        self.check_alignment(addr, size)?;
        Ok(bus.read(self.instr_pc, addr, size)?)
    }

    pub(crate) fn write_bus<B: Bus>(
        &mut self,
        bus: &mut B,
        addr: u32,
        value: u32,
        size: Size,
    ) -> Exec<()> {
        self.check_alignment(addr, size)?;
        bus.write(self.instr_pc, addr, value & size.mask(), size)?;
        Ok(())
    }

    // --- stack helpers (through the active A7 bank) --------------------

    pub(crate) fn push_long<B: Bus>(&mut self, bus: &mut B, value: u32) -> Exec<()> {
        let sp = self.regs.a(7).wrapping_sub(4);
        self.write_bus(bus, sp, value, Size::Long)?;
        self.regs.set_a(7, sp);
        Ok(())
    }

    pub(crate) fn push_word<B: Bus>(&mut self, bus: &mut B, value: u16) -> Exec<()> {
        let sp = self.regs.a(7).wrapping_sub(2);
        self.write_bus(bus, sp, u32::from(value), Size::Word)?;
        self.regs.set_a(7, sp);
        Ok(())
    }

    pub(crate) fn pop_long<B: Bus>(&mut self, bus: &mut B) -> Exec<u32> {
        let sp = self.regs.a(7);
        let value = self.read_bus(bus, sp, Size::Long)?;
        self.regs.set_a(7, sp.wrapping_add(4));
        Ok(value)
    }

    pub(crate) fn pop_word<B: Bus>(&mut self, bus: &mut B) -> Exec<u16> {
        let sp = self.regs.a(7);
        let value = self.read_bus(bus, sp, Size::Word)?;
        self.regs.set_a(7, sp.wrapping_add(2));
        Ok(value as u16)
    }

    // --- STOP state ----------------------------------------------------

    pub(crate) fn set_stopped(&mut self, stopped: bool) {
        self.stopped = stopped;
    }
}
