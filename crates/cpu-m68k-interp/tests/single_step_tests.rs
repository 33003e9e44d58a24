//! Runner for SingleStepTests/m68000 JSON vectors.
//!
//! Point `M68K_SST_DIR` at a directory of `*.json` vector files and these
//! tests will step every case through the interpreter and report mismatch
//! counts. Without the directory the tests are a no-op, so the suite stays
//! runnable from a bare checkout.
//!
//! PC convention: the vectors record the raw PC register of a prefetching
//! 68000, which runs two words ahead of the executing instruction. The
//! opcode therefore lives at `pc - 4`, and final PCs are compared with the
//! same offset. Cycle counts and bus transaction lists are ignored; this
//! core is instruction-stepping.

use std::env;
use std::path::PathBuf;

use serde::Deserialize;

use cpu_m68k_interp::bus::{Bus, BusFault, InterruptController};
use cpu_m68k_interp::{Cpu, CpuModel, Size};

struct TestBus {
    data: Vec<u8>,
}

impl TestBus {
    fn new() -> Self {
        Self { data: vec![0; 0x100_0000] }
    }

    fn load_ram(&mut self, ram: &[(u32, u8)]) {
        for &(addr, value) in ram {
            self.data[(addr & 0xFF_FFFF) as usize] = value;
        }
    }

    fn poke_word(&mut self, addr: u32, value: u16) {
        let a = (addr & 0xFF_FFFF) as usize;
        self.data[a] = (value >> 8) as u8;
        self.data[a + 1] = value as u8;
    }

    fn peek(&self, addr: u32) -> u8 {
        self.data[(addr & 0xFF_FFFF) as usize]
    }
}

impl Bus for TestBus {
    fn fetch(&mut self, pc: u32, addr: u32, size: Size) -> Result<u32, BusFault> {
        self.read(pc, addr, size)
    }

    fn read(&mut self, _pc: u32, addr: u32, size: Size) -> Result<u32, BusFault> {
        let mut value = 0u32;
        for i in 0..size.bytes() {
            value = value << 8 | u32::from(self.peek(addr.wrapping_add(i)));
        }
        Ok(value)
    }

    fn write(&mut self, _pc: u32, addr: u32, value: u32, size: Size) -> Result<(), BusFault> {
        for i in 0..size.bytes() {
            let shift = (size.bytes() - 1 - i) * 8;
            self.data[(addr.wrapping_add(i) & 0xFF_FFFF) as usize] = (value >> shift) as u8;
        }
        Ok(())
    }
}

/// No interrupts during vector replay.
struct Quiet;

impl InterruptController for Quiet {
    fn pending_level(&self) -> u8 {
        0
    }
}

#[derive(Debug, Deserialize)]
struct CpuState {
    d0: u32,
    d1: u32,
    d2: u32,
    d3: u32,
    d4: u32,
    d5: u32,
    d6: u32,
    d7: u32,
    a0: u32,
    a1: u32,
    a2: u32,
    a3: u32,
    a4: u32,
    a5: u32,
    a6: u32,
    usp: u32,
    ssp: u32,
    sr: u16,
    pc: u32,
    prefetch: [u32; 2],
    ram: Vec<(u32, u8)>,
}

impl CpuState {
    fn d(&self) -> [u32; 8] {
        [self.d0, self.d1, self.d2, self.d3, self.d4, self.d5, self.d6, self.d7]
    }

    fn a(&self) -> [u32; 7] {
        [self.a0, self.a1, self.a2, self.a3, self.a4, self.a5, self.a6]
    }
}

#[derive(Debug, Deserialize)]
struct TestCase {
    name: String,
    initial: CpuState,
    #[serde(rename = "final")]
    final_state: CpuState,
}

fn setup_cpu(cpu: &mut Cpu, bus: &mut TestBus, state: &CpuState) {
    bus.load_ram(&state.ram);

    cpu.regs.d = state.d();
    cpu.regs.a = state.a();
    cpu.regs.usp = state.usp;
    cpu.regs.ssp = state.ssp;
    cpu.regs.sr = state.sr;

    let instr = state.pc.wrapping_sub(4);
    cpu.regs.pc = instr;
    bus.poke_word(instr, state.prefetch[0] as u16);
    bus.poke_word(instr.wrapping_add(2), state.prefetch[1] as u16);
}

fn compare_state(cpu: &Cpu, bus: &TestBus, expected: &CpuState, name: &str) -> Vec<String> {
    let mut errors = Vec::new();

    for (i, &want) in expected.d().iter().enumerate() {
        if cpu.regs.d[i] != want {
            errors.push(format!(
                "{name}: D{i}: got {:08X}, expected {want:08X}",
                cpu.regs.d[i]
            ));
        }
    }
    for (i, &want) in expected.a().iter().enumerate() {
        if cpu.regs.a[i] != want {
            errors.push(format!(
                "{name}: A{i}: got {:08X}, expected {want:08X}",
                cpu.regs.a[i]
            ));
        }
    }
    if cpu.regs.usp != expected.usp {
        errors.push(format!("{name}: USP: got {:08X}, expected {:08X}", cpu.regs.usp, expected.usp));
    }
    if cpu.regs.ssp != expected.ssp {
        errors.push(format!("{name}: SSP: got {:08X}, expected {:08X}", cpu.regs.ssp, expected.ssp));
    }
    if cpu.regs.sr != expected.sr {
        errors.push(format!("{name}: SR: got {:04X}, expected {:04X}", cpu.regs.sr, expected.sr));
    }
    let want_pc = expected.pc.wrapping_sub(4);
    if cpu.regs.pc != want_pc {
        errors.push(format!("{name}: PC: got {:08X}, expected {want_pc:08X}", cpu.regs.pc));
    }
    for &(addr, want) in &expected.ram {
        let got = bus.peek(addr);
        if got != want {
            errors.push(format!("{name}: RAM[{addr:06X}]: got {got:02X}, expected {want:02X}"));
        }
    }
    errors
}

fn run_case(case: &TestCase) -> Result<(), Vec<String>> {
    let mut cpu = Cpu::new(CpuModel::M68000);
    let mut bus = TestBus::new();
    setup_cpu(&mut cpu, &mut bus, &case.initial);

    if let Err(fault) = cpu.step(&mut bus, &mut Quiet) {
        return Err(vec![format!("{}: bus fault: {fault}", case.name)]);
    }

    let errors = compare_state(&cpu, &bus, &case.final_state, &case.name);
    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

fn run_file(path: &PathBuf) -> (usize, usize, Vec<String>) {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => return (0, 0, vec![format!("{}: {e}", path.display())]),
    };
    let cases: Vec<TestCase> = match serde_json::from_str(&content) {
        Ok(c) => c,
        Err(e) => return (0, 0, vec![format!("{}: bad JSON: {e}", path.display())]),
    };

    let mut passed = 0;
    let mut failed = 0;
    let mut all_errors = Vec::new();
    for case in &cases {
        match run_case(case) {
            Ok(()) => passed += 1,
            Err(errors) => {
                failed += 1;
                if all_errors.len() < 20 {
                    all_errors.extend(errors.into_iter().take(3));
                }
            }
        }
    }
    (passed, failed, all_errors)
}

fn vector_dir() -> Option<PathBuf> {
    let dir = PathBuf::from(env::var_os("M68K_SST_DIR")?);
    dir.is_dir().then_some(dir)
}

/// Report pass/fail counts for every vector file found. Informational, like
/// a smoke test: frame-format differences (group 0 exception frames) are
/// expected to show up as mismatches.
#[test]
fn single_step_vectors() {
    let Some(dir) = vector_dir() else {
        eprintln!("M68K_SST_DIR not set, skipping single-step vectors");
        return;
    };

    let pattern = format!("{}/*.json", dir.display());
    let mut total_passed = 0;
    let mut total_failed = 0;

    let mut paths: Vec<PathBuf> = glob::glob(&pattern)
        .expect("bad glob pattern")
        .filter_map(Result::ok)
        .collect();
    paths.sort();

    for path in &paths {
        let (passed, failed, errors) = run_file(path);
        let stem = path.file_stem().unwrap_or_default().to_string_lossy();
        if failed > 0 {
            println!("{stem}: {passed} passed, {failed} failed");
            for err in errors.iter().take(3) {
                println!("  {err}");
            }
        } else {
            println!("{stem}: {passed} passed");
        }
        total_passed += passed;
        total_failed += failed;
    }

    println!("=== Total: {total_passed} passed, {total_failed} failed ===");
}
