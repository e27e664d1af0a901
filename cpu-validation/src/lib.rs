use std::collections::{BTreeMap, HashMap};
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use rand::Rng;
use serde::{Deserialize, Serialize};
use turbochip_core::core::bus::{InterruptState, NO_EVENT, PHYSICAL_MASK};
use turbochip_core::core::{Bus, BusMaster};
use turbochip_core::cpu::huc6280::timer::RESET_DIVIDER;
use turbochip_core::cpu::huc6280::{AddressingMode, CpuConfig, HuC6280, OPCODE_TABLE, Snapshot};

pub const MASTER: BusMaster = BusMaster::Cpu(0);

// --- TracingBus: sparse 2MB physical memory with access recording ---

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BusOp {
    Read,
    Write,
    /// ST0/ST1/ST2 store, address still carries the physical flag.
    Physical,
}

impl BusOp {
    pub fn as_str(self) -> &'static str {
        match self {
            BusOp::Read => "read",
            BusOp::Write => "write",
            BusOp::Physical => "physical",
        }
    }
}

#[derive(Clone, Debug)]
pub struct BusCycle {
    pub addr: u32,
    pub data: u8,
    pub op: BusOp,
}

/// Bytes never written read back as a fixed hash of `(seed, address)`, so
/// a test sees "random" memory without filling 2MB per case.
pub struct TracingBus {
    seed: u64,
    pub memory: HashMap<u32, u8>,
    /// Value each address held before its first access.
    initial: BTreeMap<u32, u8>,
    pub cycles: Vec<BusCycle>,
}

fn noise(seed: u64, addr: u32) -> u8 {
    // splitmix64 finalizer
    let mut z = seed ^ u64::from(addr).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    (z ^ (z >> 31)) as u8
}

impl TracingBus {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            memory: HashMap::new(),
            initial: BTreeMap::new(),
            cycles: Vec::new(),
        }
    }

    pub fn peek(&self, addr: u32) -> u8 {
        let addr = addr & PHYSICAL_MASK;
        self.memory
            .get(&addr)
            .copied()
            .unwrap_or_else(|| noise(self.seed, addr))
    }

    pub fn poke(&mut self, addr: u32, data: u8) {
        self.memory.insert(addr & PHYSICAL_MASK, data);
    }

    /// Write bytes at a logical address through the CPU's page table.
    pub fn load(&mut self, cpu: &HuC6280, addr: u16, data: &[u8]) {
        for (i, &byte) in data.iter().enumerate() {
            self.poke(cpu.physical_address(addr.wrapping_add(i as u16)), byte);
        }
    }

    /// Pre-execution value of every address touched since the last clear.
    pub fn initial_values(&self) -> &BTreeMap<u32, u8> {
        &self.initial
    }

    pub fn clear_cycles(&mut self) {
        self.cycles.clear();
        self.initial.clear();
    }
}

impl Bus for TracingBus {
    fn read(&mut self, _master: BusMaster, addr: u32) -> u8 {
        let addr = addr & PHYSICAL_MASK;
        let data = self.peek(addr);
        self.initial.entry(addr).or_insert(data);
        self.cycles.push(BusCycle {
            addr,
            data,
            op: BusOp::Read,
        });
        data
    }

    fn write(&mut self, _master: BusMaster, addr: u32, data: u8) {
        let addr = addr & PHYSICAL_MASK;
        let before = self.peek(addr);
        self.initial.entry(addr).or_insert(before);
        self.memory.insert(addr, data);
        self.cycles.push(BusCycle {
            addr,
            data,
            op: BusOp::Write,
        });
    }

    fn write_physical(&mut self, _master: BusMaster, addr: u32, data: u8) {
        self.cycles.push(BusCycle {
            addr,
            data,
            op: BusOp::Physical,
        });
    }

    fn check_interrupts(&self, _target: BusMaster) -> InterruptState {
        InterruptState::default()
    }
}

// --- JSON test vector types ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    pub name: String,
    pub initial: CpuState,
    #[serde(rename = "final")]
    pub final_state: CpuState,
    /// Master cycles the instruction took.
    pub master_cycles: u64,
    pub cycles: Vec<(u32, u8, String)>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CpuState {
    pub pc: u16,
    pub s: u8,
    pub a: u8,
    pub x: u8,
    pub y: u8,
    pub p: u8,
    pub mpr: [u8; 8],
    pub speed: u8,
    /// Physical address, value.
    pub ram: Vec<(u32, u8)>,
}

/// Put the CPU into `state` with interrupts masked, the timer stopped and
/// no reset pending, and preload the listed memory.
pub fn apply_state(cpu: &mut HuC6280, bus: &mut TracingBus, state: &CpuState) {
    cpu.load_state(&Snapshot {
        pc: state.pc,
        a: state.a,
        p: state.p,
        i_flag_sample: state.p & 0x04 != 0,
        x: state.x,
        y: state.y,
        s: state.s,
        irq_mask: 0x07,
        mpr: state.mpr,
        speed: state.speed,
        timer_divider: RESET_DIVIDER,
        next_user_event: NO_EVENT,
        io_buffer: 0xFF,
        ..Snapshot::default()
    });
    for &(addr, value) in &state.ram {
        bus.poke(addr, value);
    }
}

pub fn capture_state(cpu: &HuC6280, ram: Vec<(u32, u8)>) -> CpuState {
    let mut mpr = [0; 8];
    for (bank, entry) in mpr.iter_mut().enumerate() {
        *entry = cpu.mpr(bank);
    }
    CpuState {
        pc: cpu.pc as u16,
        s: cpu.s,
        a: cpu.a,
        x: cpu.x,
        y: cpu.y,
        p: cpu.p,
        mpr,
        speed: cpu.speed(),
        ram,
    }
}

// --- Generation ---

/// Generator settings, read from a TOML file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub count: usize,
    pub out_dir: PathBuf,
    pub seed: Option<u64>,
    pub gzip: bool,
    /// Upper bound on random block transfer lengths.
    pub max_block_length: u16,
    /// Opcodes never generated.
    pub skip: Vec<u8>,
    pub cpu: CpuConfig,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            count: 1000,
            out_dir: PathBuf::from("test_data/huc6280"),
            seed: None,
            gzip: false,
            max_block_length: 16,
            skip: Vec::new(),
            cpu: CpuConfig::default(),
        }
    }
}

impl GeneratorConfig {
    pub fn load(path: &Path) -> io::Result<Self> {
        let text = fs::read_to_string(path)?;
        toml::from_str(&text).map_err(io::Error::other)
    }
}

/// Random machine state with `opcode` at PC. Page 0xFF (the on-chip I/O
/// page) is never mapped, so every access reaches the tracing bus.
pub fn random_state(
    rng: &mut impl Rng,
    opcode: u8,
    max_block_length: u16,
) -> (CpuState, Vec<(u16, u8)>) {
    let mut mpr = [0u8; 8];
    for entry in mpr.iter_mut() {
        *entry = rng.gen_range(0..0xFF);
    }
    let state = CpuState {
        pc: rng.r#gen(),
        s: rng.r#gen(),
        a: rng.r#gen(),
        x: rng.r#gen(),
        y: rng.r#gen(),
        p: rng.r#gen(),
        mpr,
        speed: rng.gen_range(0..=1),
        ram: Vec::new(),
    };

    // Logical bytes to place after loading: the opcode, and for block
    // transfers a short length
    let mut program = vec![(state.pc, opcode)];
    if OPCODE_TABLE[opcode as usize].mode == AddressingMode::BlockTransfer {
        let length = rng.gen_range(1..=max_block_length.max(1));
        program.push((state.pc.wrapping_add(5), length as u8));
        program.push((state.pc.wrapping_add(6), (length >> 8) as u8));
    }
    (state, program)
}

/// Run one instruction from a random state and record everything it did.
pub fn generate_case(rng: &mut impl Rng, opcode: u8, config: &GeneratorConfig) -> TestCase {
    let (mut initial, program) = random_state(rng, opcode, config.max_block_length);
    let mut cpu = HuC6280::new(config.cpu);
    let mut bus = TracingBus::new(rng.r#gen());
    apply_state(&mut cpu, &mut bus, &initial);
    for &(addr, byte) in &program {
        bus.load(&cpu, addr, &[byte]);
    }

    let name = (0..=OPCODE_TABLE[opcode as usize].mode.operand_len())
        .map(|i| format!("{:02x}", bus.peek(cpu.physical_address(initial.pc.wrapping_add(i)))))
        .collect::<Vec<_>>()
        .join(" ");

    let start = cpu.timestamp();
    cpu.step(&mut bus, MASTER);
    let master_cycles = cpu.timestamp() - start;

    initial.ram = bus
        .initial_values()
        .iter()
        .map(|(&addr, &value)| (addr, value))
        .collect();
    let final_ram = bus
        .initial_values()
        .keys()
        .map(|&addr| (addr, bus.peek(addr)))
        .collect();

    TestCase {
        name,
        initial,
        final_state: capture_state(&cpu, final_ram),
        master_cycles,
        cycles: bus
            .cycles
            .iter()
            .map(|c| (c.addr, c.data, c.op.as_str().to_string()))
            .collect(),
    }
}

// --- Vector files ---

fn is_gzip(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "gz")
}

/// Write test vectors as pretty JSON, gzip-compressed when the path ends
/// in `.gz`.
pub fn write_vectors(path: &Path, tests: &[TestCase]) -> io::Result<()> {
    let file = BufWriter::new(File::create(path)?);
    if is_gzip(path) {
        let mut encoder = GzEncoder::new(file, Compression::default());
        serde_json::to_writer_pretty(&mut encoder, tests)?;
        encoder.finish()?.flush()
    } else {
        let mut file = file;
        serde_json::to_writer_pretty(&mut file, tests)?;
        file.flush()
    }
}

pub fn read_vectors(path: &Path) -> io::Result<Vec<TestCase>> {
    let mut file = BufReader::new(File::open(path)?);
    let mut text = Vec::new();
    if is_gzip(path) {
        GzDecoder::new(file).read_to_end(&mut text)?;
    } else {
        file.read_to_end(&mut text)?;
    }
    Ok(serde_json::from_slice(&text)?)
}

/// `xx.json` and `xx.json.gz` files in `dir`, sorted by name.
pub fn vector_files(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.ends_with(".json") || n.ends_with(".json.gz"))
        })
        .collect();
    files.sort();
    Ok(files)
}
