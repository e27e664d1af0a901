#![allow(dead_code)]

use turbochip_core::core::bus::{NO_EVENT, PHYSICAL_MASK};
use turbochip_core::core::{Bus, BusMaster, bus::InterruptState};
use turbochip_core::cpu::huc6280::{CpuConfig, HuC6280};

pub const MASTER: BusMaster = BusMaster::Cpu(0);

/// Logical address test programs are loaded at (bank 7, physical page 0).
pub const PROGRAM: u16 = 0xE000;

/// Page register layout used by the tests: I/O, RAM, five ROM pages, then
/// physical page 0 in bank 7 for code and vectors.
pub const MPR_LAYOUT: [u8; 8] = [0xFF, 0xF8, 0x01, 0x02, 0x03, 0x04, 0x05, 0x00];

/// One bus access, tagged with how many platform events had fired before it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Access {
    pub addr: u32,
    pub write: bool,
    pub events: usize,
}

/// Minimal bus for testing: flat 2MB physical memory, no peripherals.
pub struct TestBus {
    pub memory: Vec<u8>,
    pub irq1: bool,
    pub irq2: bool,
    /// Physical writes tagged by ST0/ST1/ST2: (flagged address, data).
    pub physical_writes: Vec<(u32, u8)>,
    /// Master cycles between platform events.
    pub event_interval: u64,
    pub events: Vec<u64>,
    /// Physical bytes stored when the next platform event fires.
    pub event_pokes: Vec<(u32, u8)>,
    /// Memory accesses, recorded only while set.
    pub trace: Option<Vec<Access>>,
}

impl TestBus {
    pub fn new() -> Self {
        Self {
            memory: vec![0; 0x20_0000],
            irq1: false,
            irq2: false,
            physical_writes: Vec::new(),
            event_interval: NO_EVENT,
            events: Vec::new(),
            event_pokes: Vec::new(),
            trace: None,
        }
    }

    pub fn load(&mut self, addr: u32, data: &[u8]) {
        let start = addr as usize;
        self.memory[start..start + data.len()].copy_from_slice(data);
    }

    fn record(&mut self, addr: u32, write: bool) {
        let events = self.events.len();
        if let Some(trace) = self.trace.as_mut() {
            trace.push(Access {
                addr,
                write,
                events,
            });
        }
    }

    /// Events seen before each recorded access.
    pub fn events_per_access(&self) -> Vec<usize> {
        self.trace
            .iter()
            .flatten()
            .map(|access| access.events)
            .collect()
    }
}

impl Bus for TestBus {
    fn read(&mut self, _master: BusMaster, addr: u32) -> u8 {
        self.record(addr, false);
        self.memory[(addr & PHYSICAL_MASK) as usize]
    }

    fn write(&mut self, _master: BusMaster, addr: u32, data: u8) {
        self.record(addr, true);
        self.memory[(addr & PHYSICAL_MASK) as usize] = data;
    }

    fn write_physical(&mut self, _master: BusMaster, addr: u32, data: u8) {
        self.physical_writes.push((addr, data));
    }

    fn check_interrupts(&self, _target: BusMaster) -> InterruptState {
        InterruptState {
            irq1: self.irq1,
            irq2: self.irq2,
        }
    }

    fn sync(&mut self, timestamp: u64) -> u64 {
        self.events.push(timestamp);
        for (addr, data) in std::mem::take(&mut self.event_pokes) {
            self.memory[addr as usize] = data;
        }
        self.event_interval
    }
}

/// Write bytes at a logical address through the current page table.
pub fn load(cpu: &HuC6280, bus: &mut TestBus, addr: u16, data: &[u8]) {
    for (i, &byte) in data.iter().enumerate() {
        let phys = cpu.physical_address(addr.wrapping_add(i as u16));
        bus.memory[phys as usize] = byte;
    }
}

pub fn peek(cpu: &HuC6280, bus: &TestBus, addr: u16) -> u8 {
    bus.memory[cpu.physical_address(addr) as usize]
}

pub fn poke(cpu: &HuC6280, bus: &mut TestBus, addr: u16, value: u8) {
    load(cpu, bus, addr, &[value]);
}

/// Power on with the reset vector pointing at [`PROGRAM`], take the reset,
/// map [`MPR_LAYOUT`] and put the stack pointer at the top of its page.
pub fn setup_with(config: CpuConfig) -> (HuC6280, TestBus) {
    let mut cpu = HuC6280::new(config);
    let mut bus = TestBus::new();
    // Reset maps physical page 0 into bank 7
    bus.load(0x1FFE, &[PROGRAM as u8, (PROGRAM >> 8) as u8]);
    cpu.step(&mut bus, MASTER);
    for (bank, &page) in MPR_LAYOUT.iter().enumerate() {
        cpu.set_mpr(bank, page);
    }
    cpu.s = 0xFF;
    (cpu, bus)
}

pub fn setup() -> (HuC6280, TestBus) {
    setup_with(CpuConfig::default())
}

/// Load `program` at [`PROGRAM`] and point PC at it.
pub fn setup_program(program: &[u8]) -> (HuC6280, TestBus) {
    let (mut cpu, mut bus) = setup();
    load(&cpu, &mut bus, PROGRAM, program);
    cpu.pc = u32::from(PROGRAM);
    (cpu, bus)
}

/// Execute one instruction; returns the CPU cycles it took at the current
/// speed.
pub fn step(cpu: &mut HuC6280, bus: &mut TestBus) -> u64 {
    let per_cycle = cpu.master_cycles_per_cycle();
    let start = cpu.timestamp();
    cpu.step(bus, MASTER);
    (cpu.timestamp() - start) / per_cycle
}

pub fn step_n(cpu: &mut HuC6280, bus: &mut TestBus, n: usize) -> u64 {
    (0..n).map(|_| step(cpu, bus)).sum()
}
