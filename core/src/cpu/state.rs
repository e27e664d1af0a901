//! CPU state snapshot types and traits

/// Trait for CPU types that can provide state snapshots
pub trait CpuStateTrait {
    type Snapshot;
    fn snapshot(&self) -> Self::Snapshot;
}

/// HuC6280 register snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct HuC6280State {
    pub a: u8,        // Accumulator
    pub x: u8,        // X index register
    pub y: u8,        // Y index register
    pub s: u8,        // Stack pointer (page 0x2100)
    pub p: u8,        // Status register (flags)
    pub pc: u16,      // Program counter
    pub mpr: [u8; 8], // Memory page registers
    pub speed: u8,    // 0 = 1.79 MHz, 1 = 7.16 MHz
}
