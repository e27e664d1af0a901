pub mod core;
pub mod cpu;

pub mod prelude {
    pub use crate::core::{Bus, BusMaster, bus::InterruptState};
    pub use crate::cpu::huc6280::{CpuConfig, DebugHooks, HuC6280, Register, Snapshot};
    pub use crate::cpu::{Cpu, CpuStateTrait};
}
