/// Generic CPU interface
pub trait Cpu: CpuStateTrait {
    /// Cold start: clear registers and caches, then reset
    fn power(&mut self);

    /// Assert the reset line; the vector is fetched at the next boundary
    fn reset(&mut self);

    /// Drive the external interrupt lines to the given levels
    fn signal_interrupt(&mut self, int: crate::core::bus::InterruptState);

    /// Query if CPU is halted internally (WAI)
    fn is_sleeping(&self) -> bool;
}

// Re-export state types
pub mod state;
pub use state::{CpuStateTrait, HuC6280State};

pub mod huc6280;
pub use huc6280::HuC6280;
