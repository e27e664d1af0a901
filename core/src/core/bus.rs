/// Identifies who is accessing the bus
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BusMaster {
    Cpu(usize), // CPU 0, CPU 1, etc.
}

/// Bit 31 of an address handed to `read_physical`/`write_physical`: the access
/// came from ST0/ST1/ST2 and bypassed the MPR translation.
pub const PHYSICAL_FLAG: u32 = 0x8000_0000;

/// Physical address space of the HuC6280 (21 bits, 256 pages of 8KB).
pub const PHYSICAL_MASK: u32 = 0x1F_FFFF;

/// Delay returned by [`Bus::sync`] meaning no further event is scheduled.
pub const NO_EVENT: u64 = u64::MAX;

/// Physical bus seen by the HuC6280.
///
/// Addresses are 21-bit physical addresses; the CPU applies the MPR
/// translation itself. Every access is zero-wait-state from the CPU's view;
/// platforms that need extra latency charge it with `steal_cycles`.
pub trait Bus {
    fn read(&mut self, master: BusMaster, addr: u32) -> u8;
    fn write(&mut self, master: BusMaster, addr: u32, data: u8);

    /// Opcode and operand byte fetch. Default maps to a memory read.
    fn fetch_opcode(&mut self, master: BusMaster, addr: u32) -> u8 {
        self.read(master, addr)
    }

    /// Physical read tagged with [`PHYSICAL_FLAG`].
    fn read_physical(&mut self, master: BusMaster, addr: u32) -> u8 {
        self.read(master, addr & PHYSICAL_MASK)
    }

    /// Physical write tagged with [`PHYSICAL_FLAG`] (ST0/ST1/ST2).
    /// Default strips the flag and forwards to `write`.
    fn write_physical(&mut self, master: BusMaster, addr: u32, data: u8) {
        self.write(master, addr & PHYSICAL_MASK, data)
    }

    /// External interrupt line levels, polled at instruction boundaries and
    /// at every interrupt sampling point.
    fn check_interrupts(&self, target: BusMaster) -> InterruptState;

    /// Platform event callback, invoked once the scheduled event timestamp
    /// is reached. Returns the number of master cycles until the next call.
    fn sync(&mut self, _timestamp: u64) -> u64 {
        NO_EVENT
    }
}

#[derive(Default, Clone, Copy, Debug, PartialEq, Eq)]
pub struct InterruptState {
    pub irq1: bool, // VDC
    pub irq2: bool, // CD-ROM, expansion port
}
