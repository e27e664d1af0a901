use super::{B_FLAG, D_FLAG, HuC6280, I_FLAG, T_FLAG};
use crate::core::{Bus, bus::InterruptState};

pub const IRQ2: u8 = 0x01;
pub const IRQ1: u8 = 0x02;
pub const TIMER: u8 = 0x04;
pub const RESET: u8 = 0x20;

/// Lines that the mask register and the I flag can block.
const MASKABLE: u8 = IRQ2 | IRQ1 | TIMER;

pub const VECTOR_RESET: u16 = 0xFFFE;
pub const VECTOR_TIMER: u16 = 0xFFFA;
pub const VECTOR_IRQ1: u16 = 0xFFF8;
pub const VECTOR_IRQ2: u16 = 0xFFF6;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Line {
    Irq2,
    Irq1,
    Timer,
    Reset,
}

impl Line {
    pub const fn bit(self) -> u8 {
        match self {
            Line::Irq2 => IRQ2,
            Line::Irq1 => IRQ1,
            Line::Timer => TIMER,
            Line::Reset => RESET,
        }
    }
}

/// HuC6280 interrupt controller.
///
/// Four request lines feed the CPU. RESET is unmaskable; the other three
/// can be disabled individually through the mask register and collectively
/// by the I flag.
///
/// | Offset | R/W | Function                                              |
/// |--------|-----|-------------------------------------------------------|
/// | 0, 1   |  R  | I/O buffer (writes ignored)                           |
/// | 2      |  R  | Disable mask, bit set = disabled; acknowledges TIMER  |
/// | 2      |  W  | Disable mask (bit 0 IRQ2, bit 1 IRQ1, bit 2 TIMER)    |
/// | 3      |  R  | Pending: bit 0 IRQ2, bit 1 IRQ1, bit 2 TIMER          |
/// | 3      |  W  | Acknowledge TIMER                                     |
///
/// The register page sits at physical 0x1FF400-0x1FF7FF; only the low two
/// address bits are decoded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InterruptController {
    /// Lines raised through `irq_begin` (timer, reset, platform).
    pub(crate) latched: u8,
    /// Line levels last polled from the bus.
    pub(crate) external: u8,
    /// Enabled lines (the inverse of what the mask register reads back).
    pub(crate) mask: u8,
    /// Maskable lines let through by the I flag.
    pub(crate) i_mask: u8,
    /// Requests seen on the final cycle of the previous instruction.
    pub(crate) sample: u8,
    /// I flag as of the same cycle.
    pub(crate) i_flag_sample: bool,
}

impl InterruptController {
    pub fn new() -> Self {
        Self {
            latched: 0,
            external: 0,
            mask: MASKABLE,
            i_mask: 0xFF,
            sample: 0,
            i_flag_sample: false,
        }
    }

    /// Lines currently requesting service.
    pub fn pending(&self) -> u8 {
        self.latched | self.external
    }

    pub fn sampled(&self) -> u8 {
        self.sample
    }

    /// Mask register value as software reads it (bit set = disabled).
    pub fn disable_mask(&self) -> u8 {
        self.mask ^ MASKABLE
    }

    pub(crate) fn set_disable_mask(&mut self, value: u8) {
        self.mask = (value & MASKABLE) ^ MASKABLE;
    }

    pub(crate) fn raise(&mut self, line: Line) {
        self.latched |= line.bit();
    }

    pub(crate) fn lower(&mut self, line: Line) {
        self.latched &= !line.bit();
    }

    /// Reset overrides every other request.
    pub(crate) fn assert_reset(&mut self) {
        self.sample = RESET;
        self.latched = RESET;
    }

    pub(crate) fn set_external(&mut self, state: InterruptState) {
        self.external = (if state.irq1 { IRQ1 } else { 0 }) | (if state.irq2 { IRQ2 } else { 0 });
    }

    pub(crate) fn update_i_mask(&mut self, p: u8) {
        self.i_mask = if p & I_FLAG != 0 { !MASKABLE } else { 0xFF };
    }

    pub(crate) fn sample(&mut self, p: u8) {
        self.sample = self.pending() & self.mask & self.i_mask;
        self.i_flag_sample = p & I_FLAG != 0;
    }

    pub(crate) fn has_activity(&self) -> bool {
        (self.sample | self.pending()) != 0
    }

    /// Vector for the highest-priority serviceable request. TIMER is checked
    /// against the live pending lines and the sampled I flag; IRQ1 and IRQ2
    /// only when they were sampled.
    pub(crate) fn vector(&self) -> Option<u16> {
        if self.pending() & self.mask & TIMER != 0 && !self.i_flag_sample {
            Some(VECTOR_TIMER)
        } else if self.sample & IRQ1 != 0 {
            Some(VECTOR_IRQ1)
        } else if self.sample & IRQ2 != 0 {
            Some(VECTOR_IRQ2)
        } else {
            None
        }
    }

    /// Register read. `peek` suppresses the TIMER acknowledge.
    pub fn read(&mut self, address: u32, peek: bool, io_buffer: u8) -> u8 {
        if address & 2 == 0 {
            return io_buffer;
        }
        if address & 1 == 0 {
            if !peek {
                self.lower(Line::Timer);
            }
            self.disable_mask()
        } else {
            (self.pending() & MASKABLE) | (io_buffer & !MASKABLE)
        }
    }

    pub fn write(&mut self, address: u32, value: u8) {
        if address & 2 == 0 {
            return;
        }
        if address & 1 == 0 {
            self.set_disable_mask(value);
        } else {
            self.lower(Line::Timer);
        }
    }
}

impl Default for InterruptController {
    fn default() -> Self {
        Self::new()
    }
}

impl HuC6280 {
    /// Raise an interrupt line (level held until `irq_end`).
    pub fn irq_begin(&mut self, line: Line) {
        self.irq.raise(line);
    }

    pub fn irq_end(&mut self, line: Line) {
        self.irq.lower(line);
    }

    pub fn irq_status_read(&mut self, address: u32, peek: bool) -> u8 {
        self.irq.read(address, peek, self.io_buffer)
    }

    pub fn irq_status_write(&mut self, address: u32, value: u8) {
        self.irq.write(address, value);
    }

    /// Boundary check. Returns true when a reset or interrupt entry took
    /// the place of the next instruction.
    pub(crate) fn service_interrupts<const DEBUG: bool, B: Bus + ?Sized>(
        &mut self,
        bus: &mut B,
        old_pc: u32,
    ) -> bool {
        self.irq.set_external(bus.check_interrupts(self.master));
        if !self.irq.has_activity() {
            return false;
        }

        if self.irq.sample & RESET != 0 {
            self.set_speed(0);
            self.irq.mask = MASKABLE;
            self.write_mpr(7, 0);
            let lo = self.rd_mem(bus, u32::from(VECTOR_RESET));
            let hi = self.rd_mem(bus, u32::from(VECTOR_RESET) + 1);
            self.pc = u32::from(lo) | (u32::from(hi) << 8);
            self.p = I_FLAG;
            self.update_i_mask();
            self.irq.sample &= !RESET;
            self.irq.latched &= !RESET;
            self.sleeping = false;
            log::debug!("huc6280: reset vector -> {:04X}", self.pc);
            self.trace_branch::<DEBUG>(old_pc, self.pc, VECTOR_RESET);
            return true;
        }

        let Some(vector) = self.irq.vector() else {
            return false;
        };
        log::trace!("huc6280: interrupt {:04X} at {:04X}", vector, self.pc);

        self.sleeping = false;
        // A backward branch past 0x0000 leaves PC above the 16-bit range
        self.pc &= 0xFFFF;

        // Each of the seven cycles is charged before its access
        self.add_cycles(bus, 1);
        self.rd_mem(bus, self.pc);
        self.add_cycles(bus, 1);
        self.rd_mem(bus, self.pc + 1);

        self.add_cycles(bus, 1);
        self.push(bus, (self.pc >> 8) as u8);
        self.add_cycles(bus, 1);
        self.push(bus, self.pc as u8);
        self.add_cycles(bus, 1);
        self.push(bus, self.p & !B_FLAG);

        self.p |= I_FLAG;
        self.update_i_mask();
        self.p &= !(T_FLAG | D_FLAG);

        self.add_cycles(bus, 1);
        let lo = self.rd_mem(bus, u32::from(vector));
        self.add_cycles(bus, 1);
        let hi = self.rd_mem(bus, u32::from(vector) + 1);
        self.pc = u32::from(lo) | (u32::from(hi) << 8);
        self.last_cycle(bus);

        self.trace_branch::<DEBUG>(old_pc, self.pc, vector);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timer_outranks_irq1_and_irq2() {
        let mut irq = InterruptController::new();
        irq.raise(Line::Timer);
        irq.raise(Line::Irq1);
        irq.raise(Line::Irq2);
        irq.sample(0);
        assert_eq!(irq.vector(), Some(VECTOR_TIMER));
        irq.lower(Line::Timer);
        irq.sample(0);
        assert_eq!(irq.vector(), Some(VECTOR_IRQ1));
        irq.lower(Line::Irq1);
        irq.sample(0);
        assert_eq!(irq.vector(), Some(VECTOR_IRQ2));
    }

    #[test]
    fn i_flag_blocks_sampling() {
        let mut irq = InterruptController::new();
        irq.update_i_mask(I_FLAG);
        irq.raise(Line::Irq1);
        irq.sample(I_FLAG);
        assert_eq!(irq.sampled(), 0);
        assert_eq!(irq.vector(), None);
    }

    #[test]
    fn mask_register_is_stored_inverted() {
        let mut irq = InterruptController::new();
        irq.write(0x1402, 0x05);
        assert_eq!(irq.mask, IRQ1);
        assert_eq!(irq.read(0x1402, true, 0xFF), 0x05);
    }

    #[test]
    fn status_read_merges_io_buffer() {
        let mut irq = InterruptController::new();
        irq.raise(Line::Timer);
        assert_eq!(irq.read(0x1403, false, 0xA8), 0xA8 | TIMER);
        assert_eq!(irq.read(0x1400, false, 0x5A), 0x5A);
    }

    #[test]
    fn acknowledge_clears_only_timer() {
        let mut irq = InterruptController::new();
        irq.raise(Line::Timer);
        irq.raise(Line::Irq1);
        irq.write(0x1403, 0);
        assert_eq!(irq.pending(), IRQ1);
    }
}
