use super::{HuC6280, ZERO_PAGE};
use crate::core::Bus;

/// Memory operand of a load, store or read-modify-write instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operand {
    Immediate,
    ZeroPage,
    ZeroPageX,
    ZeroPageY,
    Absolute,
    AbsoluteX,
    AbsoluteY,
    /// (zp)
    Indirect,
    /// (zp,X)
    IndexedIndirect,
    /// (zp),Y
    IndirectIndexed,
}

impl HuC6280 {
    /// Two operand bytes, low first.
    pub(crate) fn absolute<B: Bus + ?Sized>(&mut self, bus: &mut B) -> u32 {
        let lo = self.fetch_operand(bus);
        let hi = self.fetch_operand(bus);
        u32::from(lo) | (u32::from(hi) << 8)
    }

    /// Absolute plus index. May exceed 0xFFFF, landing in the bank 8 shadow.
    pub(crate) fn abs_indexed<B: Bus + ?Sized>(&mut self, bus: &mut B, index: u8) -> u32 {
        self.absolute(bus) + u32::from(index)
    }

    pub(crate) fn zp<B: Bus + ?Sized>(&mut self, bus: &mut B) -> u32 {
        ZERO_PAGE | u32::from(self.fetch_operand(bus))
    }

    /// Zero page plus index, wrapping within the page.
    pub(crate) fn zp_indexed<B: Bus + ?Sized>(&mut self, bus: &mut B, index: u8) -> u32 {
        ZERO_PAGE | u32::from(index.wrapping_add(self.fetch_operand(bus)))
    }

    /// 16-bit pointer at zero page `ptr`; the high byte wraps within the page.
    fn zp_pointer<B: Bus + ?Sized>(&mut self, bus: &mut B, ptr: u8) -> u32 {
        let lo = self.rd_mem(bus, ZERO_PAGE | u32::from(ptr));
        let hi = self.rd_mem(bus, ZERO_PAGE | u32::from(ptr.wrapping_add(1)));
        u32::from(lo) | (u32::from(hi) << 8)
    }

    /// (zp)
    pub(crate) fn indirect<B: Bus + ?Sized>(&mut self, bus: &mut B) -> u32 {
        let ptr = self.fetch_operand(bus);
        self.zp_pointer(bus, ptr)
    }

    /// (zp,X)
    pub(crate) fn indexed_indirect<B: Bus + ?Sized>(&mut self, bus: &mut B) -> u32 {
        let ptr = self.fetch_operand(bus).wrapping_add(self.x);
        self.zp_pointer(bus, ptr)
    }

    /// (zp),Y. The sum is not wrapped to 16 bits.
    pub(crate) fn indirect_indexed<B: Bus + ?Sized>(&mut self, bus: &mut B) -> u32 {
        let ptr = self.fetch_operand(bus);
        self.zp_pointer(bus, ptr) + u32::from(self.y)
    }

    /// Resolve a memory operand. Returns the logical address and the cycles
    /// the access charges ahead of its final cycle.
    pub(crate) fn effective_address<B: Bus + ?Sized>(
        &mut self,
        bus: &mut B,
        operand: Operand,
    ) -> (u32, u32) {
        match operand {
            Operand::Immediate => {
                let addr = self.pc;
                self.pc = self.pc.wrapping_add(1);
                (addr, 1)
            }
            Operand::ZeroPage => (self.zp(bus), 3),
            Operand::ZeroPageX => (self.zp_indexed(bus, self.x), 3),
            Operand::ZeroPageY => (self.zp_indexed(bus, self.y), 3),
            Operand::Absolute => (self.absolute(bus), 4),
            Operand::AbsoluteX => (self.abs_indexed(bus, self.x), 4),
            Operand::AbsoluteY => (self.abs_indexed(bus, self.y), 4),
            Operand::Indirect => (self.indirect(bus), 6),
            Operand::IndexedIndirect => (self.indexed_indirect(bus), 6),
            Operand::IndirectIndexed => (self.indirect_indexed(bus), 6),
        }
    }

    /// Load-type access: charge, take the final cycle, read, then apply `op`.
    pub(crate) fn ld<B, F>(&mut self, bus: &mut B, operand: Operand, op: F)
    where
        B: Bus + ?Sized,
        F: FnOnce(&mut Self, &mut B, u8),
    {
        let value = if operand == Operand::Immediate {
            let value = self.fetch_operand(bus);
            self.add_cycles(bus, 1);
            self.last_cycle(bus);
            value
        } else {
            let (addr, cycles) = self.effective_address(bus, operand);
            self.add_cycles(bus, cycles);
            self.last_cycle(bus);
            self.rd_mem(bus, addr)
        };
        op(self, bus, value);
    }

    /// Store: the write lands after the final cycle is taken.
    pub(crate) fn st<B: Bus + ?Sized>(&mut self, bus: &mut B, operand: Operand, value: u8) {
        let (addr, cycles) = self.effective_address(bus, operand);
        self.add_cycles(bus, cycles);
        self.last_cycle(bus);
        self.wr_mem(bus, addr, value);
    }

    /// Read-modify-write on memory. Two cycles dearer than a load.
    pub(crate) fn rmw<B, F>(&mut self, bus: &mut B, operand: Operand, op: F)
    where
        B: Bus + ?Sized,
        F: FnOnce(&mut Self, u8) -> u8,
    {
        let (addr, cycles) = self.effective_address(bus, operand);
        self.add_cycles(bus, cycles + 2);
        let value = self.rd_mem(bus, addr);
        let value = op(self, value);
        self.last_cycle(bus);
        self.wr_mem(bus, addr, value);
    }

    /// Read-modify-write on A.
    pub(crate) fn rmw_a<B, F>(&mut self, bus: &mut B, op: F)
    where
        B: Bus + ?Sized,
        F: FnOnce(&mut Self, u8) -> u8,
    {
        let a = self.a;
        self.a = op(self, a);
        self.add_cycles(bus, 1);
        self.last_cycle(bus);
    }

    /// RMB/SMB: zero page read-modify-write with one extra internal cycle.
    pub(crate) fn rmw_zp_bit<B, F>(&mut self, bus: &mut B, op: F)
    where
        B: Bus + ?Sized,
        F: FnOnce(u8) -> u8,
    {
        let addr = self.zp(bus);
        self.add_cycles(bus, 5);
        let value = self.rd_mem(bus, addr);
        self.add_cycles(bus, 1);
        let value = op(value);
        self.last_cycle(bus);
        self.wr_mem(bus, addr, value);
    }
}
