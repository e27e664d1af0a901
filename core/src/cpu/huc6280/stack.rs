use super::{B_FLAG, Flow, HuC6280, STACK_PAGE};
use crate::core::Bus;

impl HuC6280 {
    #[inline]
    pub(crate) fn push<B: Bus + ?Sized>(&mut self, bus: &mut B, value: u8) {
        self.wr_mem(bus, STACK_PAGE | u32::from(self.s), value);
        self.s = self.s.wrapping_sub(1);
    }

    #[inline]
    pub(crate) fn pop<B: Bus + ?Sized>(&mut self, bus: &mut B) -> u8 {
        self.s = self.s.wrapping_add(1);
        self.rd_mem(bus, STACK_PAGE | u32::from(self.s))
    }

    /// PHA/PHX/PHY: 3 cycles.
    pub(crate) fn op_push<B: Bus + ?Sized>(&mut self, bus: &mut B, value: u8) {
        self.push(bus, value);
        self.add_cycles(bus, 2);
        self.last_cycle(bus);
    }

    /// PHP pushes P with B set.
    pub(crate) fn op_php<B: Bus + ?Sized>(&mut self, bus: &mut B) {
        self.op_push(bus, self.p | B_FLAG);
    }

    /// PLA/PLX/PLY: 4 cycles, N and Z from the pulled value.
    pub(crate) fn op_pull<B: Bus + ?Sized>(&mut self, bus: &mut B) -> u8 {
        self.add_cycles(bus, 3);
        let value = self.pop(bus);
        self.set_zn(value);
        self.last_cycle(bus);
        value
    }

    /// PLP restores P wholesale, T included.
    pub(crate) fn op_plp<B: Bus + ?Sized>(&mut self, bus: &mut B) -> Flow {
        self.p = self.pop(bus);
        self.update_i_mask();
        self.add_cycles(bus, 3);
        self.last_cycle(bus);
        Flow::KeepT
    }
}
