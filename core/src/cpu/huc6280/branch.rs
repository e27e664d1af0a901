use super::interrupt::VECTOR_IRQ2;
use super::{B_FLAG, D_FLAG, Flow, HuC6280, I_FLAG, T_FLAG};
use crate::core::Bus;

impl HuC6280 {
    /// Relative branch: 2 cycles not taken, 4 taken. `opcode_len` is the
    /// instruction length ahead of the displacement, for the trace hook.
    pub(crate) fn branch<const DEBUG: bool, B: Bus + ?Sized>(
        &mut self,
        bus: &mut B,
        taken: bool,
        opcode_len: u32,
    ) {
        if taken {
            let disp = self.fetch_operand(bus) as i8;
            self.add_cycles(bus, 3);
            let from = self.pc.wrapping_sub(opcode_len + 1);
            self.pc = self.pc.wrapping_add_signed(i32::from(disp));
            self.trace_branch::<DEBUG>(from, self.pc, 0);
        } else {
            self.add_cycles(bus, 1);
            self.pc = self.pc.wrapping_add(1);
        }
        self.last_cycle(bus);
    }

    /// BBRn/BBSn: zero page load then branch. 6 cycles, 8 taken.
    pub(crate) fn branch_on_bit<const DEBUG: bool, B: Bus + ?Sized>(
        &mut self,
        bus: &mut B,
        bit: u8,
        set: bool,
    ) {
        self.ld(bus, super::Operand::ZeroPage, |cpu, bus, value| {
            let taken = (value & (1 << bit) != 0) == set;
            cpu.branch::<DEBUG, B>(bus, taken, 2);
        });
    }

    /// BSR: push the address of the displacement byte, then branch.
    pub(crate) fn op_bsr<const DEBUG: bool, B: Bus + ?Sized>(&mut self, bus: &mut B) {
        self.push(bus, (self.pc >> 8) as u8);
        self.push(bus, self.pc as u8);
        self.add_cycles(bus, 4);
        self.branch::<DEBUG, B>(bus, true, 1);
    }

    pub(crate) fn op_jmp_abs<const DEBUG: bool, B: Bus + ?Sized>(&mut self, bus: &mut B) {
        let from = self.pc.wrapping_sub(1);
        self.pc = self.absolute(bus);
        self.add_cycles(bus, 3);
        self.last_cycle(bus);
        self.trace_branch::<DEBUG>(from, self.pc, 0);
    }

    /// JMP (abs) and JMP (abs,X). The pointer is not wrapped within a page.
    pub(crate) fn op_jmp_indirect<const DEBUG: bool, B: Bus + ?Sized>(
        &mut self,
        bus: &mut B,
        index: u8,
    ) {
        let from = self.pc.wrapping_sub(1);
        let ptr = self.abs_indexed(bus, index);
        let lo = self.rd_mem(bus, ptr);
        let hi = self.rd_mem(bus, ptr + 1);
        self.pc = u32::from(lo) | (u32::from(hi) << 8);
        self.add_cycles(bus, 6);
        self.last_cycle(bus);
        self.trace_branch::<DEBUG>(from, self.pc, 0);
    }

    /// JSR pushes the address of its last operand byte.
    pub(crate) fn op_jsr<const DEBUG: bool, B: Bus + ?Sized>(&mut self, bus: &mut B) {
        let from = self.pc.wrapping_sub(1);
        let lo = self.fetch_operand(bus);
        self.push(bus, (self.pc >> 8) as u8);
        self.push(bus, self.pc as u8);
        let hi = self.rd_op(bus, self.pc);
        self.pc = u32::from(lo) | (u32::from(hi) << 8);
        self.add_cycles(bus, 6);
        self.last_cycle(bus);
        self.trace_branch::<DEBUG>(from, self.pc, 0);
    }

    pub(crate) fn op_rts<const DEBUG: bool, B: Bus + ?Sized>(&mut self, bus: &mut B) {
        let from = self.pc.wrapping_sub(1);
        let lo = self.pop(bus);
        let hi = self.pop(bus);
        self.pc = (u32::from(lo) | (u32::from(hi) << 8)) + 1;
        self.add_cycles(bus, 6);
        self.last_cycle(bus);
        self.trace_branch::<DEBUG>(from, self.pc, 0);
    }

    /// RTI restores P (T included) then PC.
    pub(crate) fn op_rti<const DEBUG: bool, B: Bus + ?Sized>(&mut self, bus: &mut B) -> Flow {
        let from = self.pc.wrapping_sub(1);
        self.p = self.pop(bus);
        self.update_i_mask();
        let lo = self.pop(bus);
        let hi = self.pop(bus);
        self.pc = u32::from(lo) | (u32::from(hi) << 8);
        self.add_cycles(bus, 6);
        self.last_cycle(bus);
        self.trace_branch::<DEBUG>(from, self.pc, 0);
        Flow::KeepT
    }

    /// BRK: skips the signature byte and vectors through IRQ2's vector.
    pub(crate) fn op_brk<const DEBUG: bool, B: Bus + ?Sized>(&mut self, bus: &mut B) {
        let from = self.pc.wrapping_sub(1);
        self.pc = self.pc.wrapping_add(1);
        self.push(bus, (self.pc >> 8) as u8);
        self.push(bus, self.pc as u8);
        self.push(bus, self.p | B_FLAG);
        self.p |= I_FLAG;
        self.update_i_mask();
        self.p &= !(T_FLAG | D_FLAG);
        let lo = self.rd_mem(bus, u32::from(VECTOR_IRQ2));
        let hi = self.rd_mem(bus, u32::from(VECTOR_IRQ2) + 1);
        self.pc = u32::from(lo) | (u32::from(hi) << 8);
        self.add_cycles(bus, 7);
        self.last_cycle(bus);
        self.trace_branch::<DEBUG>(from, self.pc, VECTOR_IRQ2);
    }
}
