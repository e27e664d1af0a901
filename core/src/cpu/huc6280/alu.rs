use super::{C_FLAG, D_FLAG, HuC6280, N_FLAG, T_FLAG, V_FLAG, ZERO_PAGE, Z_FLAG, ZN_TABLE};
use crate::core::Bus;

impl HuC6280 {
    // ---- T flag ----

    /// Run an accumulator operation. With T set, the operation acts on the
    /// zero page byte at X instead of A: one cycle to read it, one to write
    /// it back plus a final cycle, and A comes out unchanged.
    fn with_t<B, F>(&mut self, bus: &mut B, op: F)
    where
        B: Bus + ?Sized,
        F: FnOnce(&mut Self, &mut B),
    {
        if self.p & T_FLAG == 0 {
            op(self, bus);
            return;
        }

        let saved = self.a;
        let target = ZERO_PAGE + u32::from(self.x);
        self.add_cycles(bus, 1);
        self.a = self.rd_mem(bus, target);
        op(self, bus);
        self.add_cycles(bus, 1);
        self.wr_mem(bus, target, self.a);
        self.last_cycle(bus);
        self.a = saved;
    }

    // ---- Logical ----

    pub(crate) fn and<B: Bus + ?Sized>(&mut self, bus: &mut B, operand: u8) {
        self.with_t(bus, |cpu, _| {
            cpu.a &= operand;
            cpu.set_zn(cpu.a);
        });
    }

    pub(crate) fn ora<B: Bus + ?Sized>(&mut self, bus: &mut B, operand: u8) {
        self.with_t(bus, |cpu, _| {
            cpu.a |= operand;
            cpu.set_zn(cpu.a);
        });
    }

    pub(crate) fn eor<B: Bus + ?Sized>(&mut self, bus: &mut B, operand: u8) {
        self.with_t(bus, |cpu, _| {
            cpu.a ^= operand;
            cpu.set_zn(cpu.a);
        });
    }

    // ---- Arithmetic ----

    /// ADC. Decimal mode corrects each nibble, leaves V alone and costs an
    /// extra final cycle.
    pub(crate) fn adc<B: Bus + ?Sized>(&mut self, bus: &mut B, operand: u8) {
        self.with_t(bus, |cpu, bus| cpu.add_with_carry(bus, operand));
    }

    fn add_with_carry<B: Bus + ?Sized>(&mut self, bus: &mut B, operand: u8) {
        let a = u32::from(self.a);
        let x = u32::from(operand);
        let carry = u32::from(self.p & C_FLAG);

        if self.p & D_FLAG != 0 {
            let mut sum = (a & 0x0F) + (x & 0x0F) + carry;
            if sum >= 0x0A {
                sum += 0x06;
            }
            sum += (a & 0xF0) + (x & 0xF0);
            if sum >= 0xA0 {
                sum += 0x60;
            }
            self.p &= !(Z_FLAG | N_FLAG | C_FLAG);
            if sum & 0xFF00 != 0 {
                self.p |= C_FLAG;
            }
            self.a = sum as u8;
            self.p |= ZN_TABLE[self.a as usize];
            self.last_cycle(bus);
        } else {
            let sum = a + x + carry;
            self.p &= !(Z_FLAG | C_FLAG | N_FLAG | V_FLAG);
            self.p |= (((((a ^ x) & 0x80) ^ 0x80) & ((a ^ sum) & 0x80)) >> 1) as u8;
            self.p |= ((sum >> 8) as u8) & C_FLAG;
            self.a = sum as u8;
            self.p |= ZN_TABLE[self.a as usize];
        }
    }

    /// SBC. Not affected by T.
    pub(crate) fn sbc<B: Bus + ?Sized>(&mut self, bus: &mut B, operand: u8) {
        let borrow = (self.p & C_FLAG) ^ C_FLAG;

        if self.p & D_FLAG != 0 {
            let lo = (self.a & 0x0F).wrapping_sub(operand & 0x0F).wrapping_sub(borrow);
            let hi = (self.a >> 4)
                .wrapping_sub(operand >> 4)
                .wrapping_sub((lo >> 4) & 1);
            let mut result = (hi << 4) | (lo & 0x0F);

            self.p &= !(Z_FLAG | N_FLAG | C_FLAG);
            if lo & 0x10 != 0 {
                result = result.wrapping_sub(0x06);
            }
            if hi & 0x10 != 0 {
                result = result.wrapping_sub(0x60);
            }
            self.a = result;
            self.p |= ((hi >> 4) & 1) ^ 1;
            self.p |= ZN_TABLE[self.a as usize];
            self.last_cycle(bus);
        } else {
            let a = u32::from(self.a);
            let x = u32::from(operand);
            let diff = a.wrapping_sub(x).wrapping_sub(u32::from(borrow));
            self.p &= !(Z_FLAG | C_FLAG | N_FLAG | V_FLAG);
            self.p |= (((a ^ diff) & (a ^ x) & 0x80) >> 1) as u8;
            self.p |= (((diff >> 8) as u8) & C_FLAG) ^ C_FLAG;
            self.a = diff as u8;
            self.p |= ZN_TABLE[self.a as usize];
        }
    }

    /// CMP/CPX/CPY: C set when no borrow.
    pub(crate) fn compare(&mut self, register: u8, operand: u8) {
        let diff = u32::from(register).wrapping_sub(u32::from(operand));
        self.set_zn(diff as u8);
        self.p = (self.p & !C_FLAG) | ((((diff >> 8) as u8) & C_FLAG) ^ C_FLAG);
    }

    // ---- Bit tests ----

    /// BIT: Z from A & M, N and V copied from M.
    pub(crate) fn bit(&mut self, operand: u8) {
        self.p &= !(Z_FLAG | V_FLAG | N_FLAG);
        self.p |= ZN_TABLE[(operand & self.a) as usize] & Z_FLAG;
        self.p |= operand & (V_FLAG | N_FLAG);
    }

    /// TST: Z from imm & M, N and V copied from M.
    pub(crate) fn tst(&mut self, mask: u8, operand: u8) {
        self.p &= !(Z_FLAG | V_FLAG | N_FLAG);
        if operand & mask == 0 {
            self.p |= Z_FLAG;
        }
        self.p |= operand & (V_FLAG | N_FLAG);
    }

    pub(crate) fn tsb(&mut self, operand: u8) -> u8 {
        self.p &= !(Z_FLAG | V_FLAG | N_FLAG);
        self.p |= ZN_TABLE[(operand | self.a) as usize] & Z_FLAG;
        self.p |= operand & (V_FLAG | N_FLAG);
        operand | self.a
    }

    pub(crate) fn trb(&mut self, operand: u8) -> u8 {
        self.p &= !(Z_FLAG | V_FLAG | N_FLAG);
        self.p |= ZN_TABLE[(operand & !self.a) as usize] & Z_FLAG;
        self.p |= operand & (V_FLAG | N_FLAG);
        operand & !self.a
    }

    // ---- Shifts and rotates ----

    pub(crate) fn asl(&mut self, operand: u8) -> u8 {
        let result = operand << 1;
        self.p = (self.p & !C_FLAG) | (operand >> 7);
        self.set_zn(result);
        result
    }

    pub(crate) fn lsr(&mut self, operand: u8) -> u8 {
        let result = operand >> 1;
        self.p = (self.p & !(C_FLAG | N_FLAG | Z_FLAG)) | (operand & 1);
        self.p |= ZN_TABLE[result as usize];
        result
    }

    pub(crate) fn rol(&mut self, operand: u8) -> u8 {
        let result = (operand << 1) | (self.p & C_FLAG);
        self.p = (self.p & !(Z_FLAG | N_FLAG | C_FLAG)) | (operand >> 7);
        self.p |= ZN_TABLE[result as usize];
        result
    }

    pub(crate) fn ror(&mut self, operand: u8) -> u8 {
        let result = (operand >> 1) | ((self.p & C_FLAG) << 7);
        self.p = (self.p & !(Z_FLAG | N_FLAG | C_FLAG)) | (operand & 1);
        self.p |= ZN_TABLE[result as usize];
        result
    }

    // ---- Increment / decrement ----

    pub(crate) fn inc(&mut self, operand: u8) -> u8 {
        let result = operand.wrapping_add(1);
        self.set_zn(result);
        result
    }

    pub(crate) fn dec(&mut self, operand: u8) -> u8 {
        let result = operand.wrapping_sub(1);
        self.set_zn(result);
        result
    }
}
