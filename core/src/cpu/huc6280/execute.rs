use super::{
    BlockKind, C_FLAG, D_FLAG, Flow, HuC6280, I_FLAG, IO_PAGE, N_FLAG, Operand, T_FLAG, V_FLAG,
    Z_FLAG,
};
use crate::core::Bus;
use crate::core::bus::PHYSICAL_FLAG;

/// VDC register offsets on page 0xFF written by ST0, ST1 and ST2.
const ST_PORTS: [u32; 3] = [0, 2, 3];

impl HuC6280 {
    /// Decode and execute one opcode (PC already past it).
    pub(crate) fn execute<const DEBUG: bool, B: Bus + ?Sized>(
        &mut self,
        bus: &mut B,
        opcode: u8,
    ) -> Flow {
        use Operand::*;

        match opcode {
            // --- Loads ---
            0xA9 => self.ld(bus, Immediate, |cpu, _, v| cpu.lda(v)),
            0xA5 => self.ld(bus, ZeroPage, |cpu, _, v| cpu.lda(v)),
            0xB5 => self.ld(bus, ZeroPageX, |cpu, _, v| cpu.lda(v)),
            0xAD => self.ld(bus, Absolute, |cpu, _, v| cpu.lda(v)),
            0xBD => self.ld(bus, AbsoluteX, |cpu, _, v| cpu.lda(v)),
            0xB9 => self.ld(bus, AbsoluteY, |cpu, _, v| cpu.lda(v)),
            0xB2 => self.ld(bus, Indirect, |cpu, _, v| cpu.lda(v)),
            0xA1 => self.ld(bus, IndexedIndirect, |cpu, _, v| cpu.lda(v)),
            0xB1 => self.ld(bus, IndirectIndexed, |cpu, _, v| cpu.lda(v)),

            0xA2 => self.ld(bus, Immediate, |cpu, _, v| cpu.ldx(v)),
            0xA6 => self.ld(bus, ZeroPage, |cpu, _, v| cpu.ldx(v)),
            0xB6 => self.ld(bus, ZeroPageY, |cpu, _, v| cpu.ldx(v)),
            0xAE => self.ld(bus, Absolute, |cpu, _, v| cpu.ldx(v)),
            0xBE => self.ld(bus, AbsoluteY, |cpu, _, v| cpu.ldx(v)),

            0xA0 => self.ld(bus, Immediate, |cpu, _, v| cpu.ldy(v)),
            0xA4 => self.ld(bus, ZeroPage, |cpu, _, v| cpu.ldy(v)),
            0xB4 => self.ld(bus, ZeroPageX, |cpu, _, v| cpu.ldy(v)),
            0xAC => self.ld(bus, Absolute, |cpu, _, v| cpu.ldy(v)),
            0xBC => self.ld(bus, AbsoluteX, |cpu, _, v| cpu.ldy(v)),

            // --- Stores ---
            0x85 => self.st(bus, ZeroPage, self.a),
            0x95 => self.st(bus, ZeroPageX, self.a),
            0x8D => self.st(bus, Absolute, self.a),
            0x9D => self.st(bus, AbsoluteX, self.a),
            0x99 => self.st(bus, AbsoluteY, self.a),
            0x92 => self.st(bus, Indirect, self.a),
            0x81 => self.st(bus, IndexedIndirect, self.a),
            0x91 => self.st(bus, IndirectIndexed, self.a),

            0x86 => self.st(bus, ZeroPage, self.x),
            0x96 => self.st(bus, ZeroPageY, self.x),
            0x8E => self.st(bus, Absolute, self.x),

            0x84 => self.st(bus, ZeroPage, self.y),
            0x94 => self.st(bus, ZeroPageX, self.y),
            0x8C => self.st(bus, Absolute, self.y),

            0x64 => self.st(bus, ZeroPage, 0),
            0x74 => self.st(bus, ZeroPageX, 0),
            0x9C => self.st(bus, Absolute, 0),
            0x9E => self.st(bus, AbsoluteX, 0),

            // --- Logical (T-aware) ---
            0x29 => self.ld(bus, Immediate, |cpu, bus, v| cpu.and(bus, v)),
            0x25 => self.ld(bus, ZeroPage, |cpu, bus, v| cpu.and(bus, v)),
            0x35 => self.ld(bus, ZeroPageX, |cpu, bus, v| cpu.and(bus, v)),
            0x2D => self.ld(bus, Absolute, |cpu, bus, v| cpu.and(bus, v)),
            0x3D => self.ld(bus, AbsoluteX, |cpu, bus, v| cpu.and(bus, v)),
            0x39 => self.ld(bus, AbsoluteY, |cpu, bus, v| cpu.and(bus, v)),
            0x32 => self.ld(bus, Indirect, |cpu, bus, v| cpu.and(bus, v)),
            0x21 => self.ld(bus, IndexedIndirect, |cpu, bus, v| cpu.and(bus, v)),
            0x31 => self.ld(bus, IndirectIndexed, |cpu, bus, v| cpu.and(bus, v)),

            0x09 => self.ld(bus, Immediate, |cpu, bus, v| cpu.ora(bus, v)),
            0x05 => self.ld(bus, ZeroPage, |cpu, bus, v| cpu.ora(bus, v)),
            0x15 => self.ld(bus, ZeroPageX, |cpu, bus, v| cpu.ora(bus, v)),
            0x0D => self.ld(bus, Absolute, |cpu, bus, v| cpu.ora(bus, v)),
            0x1D => self.ld(bus, AbsoluteX, |cpu, bus, v| cpu.ora(bus, v)),
            0x19 => self.ld(bus, AbsoluteY, |cpu, bus, v| cpu.ora(bus, v)),
            0x12 => self.ld(bus, Indirect, |cpu, bus, v| cpu.ora(bus, v)),
            0x01 => self.ld(bus, IndexedIndirect, |cpu, bus, v| cpu.ora(bus, v)),
            0x11 => self.ld(bus, IndirectIndexed, |cpu, bus, v| cpu.ora(bus, v)),

            0x49 => self.ld(bus, Immediate, |cpu, bus, v| cpu.eor(bus, v)),
            0x45 => self.ld(bus, ZeroPage, |cpu, bus, v| cpu.eor(bus, v)),
            0x55 => self.ld(bus, ZeroPageX, |cpu, bus, v| cpu.eor(bus, v)),
            0x4D => self.ld(bus, Absolute, |cpu, bus, v| cpu.eor(bus, v)),
            0x5D => self.ld(bus, AbsoluteX, |cpu, bus, v| cpu.eor(bus, v)),
            0x59 => self.ld(bus, AbsoluteY, |cpu, bus, v| cpu.eor(bus, v)),
            0x52 => self.ld(bus, Indirect, |cpu, bus, v| cpu.eor(bus, v)),
            0x41 => self.ld(bus, IndexedIndirect, |cpu, bus, v| cpu.eor(bus, v)),
            0x51 => self.ld(bus, IndirectIndexed, |cpu, bus, v| cpu.eor(bus, v)),

            // --- Arithmetic ---
            0x69 => self.ld(bus, Immediate, |cpu, bus, v| cpu.adc(bus, v)),
            0x65 => self.ld(bus, ZeroPage, |cpu, bus, v| cpu.adc(bus, v)),
            0x75 => self.ld(bus, ZeroPageX, |cpu, bus, v| cpu.adc(bus, v)),
            0x6D => self.ld(bus, Absolute, |cpu, bus, v| cpu.adc(bus, v)),
            0x7D => self.ld(bus, AbsoluteX, |cpu, bus, v| cpu.adc(bus, v)),
            0x79 => self.ld(bus, AbsoluteY, |cpu, bus, v| cpu.adc(bus, v)),
            0x72 => self.ld(bus, Indirect, |cpu, bus, v| cpu.adc(bus, v)),
            0x61 => self.ld(bus, IndexedIndirect, |cpu, bus, v| cpu.adc(bus, v)),
            0x71 => self.ld(bus, IndirectIndexed, |cpu, bus, v| cpu.adc(bus, v)),

            0xE9 => self.ld(bus, Immediate, |cpu, bus, v| cpu.sbc(bus, v)),
            0xE5 => self.ld(bus, ZeroPage, |cpu, bus, v| cpu.sbc(bus, v)),
            0xF5 => self.ld(bus, ZeroPageX, |cpu, bus, v| cpu.sbc(bus, v)),
            0xED => self.ld(bus, Absolute, |cpu, bus, v| cpu.sbc(bus, v)),
            0xFD => self.ld(bus, AbsoluteX, |cpu, bus, v| cpu.sbc(bus, v)),
            0xF9 => self.ld(bus, AbsoluteY, |cpu, bus, v| cpu.sbc(bus, v)),
            0xF2 => self.ld(bus, Indirect, |cpu, bus, v| cpu.sbc(bus, v)),
            0xE1 => self.ld(bus, IndexedIndirect, |cpu, bus, v| cpu.sbc(bus, v)),
            0xF1 => self.ld(bus, IndirectIndexed, |cpu, bus, v| cpu.sbc(bus, v)),

            // --- Compares ---
            0xC9 => self.ld(bus, Immediate, |cpu, _, v| cpu.compare(cpu.a, v)),
            0xC5 => self.ld(bus, ZeroPage, |cpu, _, v| cpu.compare(cpu.a, v)),
            0xD5 => self.ld(bus, ZeroPageX, |cpu, _, v| cpu.compare(cpu.a, v)),
            0xCD => self.ld(bus, Absolute, |cpu, _, v| cpu.compare(cpu.a, v)),
            0xDD => self.ld(bus, AbsoluteX, |cpu, _, v| cpu.compare(cpu.a, v)),
            0xD9 => self.ld(bus, AbsoluteY, |cpu, _, v| cpu.compare(cpu.a, v)),
            0xD2 => self.ld(bus, Indirect, |cpu, _, v| cpu.compare(cpu.a, v)),
            0xC1 => self.ld(bus, IndexedIndirect, |cpu, _, v| cpu.compare(cpu.a, v)),
            0xD1 => self.ld(bus, IndirectIndexed, |cpu, _, v| cpu.compare(cpu.a, v)),

            0xE0 => self.ld(bus, Immediate, |cpu, _, v| cpu.compare(cpu.x, v)),
            0xE4 => self.ld(bus, ZeroPage, |cpu, _, v| cpu.compare(cpu.x, v)),
            0xEC => self.ld(bus, Absolute, |cpu, _, v| cpu.compare(cpu.x, v)),

            0xC0 => self.ld(bus, Immediate, |cpu, _, v| cpu.compare(cpu.y, v)),
            0xC4 => self.ld(bus, ZeroPage, |cpu, _, v| cpu.compare(cpu.y, v)),
            0xCC => self.ld(bus, Absolute, |cpu, _, v| cpu.compare(cpu.y, v)),

            // --- Bit tests ---
            0x89 => self.ld(bus, Immediate, |cpu, _, v| cpu.bit(v)),
            0x24 => self.ld(bus, ZeroPage, |cpu, _, v| cpu.bit(v)),
            0x34 => self.ld(bus, ZeroPageX, |cpu, _, v| cpu.bit(v)),
            0x2C => self.ld(bus, Absolute, |cpu, _, v| cpu.bit(v)),
            0x3C => self.ld(bus, AbsoluteX, |cpu, _, v| cpu.bit(v)),

            0x83 => self.op_tst(bus, ZeroPage),
            0xA3 => self.op_tst(bus, ZeroPageX),
            0x93 => self.op_tst(bus, Absolute),
            0xB3 => self.op_tst(bus, AbsoluteX),

            0x04 => self.rmw(bus, ZeroPage, |cpu, v| cpu.tsb(v)),
            0x0C => self.rmw(bus, Absolute, |cpu, v| cpu.tsb(v)),
            0x14 => self.rmw(bus, ZeroPage, |cpu, v| cpu.trb(v)),
            0x1C => self.rmw(bus, Absolute, |cpu, v| cpu.trb(v)),

            // RMB0-7 / SMB0-7
            0x07 | 0x17 | 0x27 | 0x37 | 0x47 | 0x57 | 0x67 | 0x77 => {
                let mask = 1u8 << (opcode >> 4);
                self.rmw_zp_bit(bus, |v| v & !mask);
            }
            0x87 | 0x97 | 0xA7 | 0xB7 | 0xC7 | 0xD7 | 0xE7 | 0xF7 => {
                let mask = 1u8 << ((opcode >> 4) & 7);
                self.rmw_zp_bit(bus, |v| v | mask);
            }

            // --- Shifts and rotates ---
            0x0A => self.rmw_a(bus, |cpu, v| cpu.asl(v)),
            0x06 => self.rmw(bus, ZeroPage, |cpu, v| cpu.asl(v)),
            0x16 => self.rmw(bus, ZeroPageX, |cpu, v| cpu.asl(v)),
            0x0E => self.rmw(bus, Absolute, |cpu, v| cpu.asl(v)),
            0x1E => self.rmw(bus, AbsoluteX, |cpu, v| cpu.asl(v)),

            0x4A => self.rmw_a(bus, |cpu, v| cpu.lsr(v)),
            0x46 => self.rmw(bus, ZeroPage, |cpu, v| cpu.lsr(v)),
            0x56 => self.rmw(bus, ZeroPageX, |cpu, v| cpu.lsr(v)),
            0x4E => self.rmw(bus, Absolute, |cpu, v| cpu.lsr(v)),
            0x5E => self.rmw(bus, AbsoluteX, |cpu, v| cpu.lsr(v)),

            0x2A => self.rmw_a(bus, |cpu, v| cpu.rol(v)),
            0x26 => self.rmw(bus, ZeroPage, |cpu, v| cpu.rol(v)),
            0x36 => self.rmw(bus, ZeroPageX, |cpu, v| cpu.rol(v)),
            0x2E => self.rmw(bus, Absolute, |cpu, v| cpu.rol(v)),
            0x3E => self.rmw(bus, AbsoluteX, |cpu, v| cpu.rol(v)),

            0x6A => self.rmw_a(bus, |cpu, v| cpu.ror(v)),
            0x66 => self.rmw(bus, ZeroPage, |cpu, v| cpu.ror(v)),
            0x76 => self.rmw(bus, ZeroPageX, |cpu, v| cpu.ror(v)),
            0x6E => self.rmw(bus, Absolute, |cpu, v| cpu.ror(v)),
            0x7E => self.rmw(bus, AbsoluteX, |cpu, v| cpu.ror(v)),

            // --- Increment / decrement ---
            0x1A => self.rmw_a(bus, |cpu, v| cpu.inc(v)),
            0xE6 => self.rmw(bus, ZeroPage, |cpu, v| cpu.inc(v)),
            0xF6 => self.rmw(bus, ZeroPageX, |cpu, v| cpu.inc(v)),
            0xEE => self.rmw(bus, Absolute, |cpu, v| cpu.inc(v)),
            0xFE => self.rmw(bus, AbsoluteX, |cpu, v| cpu.inc(v)),

            0x3A => self.rmw_a(bus, |cpu, v| cpu.dec(v)),
            0xC6 => self.rmw(bus, ZeroPage, |cpu, v| cpu.dec(v)),
            0xD6 => self.rmw(bus, ZeroPageX, |cpu, v| cpu.dec(v)),
            0xCE => self.rmw(bus, Absolute, |cpu, v| cpu.dec(v)),
            0xDE => self.rmw(bus, AbsoluteX, |cpu, v| cpu.dec(v)),

            0xE8 => {
                self.x = self.inc(self.x);
                self.implied(bus);
            }
            0xC8 => {
                self.y = self.inc(self.y);
                self.implied(bus);
            }
            0xCA => {
                self.x = self.dec(self.x);
                self.implied(bus);
            }
            0x88 => {
                self.y = self.dec(self.y);
                self.implied(bus);
            }

            // --- Register transfers ---
            0xAA => {
                self.x = self.a;
                self.set_zn(self.x);
                self.implied(bus);
            }
            0xA8 => {
                self.y = self.a;
                self.set_zn(self.y);
                self.implied(bus);
            }
            0x8A => {
                self.a = self.x;
                self.set_zn(self.a);
                self.implied(bus);
            }
            0x98 => {
                self.a = self.y;
                self.set_zn(self.a);
                self.implied(bus);
            }
            0xBA => {
                self.x = self.s;
                self.set_zn(self.x);
                self.implied(bus);
            }
            0x9A => {
                self.s = self.x;
                self.implied(bus);
            }

            // SAX / SAY / SXY
            0x22 => {
                std::mem::swap(&mut self.a, &mut self.x);
                self.exchange(bus);
            }
            0x42 => {
                std::mem::swap(&mut self.a, &mut self.y);
                self.exchange(bus);
            }
            0x02 => {
                std::mem::swap(&mut self.x, &mut self.y);
                self.exchange(bus);
            }

            // CLA / CLX / CLY
            0x62 => {
                self.a = 0;
                self.implied(bus);
            }
            0x82 => {
                self.x = 0;
                self.implied(bus);
            }
            0xC2 => {
                self.y = 0;
                self.implied(bus);
            }

            // --- Flags ---
            0x18 => self.flag_op(bus, C_FLAG, false),
            0x38 => self.flag_op(bus, C_FLAG, true),
            0xD8 => self.flag_op(bus, D_FLAG, false),
            0xF8 => self.flag_op(bus, D_FLAG, true),
            0xB8 => self.flag_op(bus, V_FLAG, false),
            0x58 => self.flag_op(bus, I_FLAG, false),
            0x78 => self.flag_op(bus, I_FLAG, true),
            0xF4 => {
                self.p |= T_FLAG;
                self.implied(bus);
                return Flow::KeepT;
            }

            // --- Stack ---
            0x48 => self.op_push(bus, self.a),
            0xDA => self.op_push(bus, self.x),
            0x5A => self.op_push(bus, self.y),
            0x08 => self.op_php(bus),
            0x68 => self.a = self.op_pull(bus),
            0xFA => self.x = self.op_pull(bus),
            0x7A => self.y = self.op_pull(bus),
            0x28 => return self.op_plp(bus),

            // --- Branches ---
            0x10 => self.branch::<DEBUG, B>(bus, self.p & N_FLAG == 0, 1),
            0x30 => self.branch::<DEBUG, B>(bus, self.p & N_FLAG != 0, 1),
            0x50 => self.branch::<DEBUG, B>(bus, self.p & V_FLAG == 0, 1),
            0x70 => self.branch::<DEBUG, B>(bus, self.p & V_FLAG != 0, 1),
            0x90 => self.branch::<DEBUG, B>(bus, self.p & C_FLAG == 0, 1),
            0xB0 => self.branch::<DEBUG, B>(bus, self.p & C_FLAG != 0, 1),
            0xD0 => self.branch::<DEBUG, B>(bus, self.p & Z_FLAG == 0, 1),
            0xF0 => self.branch::<DEBUG, B>(bus, self.p & Z_FLAG != 0, 1),
            0x80 => self.branch::<DEBUG, B>(bus, true, 1),

            // BBR0-7 / BBS0-7
            0x0F | 0x1F | 0x2F | 0x3F | 0x4F | 0x5F | 0x6F | 0x7F => {
                self.branch_on_bit::<DEBUG, B>(bus, opcode >> 4, false)
            }
            0x8F | 0x9F | 0xAF | 0xBF | 0xCF | 0xDF | 0xEF | 0xFF => {
                self.branch_on_bit::<DEBUG, B>(bus, (opcode >> 4) & 7, true)
            }

            // --- Jumps and subroutines ---
            0x4C => self.op_jmp_abs::<DEBUG, B>(bus),
            0x6C => self.op_jmp_indirect::<DEBUG, B>(bus, 0),
            0x7C => self.op_jmp_indirect::<DEBUG, B>(bus, self.x),
            0x20 => self.op_jsr::<DEBUG, B>(bus),
            0x44 => self.op_bsr::<DEBUG, B>(bus),
            0x60 => self.op_rts::<DEBUG, B>(bus),
            0x40 => return self.op_rti::<DEBUG, B>(bus),
            0x00 => self.op_brk::<DEBUG, B>(bus),

            // --- MMU and speed ---
            0x53 => self.op_tam(bus),
            0x43 => self.op_tma(bus),
            0x54 => self.op_change_speed(bus, 0),
            0xD4 => self.op_change_speed(bus, 1),

            // ST0 / ST1 / ST2
            0x03 => self.op_store_port(bus, ST_PORTS[0]),
            0x13 => self.op_store_port(bus, ST_PORTS[1]),
            0x23 => self.op_store_port(bus, ST_PORTS[2]),

            // --- Block transfers ---
            0x73 => return self.op_block_transfer(bus, BlockKind::Tii),
            0xC3 => return self.op_block_transfer(bus, BlockKind::Tdd),
            0xD3 => return self.op_block_transfer(bus, BlockKind::Tin),
            0xE3 => return self.op_block_transfer(bus, BlockKind::Tia),
            0xF3 => return self.op_block_transfer(bus, BlockKind::Tai),

            0xCB if self.config().emulate_wai => self.op_wai(bus),

            // NOP and every undefined opcode
            _ => self.implied(bus),
        }

        Flow::Next
    }

    /// Single-byte instruction: 2 cycles.
    #[inline]
    fn implied<B: Bus + ?Sized>(&mut self, bus: &mut B) {
        self.add_cycles(bus, 1);
        self.last_cycle(bus);
    }

    fn exchange<B: Bus + ?Sized>(&mut self, bus: &mut B) {
        self.add_cycles(bus, 2);
        self.last_cycle(bus);
    }

    /// Flag set/clear. The interrupt sample is taken before the flag
    /// changes, so CLI/SEI act one instruction late.
    fn flag_op<B: Bus + ?Sized>(&mut self, bus: &mut B, flag: u8, set: bool) {
        self.implied(bus);
        if set {
            self.p |= flag;
        } else {
            self.p &= !flag;
        }
        if flag == I_FLAG {
            self.update_i_mask();
        }
    }

    fn op_tst<B: Bus + ?Sized>(&mut self, bus: &mut B, operand: Operand) {
        let mask = self.fetch_operand(bus);
        self.add_cycles(bus, 3);
        self.ld(bus, operand, |cpu, _, v| cpu.tst(mask, v));
    }

    /// TAM: copy A into every page register selected by the mask.
    fn op_tam<B: Bus + ?Sized>(&mut self, bus: &mut B) {
        let select = self.fetch_operand(bus);
        for bank in 0..8 {
            if select & (1 << bank) != 0 {
                self.write_mpr(bank, self.a);
            }
        }
        self.write_mpr(8, self.mpr[0]);
        self.add_cycles(bus, 4);
        self.last_cycle(bus);
    }

    /// TMA: load A from the selected page registers; the highest wins.
    fn op_tma<B: Bus + ?Sized>(&mut self, bus: &mut B) {
        let select = self.fetch_operand(bus);
        for bank in 0..8 {
            if select & (1 << bank) != 0 {
                self.a = self.mpr[bank];
            }
        }
        self.add_cycles(bus, 3);
        self.last_cycle(bus);
    }

    /// CSL/CSH: two cycles at the old speed, the final one at the new.
    fn op_change_speed<B: Bus + ?Sized>(&mut self, bus: &mut B, speed: u8) {
        self.add_cycles(bus, 2);
        self.set_speed(speed);
        self.last_cycle(bus);
    }

    /// ST0/ST1/ST2: immediate store straight to the VDC port on page 0xFF,
    /// bypassing the page registers.
    fn op_store_port<B: Bus + ?Sized>(&mut self, bus: &mut B, offset: u32) {
        let value = self.fetch_operand(bus);
        self.add_cycles(bus, 3);
        self.last_cycle(bus);
        bus.write_physical(self.master, PHYSICAL_FLAG | IO_PAGE | offset, value);
    }

    /// WAI: re-executes itself until an interrupt line is pending.
    fn op_wai<B: Bus + ?Sized>(&mut self, bus: &mut B) {
        self.implied(bus);
        if self.irq.pending() == 0 {
            self.sleeping = true;
            self.pc = self.pc.wrapping_sub(1);
        } else {
            self.sleeping = false;
        }
    }

    fn lda(&mut self, value: u8) {
        self.a = value;
        self.set_zn(value);
    }

    fn ldx(&mut self, value: u8) {
        self.x = value;
        self.set_zn(value);
    }

    fn ldy(&mut self, value: u8) {
        self.y = value;
        self.set_zn(value);
    }
}
