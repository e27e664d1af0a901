//! Opcode metadata: mnemonic, operand layout and base cycle count for all
//! 256 opcodes.
//!
//! `cycles` is the cost with T clear, binary mode, branches not taken and
//! block transfers excluding their 6 cycles per byte. Decimal ADC/SBC add 1;
//! T-mode AND/ORA/EOR/ADC add 3; taken branches add 2.

/// Operand layout following the opcode byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AddressingMode {
    Implied,
    Accumulator,
    Immediate,
    ZeroPage,
    ZeroPageX,
    ZeroPageY,
    Absolute,
    AbsoluteX,
    AbsoluteY,
    /// (zp)
    ZeroPageIndirect,
    /// (zp,X)
    IndexedIndirect,
    /// (zp),Y
    IndirectIndexed,
    /// (abs)
    AbsoluteIndirect,
    /// (abs,X)
    AbsoluteIndexedIndirect,
    Relative,
    /// BBR/BBS: zero page, then displacement
    ZeroPageRelative,
    /// TST #imm, zp
    ImmediateZeroPage,
    ImmediateZeroPageX,
    ImmediateAbsolute,
    ImmediateAbsoluteX,
    /// Source, destination, length
    BlockTransfer,
}

impl AddressingMode {
    /// Operand bytes after the opcode.
    pub const fn operand_len(self) -> u16 {
        match self {
            AddressingMode::Implied | AddressingMode::Accumulator => 0,
            AddressingMode::Immediate
            | AddressingMode::ZeroPage
            | AddressingMode::ZeroPageX
            | AddressingMode::ZeroPageY
            | AddressingMode::ZeroPageIndirect
            | AddressingMode::IndexedIndirect
            | AddressingMode::IndirectIndexed
            | AddressingMode::Relative => 1,
            AddressingMode::Absolute
            | AddressingMode::AbsoluteX
            | AddressingMode::AbsoluteY
            | AddressingMode::AbsoluteIndirect
            | AddressingMode::AbsoluteIndexedIndirect
            | AddressingMode::ZeroPageRelative
            | AddressingMode::ImmediateZeroPage
            | AddressingMode::ImmediateZeroPageX => 2,
            AddressingMode::ImmediateAbsolute | AddressingMode::ImmediateAbsoluteX => 3,
            AddressingMode::BlockTransfer => 6,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OpcodeInfo {
    pub mnemonic: &'static str,
    pub mode: AddressingMode,
    pub cycles: u8,
}

impl OpcodeInfo {
    /// Instruction length in bytes.
    pub const fn len(&self) -> u16 {
        1 + self.mode.operand_len()
    }

    /// Opcodes with no defined behavior (executed as 2-cycle NOPs).
    pub fn is_undefined(&self) -> bool {
        self.mnemonic == "???"
    }
}

const fn op(mnemonic: &'static str, mode: AddressingMode, cycles: u8) -> OpcodeInfo {
    OpcodeInfo {
        mnemonic,
        mode,
        cycles,
    }
}

use AddressingMode::{
    Absolute as ABS, AbsoluteIndexedIndirect as AIX, AbsoluteIndirect as AIN, AbsoluteX as ABX,
    AbsoluteY as ABY, Accumulator as ACC, BlockTransfer as BLK, Immediate as IMM,
    ImmediateAbsolute as IAB, ImmediateAbsoluteX as IAX, ImmediateZeroPage as IZP,
    ImmediateZeroPageX as IZX, Implied as IMP, IndexedIndirect as INX, IndirectIndexed as INY,
    Relative as REL, ZeroPage as ZP, ZeroPageIndirect as ZPI, ZeroPageRelative as ZPR,
    ZeroPageX as ZPX, ZeroPageY as ZPY,
};

const UNDEFINED: OpcodeInfo = op("???", IMP, 2);

#[rustfmt::skip]
pub static OPCODE_TABLE: [OpcodeInfo; 256] = [
    // 0x00
    op("BRK", IMP, 8), op("ORA", INX, 7), op("SXY", IMP, 3), op("ST0", IMM, 4),
    op("TSB", ZP, 6),  op("ORA", ZP, 4),  op("ASL", ZP, 6),  op("RMB0", ZP, 7),
    op("PHP", IMP, 3), op("ORA", IMM, 2), op("ASL", ACC, 2), UNDEFINED,
    op("TSB", ABS, 7), op("ORA", ABS, 5), op("ASL", ABS, 7), op("BBR0", ZPR, 6),
    // 0x10
    op("BPL", REL, 2), op("ORA", INY, 7), op("ORA", ZPI, 7), op("ST1", IMM, 4),
    op("TRB", ZP, 6),  op("ORA", ZPX, 4), op("ASL", ZPX, 6), op("RMB1", ZP, 7),
    op("CLC", IMP, 2), op("ORA", ABY, 5), op("INC", ACC, 2), UNDEFINED,
    op("TRB", ABS, 7), op("ORA", ABX, 5), op("ASL", ABX, 7), op("BBR1", ZPR, 6),
    // 0x20
    op("JSR", ABS, 7), op("AND", INX, 7), op("SAX", IMP, 3), op("ST2", IMM, 4),
    op("BIT", ZP, 4),  op("AND", ZP, 4),  op("ROL", ZP, 6),  op("RMB2", ZP, 7),
    op("PLP", IMP, 4), op("AND", IMM, 2), op("ROL", ACC, 2), UNDEFINED,
    op("BIT", ABS, 5), op("AND", ABS, 5), op("ROL", ABS, 7), op("BBR2", ZPR, 6),
    // 0x30
    op("BMI", REL, 2), op("AND", INY, 7), op("AND", ZPI, 7), UNDEFINED,
    op("BIT", ZPX, 4), op("AND", ZPX, 4), op("ROL", ZPX, 6), op("RMB3", ZP, 7),
    op("SEC", IMP, 2), op("AND", ABY, 5), op("DEC", ACC, 2), UNDEFINED,
    op("BIT", ABX, 5), op("AND", ABX, 5), op("ROL", ABX, 7), op("BBR3", ZPR, 6),
    // 0x40
    op("RTI", IMP, 7), op("EOR", INX, 7), op("SAY", IMP, 3), op("TMA", IMM, 4),
    op("BSR", REL, 8), op("EOR", ZP, 4),  op("LSR", ZP, 6),  op("RMB4", ZP, 7),
    op("PHA", IMP, 3), op("EOR", IMM, 2), op("LSR", ACC, 2), UNDEFINED,
    op("JMP", ABS, 4), op("EOR", ABS, 5), op("LSR", ABS, 7), op("BBR4", ZPR, 6),
    // 0x50
    op("BVC", REL, 2), op("EOR", INY, 7), op("EOR", ZPI, 7), op("TAM", IMM, 5),
    op("CSL", IMP, 3), op("EOR", ZPX, 4), op("LSR", ZPX, 6), op("RMB5", ZP, 7),
    op("CLI", IMP, 2), op("EOR", ABY, 5), op("PHY", IMP, 3), UNDEFINED,
    UNDEFINED,         op("EOR", ABX, 5), op("LSR", ABX, 7), op("BBR5", ZPR, 6),
    // 0x60
    op("RTS", IMP, 7), op("ADC", INX, 7), op("CLA", IMP, 2), UNDEFINED,
    op("STZ", ZP, 4),  op("ADC", ZP, 4),  op("ROR", ZP, 6),  op("RMB6", ZP, 7),
    op("PLA", IMP, 4), op("ADC", IMM, 2), op("ROR", ACC, 2), UNDEFINED,
    op("JMP", AIN, 7), op("ADC", ABS, 5), op("ROR", ABS, 7), op("BBR6", ZPR, 6),
    // 0x70
    op("BVS", REL, 2), op("ADC", INY, 7), op("ADC", ZPI, 7), op("TII", BLK, 17),
    op("STZ", ZPX, 4), op("ADC", ZPX, 4), op("ROR", ZPX, 6), op("RMB7", ZP, 7),
    op("SEI", IMP, 2), op("ADC", ABY, 5), op("PLY", IMP, 4), UNDEFINED,
    op("JMP", AIX, 7), op("ADC", ABX, 5), op("ROR", ABX, 7), op("BBR7", ZPR, 6),
    // 0x80
    op("BRA", REL, 4), op("STA", INX, 7), op("CLX", IMP, 2), op("TST", IZP, 7),
    op("STY", ZP, 4),  op("STA", ZP, 4),  op("STX", ZP, 4),  op("SMB0", ZP, 7),
    op("DEY", IMP, 2), op("BIT", IMM, 2), op("TXA", IMP, 2), UNDEFINED,
    op("STY", ABS, 5), op("STA", ABS, 5), op("STX", ABS, 5), op("BBS0", ZPR, 6),
    // 0x90
    op("BCC", REL, 2), op("STA", INY, 7), op("STA", ZPI, 7), op("TST", IAB, 8),
    op("STY", ZPX, 4), op("STA", ZPX, 4), op("STX", ZPY, 4), op("SMB1", ZP, 7),
    op("TYA", IMP, 2), op("STA", ABY, 5), op("TXS", IMP, 2), UNDEFINED,
    op("STZ", ABS, 5), op("STA", ABX, 5), op("STZ", ABX, 5), op("BBS1", ZPR, 6),
    // 0xA0
    op("LDY", IMM, 2), op("LDA", INX, 7), op("LDX", IMM, 2), op("TST", IZX, 7),
    op("LDY", ZP, 4),  op("LDA", ZP, 4),  op("LDX", ZP, 4),  op("SMB2", ZP, 7),
    op("TAY", IMP, 2), op("LDA", IMM, 2), op("TAX", IMP, 2), UNDEFINED,
    op("LDY", ABS, 5), op("LDA", ABS, 5), op("LDX", ABS, 5), op("BBS2", ZPR, 6),
    // 0xB0
    op("BCS", REL, 2), op("LDA", INY, 7), op("LDA", ZPI, 7), op("TST", IAX, 8),
    op("LDY", ZPX, 4), op("LDA", ZPX, 4), op("LDX", ZPY, 4), op("SMB3", ZP, 7),
    op("CLV", IMP, 2), op("LDA", ABY, 5), op("TSX", IMP, 2), UNDEFINED,
    op("LDY", ABX, 5), op("LDA", ABX, 5), op("LDX", ABY, 5), op("BBS3", ZPR, 6),
    // 0xC0
    op("CPY", IMM, 2), op("CMP", INX, 7), op("CLY", IMP, 2), op("TDD", BLK, 17),
    op("CPY", ZP, 4),  op("CMP", ZP, 4),  op("DEC", ZP, 6),  op("SMB4", ZP, 7),
    op("INY", IMP, 2), op("CMP", IMM, 2), op("DEX", IMP, 2), op("WAI", IMP, 2),
    op("CPY", ABS, 5), op("CMP", ABS, 5), op("DEC", ABS, 7), op("BBS4", ZPR, 6),
    // 0xD0
    op("BNE", REL, 2), op("CMP", INY, 7), op("CMP", ZPI, 7), op("TIN", BLK, 17),
    op("CSH", IMP, 3), op("CMP", ZPX, 4), op("DEC", ZPX, 6), op("SMB5", ZP, 7),
    op("CLD", IMP, 2), op("CMP", ABY, 5), op("PHX", IMP, 3), UNDEFINED,
    UNDEFINED,         op("CMP", ABX, 5), op("DEC", ABX, 7), op("BBS5", ZPR, 6),
    // 0xE0
    op("CPX", IMM, 2), op("SBC", INX, 7), UNDEFINED,         op("TIA", BLK, 17),
    op("CPX", ZP, 4),  op("SBC", ZP, 4),  op("INC", ZP, 6),  op("SMB6", ZP, 7),
    op("INX", IMP, 2), op("SBC", IMM, 2), op("NOP", IMP, 2), UNDEFINED,
    op("CPX", ABS, 5), op("SBC", ABS, 5), op("INC", ABS, 7), op("BBS6", ZPR, 6),
    // 0xF0
    op("BEQ", REL, 2), op("SBC", INY, 7), op("SBC", ZPI, 7), op("TAI", BLK, 17),
    op("SET", IMP, 2), op("SBC", ZPX, 4), op("INC", ZPX, 6), op("SMB7", ZP, 7),
    op("SED", IMP, 2), op("SBC", ABY, 5), op("PLX", IMP, 4), UNDEFINED,
    UNDEFINED,         op("SBC", ABX, 5), op("INC", ABX, 7), op("BBS7", ZPR, 6),
];
