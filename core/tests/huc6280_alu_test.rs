use turbochip_core::cpu::huc6280::{HuC6280, Register, StatusFlag};
mod common;
use common::{peek, poke, setup_program, step, step_n};

const C: u8 = StatusFlag::C as u8;
const Z: u8 = StatusFlag::Z as u8;
const I: u8 = StatusFlag::I as u8;
const D: u8 = StatusFlag::D as u8;
const T: u8 = StatusFlag::T as u8;
const V: u8 = StatusFlag::V as u8;
const N: u8 = StatusFlag::N as u8;

fn set_p(cpu: &mut HuC6280, p: u8) {
    cpu.set_register(Register::P, u32::from(p));
}

// =============================================================================
// ADC
// =============================================================================

#[test]
fn test_adc_binary_signed_overflow() {
    let (mut cpu, mut bus) = setup_program(&[0x69, 0x50]);
    cpu.a = 0x50;
    set_p(&mut cpu, I);
    assert_eq!(step(&mut cpu, &mut bus), 2);
    assert_eq!(cpu.a, 0xA0);
    assert_eq!(cpu.p & (N | V | C | Z), N | V);
}

#[test]
fn test_adc_binary_carry_out_to_zero() {
    let (mut cpu, mut bus) = setup_program(&[0x69, 0x01]);
    cpu.a = 0xFF;
    set_p(&mut cpu, I);
    step(&mut cpu, &mut bus);
    assert_eq!(cpu.a, 0x00);
    assert_eq!(cpu.p & (N | V | C | Z), C | Z);
}

#[test]
fn test_adc_binary_carry_in() {
    let (mut cpu, mut bus) = setup_program(&[0x69, 0x10]);
    cpu.a = 0x20;
    set_p(&mut cpu, I | C);
    step(&mut cpu, &mut bus);
    assert_eq!(cpu.a, 0x31);
    assert_eq!(cpu.p & C, 0);
}

#[test]
fn test_adc_decimal() {
    let (mut cpu, mut bus) = setup_program(&[0x69, 0x28]);
    cpu.a = 0x19;
    set_p(&mut cpu, I | D);
    assert_eq!(step(&mut cpu, &mut bus), 3);
    assert_eq!(cpu.a, 0x47);
    assert_eq!(cpu.p & C, 0);
}

#[test]
fn test_adc_decimal_carry_out() {
    let (mut cpu, mut bus) = setup_program(&[0x69, 0x01]);
    cpu.a = 0x99;
    set_p(&mut cpu, I | D);
    step(&mut cpu, &mut bus);
    assert_eq!(cpu.a, 0x00);
    assert_eq!(cpu.p & (C | Z), C | Z);
}

#[test]
fn test_adc_decimal_leaves_v_alone() {
    let (mut cpu, mut bus) = setup_program(&[0x69, 0x01]);
    cpu.a = 0x10;
    set_p(&mut cpu, I | D | V);
    step(&mut cpu, &mut bus);
    assert_eq!(cpu.a, 0x11);
    assert_ne!(cpu.p & V, 0);
}

// =============================================================================
// SBC
// =============================================================================

#[test]
fn test_sbc_binary_overflow_and_borrow() {
    let (mut cpu, mut bus) = setup_program(&[0xE9, 0xB0]);
    cpu.a = 0x50;
    set_p(&mut cpu, I | C);
    step(&mut cpu, &mut bus);
    assert_eq!(cpu.a, 0xA0);
    assert_eq!(cpu.p & (N | V | C | Z), N | V);
}

#[test]
fn test_sbc_binary_no_borrow() {
    let (mut cpu, mut bus) = setup_program(&[0xE9, 0x01]);
    cpu.a = 0x01;
    set_p(&mut cpu, I | C);
    step(&mut cpu, &mut bus);
    assert_eq!(cpu.a, 0x00);
    assert_eq!(cpu.p & (C | Z), C | Z);
}

#[test]
fn test_sbc_decimal() {
    let (mut cpu, mut bus) = setup_program(&[0xE9, 0x01]);
    cpu.a = 0x50;
    set_p(&mut cpu, I | D | C);
    assert_eq!(step(&mut cpu, &mut bus), 3);
    assert_eq!(cpu.a, 0x49);
    assert_ne!(cpu.p & C, 0);
}

#[test]
fn test_sbc_decimal_borrow_wraps_to_99() {
    let (mut cpu, mut bus) = setup_program(&[0xE9, 0x01]);
    cpu.a = 0x00;
    set_p(&mut cpu, I | D | C);
    step(&mut cpu, &mut bus);
    assert_eq!(cpu.a, 0x99);
    assert_eq!(cpu.p & C, 0);
}

// =============================================================================
// T flag
// =============================================================================

#[test]
fn test_set_makes_and_operate_on_zero_page_x() {
    let (mut cpu, mut bus) = setup_program(&[0xF4, 0x29, 0x0F, 0xEA]);
    cpu.a = 0x55;
    cpu.x = 0x10;
    poke(&cpu, &mut bus, 0x2010, 0xF3);

    assert_eq!(step(&mut cpu, &mut bus), 2);
    assert_ne!(cpu.p & T, 0);
    assert_eq!(step(&mut cpu, &mut bus), 5);
    assert_eq!(cpu.a, 0x55);
    assert_eq!(peek(&cpu, &bus, 0x2010), 0x03);
    assert_eq!(cpu.p & (N | Z), 0);
    // T only lasts one instruction
    assert_eq!(cpu.p & T, 0);
}

#[test]
fn test_set_ora_and_eor() {
    let (mut cpu, mut bus) = setup_program(&[0xF4, 0x09, 0x80, 0xF4, 0x49, 0xFF]);
    cpu.a = 0x01;
    cpu.x = 0x20;
    poke(&cpu, &mut bus, 0x2020, 0x01);
    step(&mut cpu, &mut bus);
    step(&mut cpu, &mut bus);
    assert_eq!(peek(&cpu, &bus, 0x2020), 0x81);
    assert_ne!(cpu.p & N, 0);
    step(&mut cpu, &mut bus);
    step(&mut cpu, &mut bus);
    assert_eq!(peek(&cpu, &bus, 0x2020), 0x7E);
    assert_eq!(cpu.a, 0x01);
}

#[test]
fn test_set_adc_adds_into_memory() {
    let (mut cpu, mut bus) = setup_program(&[0xF4, 0x65, 0x40]);
    cpu.a = 0x00;
    cpu.x = 0x30;
    poke(&cpu, &mut bus, 0x2030, 0x20);
    poke(&cpu, &mut bus, 0x2040, 0x05);
    step(&mut cpu, &mut bus);
    assert_eq!(step(&mut cpu, &mut bus), 4 + 3);
    assert_eq!(peek(&cpu, &bus, 0x2030), 0x25);
    assert_eq!(cpu.a, 0x00);
}

#[test]
fn test_t_cleared_by_unrelated_instruction() {
    let (mut cpu, mut bus) = setup_program(&[0xF4, 0xEA, 0x29, 0x0F]);
    cpu.a = 0xFF;
    cpu.x = 0x10;
    step(&mut cpu, &mut bus);
    step(&mut cpu, &mut bus);
    assert_eq!(cpu.p & T, 0);
    assert_eq!(step(&mut cpu, &mut bus), 2);
    assert_eq!(cpu.a, 0x0F);
}

#[test]
fn test_sbc_is_not_redirected_by_t() {
    let (mut cpu, mut bus) = setup_program(&[0xF4, 0xE9, 0x01]);
    cpu.a = 0x05;
    cpu.x = 0x10;
    poke(&cpu, &mut bus, 0x2010, 0x40);
    set_p(&mut cpu, I | C);
    step(&mut cpu, &mut bus);
    step(&mut cpu, &mut bus);
    assert_eq!(cpu.a, 0x04);
    assert_eq!(peek(&cpu, &bus, 0x2010), 0x40);
}

// =============================================================================
// Compare and bit tests
// =============================================================================

#[test]
fn test_cmp_cpx_cpy() {
    let (mut cpu, mut bus) = setup_program(&[0xC9, 0x10, 0xE0, 0x20, 0xC0, 0x40]);
    cpu.a = 0x10;
    cpu.x = 0x10;
    cpu.y = 0x41;
    step(&mut cpu, &mut bus);
    assert_eq!(cpu.p & (C | Z | N), C | Z);
    step(&mut cpu, &mut bus);
    assert_eq!(cpu.p & (C | Z | N), N);
    step(&mut cpu, &mut bus);
    assert_eq!(cpu.p & (C | Z | N), C);
}

#[test]
fn test_bit_copies_n_and_v_from_memory() {
    let (mut cpu, mut bus) = setup_program(&[0x24, 0x00]);
    cpu.a = 0x01;
    poke(&cpu, &mut bus, 0x2000, 0xC0);
    step(&mut cpu, &mut bus);
    assert_eq!(cpu.p & (N | V | Z), N | V | Z);
}

#[test]
fn test_tst_immediate_against_zero_page() {
    let (mut cpu, mut bus) = setup_program(&[0x83, 0x01, 0x50, 0x83, 0x80, 0x50]);
    poke(&cpu, &mut bus, 0x2050, 0x41);
    cpu.a = 0x00;
    assert_eq!(step(&mut cpu, &mut bus), 7);
    assert_eq!(cpu.p & (N | V | Z), V);
    step(&mut cpu, &mut bus);
    assert_eq!(cpu.p & (N | V | Z), V | Z);
    assert_eq!(cpu.a, 0x00);
}

#[test]
fn test_tsb_and_trb() {
    let (mut cpu, mut bus) = setup_program(&[0x04, 0x10, 0x14, 0x10]);
    cpu.a = 0x0F;
    poke(&cpu, &mut bus, 0x2010, 0xC0);
    assert_eq!(step(&mut cpu, &mut bus), 6);
    assert_eq!(peek(&cpu, &bus, 0x2010), 0xCF);
    assert_eq!(cpu.p & (N | V | Z), N | V);
    step(&mut cpu, &mut bus);
    assert_eq!(peek(&cpu, &bus, 0x2010), 0xC0);
}

// =============================================================================
// Shifts, increments, bit set/reset
// =============================================================================

#[test]
fn test_shifts_on_accumulator() {
    let (mut cpu, mut bus) = setup_program(&[0x0A, 0x4A, 0x2A, 0x6A]);
    cpu.a = 0x81;
    set_p(&mut cpu, I);
    step(&mut cpu, &mut bus);
    assert_eq!(cpu.a, 0x02);
    assert_ne!(cpu.p & C, 0);
    step(&mut cpu, &mut bus);
    assert_eq!(cpu.a, 0x01);
    assert_eq!(cpu.p & C, 0);
    step(&mut cpu, &mut bus);
    assert_eq!(cpu.a, 0x02);
    step(&mut cpu, &mut bus);
    assert_eq!(cpu.a, 0x01);
    assert_eq!(cpu.p & C, 0);
}

#[test]
fn test_ror_memory_rotates_carry_in() {
    let (mut cpu, mut bus) = setup_program(&[0x66, 0x08]);
    poke(&cpu, &mut bus, 0x2008, 0x01);
    set_p(&mut cpu, I | C);
    assert_eq!(step(&mut cpu, &mut bus), 6);
    assert_eq!(peek(&cpu, &bus, 0x2008), 0x80);
    assert_eq!(cpu.p & (C | N), C | N);
}

#[test]
fn test_inc_dec() {
    let (mut cpu, mut bus) = setup_program(&[0x1A, 0x3A, 0x3A, 0xE6, 0x00, 0xCA]);
    cpu.a = 0xFF;
    cpu.x = 0x00;
    step(&mut cpu, &mut bus);
    assert_eq!(cpu.a, 0x00);
    assert_ne!(cpu.p & Z, 0);
    step(&mut cpu, &mut bus);
    step(&mut cpu, &mut bus);
    assert_eq!(cpu.a, 0xFE);
    poke(&cpu, &mut bus, 0x2000, 0x7F);
    step(&mut cpu, &mut bus);
    assert_eq!(peek(&cpu, &bus, 0x2000), 0x80);
    step(&mut cpu, &mut bus);
    assert_eq!(cpu.x, 0xFF);
    assert_ne!(cpu.p & N, 0);
}

#[test]
fn test_rmb_smb() {
    let (mut cpu, mut bus) = setup_program(&[0x37, 0x20, 0xF7, 0x20]);
    poke(&cpu, &mut bus, 0x2020, 0x0F);
    let p = cpu.p;
    assert_eq!(step(&mut cpu, &mut bus), 7);
    assert_eq!(peek(&cpu, &bus, 0x2020), 0x07);
    step(&mut cpu, &mut bus);
    assert_eq!(peek(&cpu, &bus, 0x2020), 0x87);
    assert_eq!(cpu.p, p);
}

#[test]
fn test_register_swaps_and_clears() {
    let (mut cpu, mut bus) = setup_program(&[0x22, 0x42, 0x02, 0x62, 0x82, 0xC2]);
    cpu.a = 1;
    cpu.x = 2;
    cpu.y = 3;
    assert_eq!(step(&mut cpu, &mut bus), 3);
    assert_eq!((cpu.a, cpu.x, cpu.y), (2, 1, 3));
    step(&mut cpu, &mut bus);
    assert_eq!((cpu.a, cpu.x, cpu.y), (3, 1, 2));
    step(&mut cpu, &mut bus);
    assert_eq!((cpu.a, cpu.x, cpu.y), (3, 2, 1));
    let p = cpu.p;
    step_n(&mut cpu, &mut bus, 3);
    assert_eq!((cpu.a, cpu.x, cpu.y), (0, 0, 0));
    // CLA/CLX/CLY leave the flags alone
    assert_eq!(cpu.p, p);
}
