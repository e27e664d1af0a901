use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use turbochip_core::cpu::huc6280::{CpuConfig, HuC6280};
use turbochip_cpu_validation::{CpuState, MASTER, TracingBus, apply_state};

const PROGRAM: u16 = 0xE000;
const BLOCK_OPCODES: [u8; 5] = [0x73, 0xC3, 0xD3, 0xE3, 0xF3];

/// Zero page and stack on RAM, data banks 2-5, code in bank 7.
const MPR_LAYOUT: [u8; 8] = [0xF8, 0xF8, 0x01, 0x02, 0x03, 0x04, 0x05, 0x00];

/// A machine about to execute a random block transfer inside banks 2-5,
/// followed by BRA-self.
fn setup(rng: &mut StdRng) -> (HuC6280, TracingBus) {
    let state = CpuState {
        pc: PROGRAM,
        s: rng.r#gen(),
        a: rng.r#gen(),
        x: rng.r#gen(),
        y: rng.r#gen(),
        p: rng.r#gen::<u8>() & 0x0F,
        mpr: MPR_LAYOUT,
        speed: rng.gen_range(0..=1),
        ram: Vec::new(),
    };
    let opcode = BLOCK_OPCODES[rng.gen_range(0..BLOCK_OPCODES.len())];
    let src: u16 = rng.gen_range(0x4000..0x8000);
    let dest: u16 = rng.gen_range(0x4000..0x8000);
    let length: u16 = rng.gen_range(1..=0x800);

    let mut cpu = HuC6280::new(CpuConfig::default());
    let mut bus = TracingBus::new(rng.r#gen());
    apply_state(&mut cpu, &mut bus, &state);
    let [src_lo, src_hi] = src.to_le_bytes();
    let [dest_lo, dest_hi] = dest.to_le_bytes();
    let [len_lo, len_hi] = length.to_le_bytes();
    bus.load(
        &cpu,
        PROGRAM,
        &[opcode, src_lo, src_hi, dest_lo, dest_hi, len_lo, len_hi, 0x80, 0xFE],
    );
    (cpu, bus)
}

#[test]
fn test_budgeted_transfers_match_uninterrupted_ones() {
    let mut rng = StdRng::seed_from_u64(0x73);

    for round in 0..64 {
        let seed: u64 = rng.r#gen();
        let (mut reference, mut reference_bus) = setup(&mut StdRng::seed_from_u64(seed));
        let (mut cpu, mut bus) = setup(&mut StdRng::seed_from_u64(seed));
        let end = PROGRAM + 7;

        reference.step(&mut reference_bus, MASTER);
        assert!(reference.block_transfer().is_none());
        assert_eq!(reference.pc, u32::from(end));

        let mut runs = 0;
        loop {
            cpu.run_for(&mut bus, MASTER, rng.gen_range(1..=400));
            runs += 1;
            if cpu.block_transfer().is_none() {
                break;
            }
            assert!(runs < 100_000, "round {}: transfer never finished", round);
        }

        assert_eq!(cpu.pc, u32::from(end), "round {}: PC", round);
        assert_eq!(cpu.a, reference.a, "round {}: A", round);
        assert_eq!(cpu.x, reference.x, "round {}: X", round);
        assert_eq!(cpu.y, reference.y, "round {}: Y", round);
        assert_eq!(cpu.s, reference.s, "round {}: SP", round);
        assert_eq!(cpu.p, reference.p, "round {}: P", round);
        assert_eq!(bus.memory, reference_bus.memory, "round {}: memory", round);
    }
}

#[test]
fn test_snapshots_taken_between_budgets_resume_the_transfer() {
    let mut rng = StdRng::seed_from_u64(0xC3);

    for round in 0..16 {
        let seed: u64 = rng.r#gen();
        let (mut reference, mut reference_bus) = setup(&mut StdRng::seed_from_u64(seed));
        let (mut cpu, mut bus) = setup(&mut StdRng::seed_from_u64(seed));
        reference.step(&mut reference_bus, MASTER);

        // Hop the transfer to a fresh core after every budget
        loop {
            cpu.run_for(&mut bus, MASTER, rng.gen_range(1..=400));
            if cpu.block_transfer().is_none() {
                break;
            }
            let state = cpu.save_state();
            cpu = HuC6280::new(CpuConfig::default());
            cpu.load_state(&state);
        }

        assert_eq!(cpu.pc, reference.pc, "round {}: PC", round);
        assert_eq!(cpu.a, reference.a, "round {}: A", round);
        assert_eq!(cpu.x, reference.x, "round {}: X", round);
        assert_eq!(cpu.y, reference.y, "round {}: Y", round);
        assert_eq!(cpu.s, reference.s, "round {}: SP", round);
        assert_eq!(bus.memory, reference_bus.memory, "round {}: memory", round);
    }
}
