use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use turbochip_core::cpu::huc6280::OPCODE_TABLE;
use turbochip_cpu_validation::{GeneratorConfig, TestCase, generate_case, write_vectors};

/// Generate randomized single-instruction test vectors for the HuC6280.
#[derive(Parser)]
#[command(name = "gen_huc6280_tests")]
struct Args {
    /// Opcode in hex (e.g. 0xA9), or "all"
    opcode: String,

    /// TOML generator settings
    #[arg(long)]
    config: Option<PathBuf>,

    /// Tests per opcode
    #[arg(long)]
    count: Option<usize>,

    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// RNG seed for reproducible output
    #[arg(long)]
    seed: Option<u64>,

    /// Write .json.gz instead of .json
    #[arg(long)]
    gzip: bool,
}

fn generate_and_write(rng: &mut impl Rng, opcode: u8, config: &GeneratorConfig) {
    let tests: Vec<TestCase> = (0..config.count)
        .map(|_| generate_case(rng, opcode, config))
        .collect();

    let ext = if config.gzip { "json.gz" } else { "json" };
    let out_path = config.out_dir.join(format!("{:02x}.{}", opcode, ext));
    write_vectors(&out_path, &tests).unwrap_or_else(|e| {
        eprintln!("Failed to write {}: {}", out_path.display(), e);
        std::process::exit(1);
    });
    println!(
        "Generated {} tests for 0x{:02X} {} -> {}",
        tests.len(),
        opcode,
        OPCODE_TABLE[opcode as usize].mnemonic,
        out_path.display()
    );
}

fn load_config(path: Option<&Path>) -> GeneratorConfig {
    match path {
        Some(path) => GeneratorConfig::load(path).unwrap_or_else(|e| {
            eprintln!("Failed to read {}: {}", path.display(), e);
            std::process::exit(1);
        }),
        None => GeneratorConfig::default(),
    }
}

fn main() {
    let args = Args::parse();

    let mut config = load_config(args.config.as_deref());
    if let Some(count) = args.count {
        config.count = count;
    }
    if let Some(out_dir) = args.out_dir {
        config.out_dir = out_dir;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    config.gzip |= args.gzip;

    fs::create_dir_all(&config.out_dir).unwrap_or_else(|e| {
        eprintln!("Failed to create {}: {}", config.out_dir.display(), e);
        std::process::exit(1);
    });

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    if args.opcode == "all" {
        let mut count = 0;
        for opcode in 0x00..=0xFFu8 {
            if config.skip.contains(&opcode) {
                continue;
            }
            generate_and_write(&mut rng, opcode, &config);
            count += 1;
        }
        println!("Generated tests for {} opcodes", count);
    } else {
        let opcode_str = args.opcode.trim_start_matches("0x").trim_start_matches("0X");
        let opcode = u8::from_str_radix(opcode_str, 16).unwrap_or_else(|_| {
            eprintln!("Invalid hex opcode: {}", args.opcode);
            std::process::exit(1);
        });
        generate_and_write(&mut rng, opcode, &config);
    }
}
