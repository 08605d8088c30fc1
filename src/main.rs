use std::error::Error;

use saturn::devices::{Clock, Keyboard, Lem1802, M35fd, Sped3};
use saturn::{Config, ConfigError, Cpu, CpuError, FileDisk, Register};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const RUN_MS_ENV: &str = "SATURN_RUN_MS";
const DEFAULT_RUN_MS: u64 = 1000;

// Slots, in attach order.
const LEM_SLOT: u16 = 2;

const SET: u16 = 0x01;
const HWI: u16 = 0x12;
const OP_A: u16 = 0x00;
const OP_B: u16 = 0x01;
const OP_PC: u16 = 0x1C;
const OP_IND_NEXT: u16 = 0x1E;
const OP_NEXT: u16 = 0x1F;

fn lit(v: u16) -> u16 {
    0x21 + v
}

fn basic(op: u16, b: u16, a: u16) -> u16 {
    (a << 10) | (b << 5) | op
}

/// Map the display at 0x8000, print a greeting and spin.
fn demo_program() -> Vec<u16> {
    let mut words = vec![
        basic(SET, OP_A, lit(0)),
        basic(SET, OP_B, OP_NEXT),
        0x8000,
        (lit(LEM_SLOT) << 10) | (HWI << 5),
    ];
    for (i, ch) in "HELLO, DCPU-16".bytes().enumerate() {
        words.extend([
            basic(SET, OP_IND_NEXT, OP_NEXT),
            0xF000 | u16::from(ch),
            0x8000 + 32 + 1 + i as u16,
        ]);
    }
    let spin = words.len() as u16;
    words.extend([basic(SET, OP_PC, OP_NEXT), spin]);
    words
}

fn run_ms() -> Result<u64, ConfigError> {
    match std::env::var(RUN_MS_ENV) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidEnv(RUN_MS_ENV)),
        Err(_) => Ok(DEFAULT_RUN_MS),
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;
    let run_ms = run_ms()?;
    let mut args = std::env::args().skip(1);
    let image = args.next();
    let disk = args.next();

    let mut cpu = Cpu::with_config(config);
    cpu.attach(Clock::new())?;
    cpu.attach(Keyboard::new())?;
    cpu.attach(Lem1802::new())?;
    cpu.attach(M35fd::new())?;
    cpu.attach(Sped3::new())?;

    match image {
        Some(path) => {
            let bytes = std::fs::read(&path)?;
            info!(%path, bytes = bytes.len(), "loading image");
            cpu.load_bytes(&bytes);
        }
        None => {
            info!("no image given, running the built-in demo");
            cpu.load(&demo_program());
        }
    }

    if let Some(path) = disk {
        let disk = FileDisk::open(&path)?;
        if let Some(drive) = cpu.device_mut::<M35fd>() {
            drive.insert(Box::new(disk));
        }
        info!(%path, "disk inserted");
    }

    let cycles = run_ms * u64::from(config.clock_speed) / 1000;
    info!(cycles, clock_speed = config.clock_speed, "running");
    match cpu.run(cycles) {
        Ok(()) => {}
        Err(CpuError::InvalidOpcode { pc, word }) => {
            error!(pc = format_args!("{pc:#06x}"), word = format_args!("{word:#06x}"), "invalid opcode, halting");
        }
        Err(e) => return Err(e.into()),
    }

    for r in Register::ALL {
        print!("{r}: {:#06x}  ", cpu.reg(r));
    }
    println!();
    println!(
        "PC: {:#06x}  SP: {:#06x}  EX: {:#06x}  IA: {:#06x}",
        cpu.pc(),
        cpu.sp(),
        cpu.ex(),
        cpu.ia()
    );

    #[cfg(feature = "screenshot")]
    if let Some(lem) = cpu.device::<Lem1802>() {
        lem.render(cpu.memory()).save_png("saturn.png")?;
        info!("frame saved to saturn.png");
    }

    Ok(())
}
