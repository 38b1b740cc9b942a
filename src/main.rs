use std::error::Error;
use std::fs::File;
use std::path::PathBuf;

use chip8::display::MonoTermDisplay;
use chip8::environment::Environment;
use chip8::framebuffer::{HEIGHT, WIDTH};
use chip8::input::StdinInput;
use chip8::random::{RandomSource, StdRandom};
use chip8::{Chip8Interpreter, Quirks, RunConfig, UnknownOpcodePolicy};
use clap::Parser;
use log::info;

/// Run a CHIP-8 program in the terminal. Keypad is 1234/qwer/asdf/zxcv, Esc quits.
#[derive(Parser, Debug)]
#[clap(version, about)]
struct Args {
    /// program image to load at 0x200
    rom: PathBuf,

    /// instructions per 60th of a second
    #[clap(long, default_value_t = 10)]
    cycles_per_frame: u32,

    /// timer ticks (and frames) per second; 0 runs as fast as possible
    #[clap(long, default_value_t = 60)]
    frame_rate: u32,

    /// stop after this many frames
    #[clap(long)]
    max_frames: Option<u64>,

    /// 8XY6/8XYE shift VY into VX
    #[clap(long)]
    shift_quirk: bool,

    /// BNNN jumps relative to VX rather than V0
    #[clap(long)]
    jump_quirk: bool,

    /// FX55/FX65 advance I past the registers stored or loaded
    #[clap(long)]
    load_store_quirk: bool,

    /// log and step over unknown opcodes instead of stopping
    #[clap(long)]
    skip_unknown: bool,

    /// seed for CXNN, for reproducible runs
    #[clap(long)]
    seed: Option<u64>,
}

impl Args {
    fn quirks(&self) -> Quirks {
        Quirks {
            shift_uses_vy: self.shift_quirk,
            jump_uses_vx: self.jump_quirk,
            load_store_increments_i: self.load_store_quirk,
        }
    }

    fn run_config(&self) -> RunConfig {
        RunConfig {
            cycles_per_frame: self.cycles_per_frame,
            frame_rate: self.frame_rate,
            unknown_opcode: if self.skip_unknown {
                UnknownOpcodePolicy::Skip
            } else {
                UnknownOpcodePolicy::Halt
            },
            max_frames: self.max_frames,
        }
    }

    fn random(&self) -> Box<dyn RandomSource> {
        match self.seed {
            Some(seed) => Box::new(StdRandom::seeded(seed)),
            None => Box::new(StdRandom::new()),
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    // load a program
    let mut interpreter = Chip8Interpreter::new(args.quirks(), args.random());
    let mut f = File::open(&args.rom)?;
    interpreter.load_program(&mut f)?;
    info!("running {}", args.rom.display());

    // initialise
    let mut display = MonoTermDisplay::new(WIDTH, HEIGHT)?;
    let mut input = StdinInput::new()?;
    let result = Environment::new(interpreter, &mut display, &mut input, args.run_config()).run();

    // give the terminal back before reporting anything
    drop(input);
    drop(display);
    // shove some junk on stdout to stop the cli messing up the last frame
    for _ in 0..2 {
        println!();
    }
    let summary = result?;
    info!(
        "ran {} instructions over {} frames",
        summary.instructions, summary.frames
    );
    Ok(())
}
