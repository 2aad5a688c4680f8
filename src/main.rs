mod bits;
mod cpu;
mod driver;
mod error;
mod machine;

use std::fs;
use std::path::Path;
use std::process::ExitCode;

use driver::minifb::Minifb;
use driver::PresentationSurface;
use error::EmuError;
use machine::{Machine, MachineConfig};

struct Args {
    rom: String,
}

fn parse_args() -> Result<Args, lexopt::Error> {
    use lexopt::prelude::*;

    let help_msg = "\
USAGE:
    invaders8080 <ROM>

ARGS:
    <ROM>    Filepath to a Space Invaders ROM image.

OPTIONS:
    -h, --help    Print this help message.";

    let mut rom = None;
    let mut parser = lexopt::Parser::from_env();

    while let Some(arg) = parser.next()? {
        match arg {
            Value(path) if rom.is_none() => {
                rom = Some(path.string()?);
            }
            Short('h') | Long("help") => {
                println!("{}", help_msg);
                std::process::exit(0);
            }
            _ => return Err(arg.unexpected()),
        }
    }

    Ok(Args {
        rom: rom.ok_or("missing argument <ROM>\n\n  Refer to --help for more information")?,
    })
}

fn run() -> Result<(), EmuError> {
    let args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(2);
        }
    };

    let rom_path = Path::new(&args.rom);
    let program_name = rom_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("invaders8080");

    let rom_bytes = fs::read(rom_path).map_err(|source| EmuError::RomLoad {
        path: args.rom.clone(),
        source,
    })?;

    let config = MachineConfig::default();
    log::info!(
        "loaded {} byte ROM at base offset {:#06x}, target clock {} Hz",
        rom_bytes.len(),
        config.rom_offset,
        config.target_hz
    );

    let mut machine = Machine::new(config);
    machine.load_rom(&rom_bytes)?;

    let mut surface = Minifb::new();
    surface.init(config.screen_width, config.screen_height, program_name)?;

    machine.run(&mut surface)
}

fn main() -> ExitCode {
    env_logger::init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
