//! Runs a chip8 rom inside of the terminal.
mod config;
mod display;
mod input;
mod sound;

use std::{fs::File, path::Path, sync::Mutex};

use anyhow::{Context, Result};
use chip::{chip8::ChipSet, resources::Rom, Exit, Runner, StopSignal};
use tracing_subscriber::EnvFilter;

use crate::{config::Config, display::TerminalDisplay, input::TerminalKeypad, sound::Bell};

/// Will write the log into the given file, as the terminal is taken up by the display.
fn setup_logging(path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Unable to create the log file '{}'.", path.display()))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init()
        .map_err(|err| anyhow::anyhow!(err))
        .context("Unable to set up the logger.")
}

fn main() -> Result<()> {
    let config = Config::from_env()?;
    if let Some(path) = &config.log_file {
        setup_logging(path)?;
    }
    log::debug!("{:?}", config);

    let rom = Rom::from_path(&config.rom).context("Unable to load the rom.")?;
    let chip = ChipSet::new(rom).context("Unable to set up the chip.")?;

    let stop = StopSignal::new();
    let keypad = TerminalKeypad::start(stop.clone());
    let display = TerminalDisplay::new(chip.get_name())?;

    let mut runner = Runner::new(chip, display, keypad, Bell::new())
        .with_interval(config.interval)
        .with_stop_signal(stop);

    let result = runner.run();
    // gives the terminal back
    let chip = runner.into_chip();

    match result {
        Ok(Exit::EndOfProgram) => println!("'{}' ran to its end.", chip.get_name()),
        Ok(exit) => log::info!("{:?}", exit),
        Err(err) => {
            eprintln!("{}", chip);
            return Err(err).with_context(|| format!("'{}' crashed.", chip.get_name()));
        }
    }
    Ok(())
}
