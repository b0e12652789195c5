//! The run time configuration of the terminal front end, read from the command
//! line and the environment.
use std::{path::PathBuf, time::Duration};

use anyhow::{bail, Context, Result};
use chip::definitions::cpu;

/// The rom to run, if it isn't given as the first argument.
pub const ROM_FILE: &str = "ROM_FILE";
/// The amount of opcodes executed per second.
pub const HERTZ: &str = "CHIP8_HERTZ";
/// The file the log is written to, without it nothing is logged.
pub const LOG_FILE: &str = "CHIP8_LOG";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub rom: PathBuf,
    pub interval: Duration,
    pub log_file: Option<PathBuf>,
}

impl Config {
    /// Will read the configuration of the running process.
    pub fn from_env() -> Result<Self> {
        let args: Vec<String> = std::env::args().collect();
        Self::parse(&args, |key| std::env::var(key).ok())
    }

    /// Will build the configuration from the given arguments (including the program
    /// name) and the given environment lookup.
    pub fn parse<F>(args: &[String], env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let rom = match args.get(1).cloned().or_else(|| env(ROM_FILE)) {
            Some(rom) => PathBuf::from(rom),
            None => bail!(
                "no rom given, usage: {} <rom> (or set {})",
                args.first().map(String::as_str).unwrap_or("chip8"),
                ROM_FILE
            ),
        };

        let interval = match env(HERTZ) {
            Some(hertz) => interval(&hertz)?,
            None => cpu::INTERVAL,
        };

        Ok(Self {
            rom,
            interval,
            log_file: env(LOG_FILE).map(PathBuf::from),
        })
    }
}

/// Will turn the amount of hertz into the pause between two opcodes.
fn interval(hertz: &str) -> Result<Duration> {
    let hertz: u64 = hertz
        .trim()
        .parse()
        .with_context(|| format!("{} has to be a number, not '{}'", HERTZ, hertz))?;
    if hertz == 0 {
        bail!("{} has to be above 0", HERTZ);
    }
    Ok(Duration::from_micros(1_000_000 / hertz))
}
