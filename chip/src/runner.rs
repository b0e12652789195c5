use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread::{self, JoinHandle},
    time::Duration,
};

use crate::{
    chip8::ChipSet,
    definitions::cpu,
    devices::{DisplayCommands, KeyboardCommands, SoundCommands},
    opcode::Operation,
    ProcessError,
};

/// A cloneable token that asks a running loop to stop. Stopping is idempotent and
/// is observed at the head of every iteration and while waiting for a key.
#[derive(Debug, Clone, Default)]
pub struct StopSignal {
    stopped: Arc<AtomicBool>,
}

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.stopped.store(true, Ordering::Release);
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }
}

/// The reason a run loop stopped without an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    /// The program counter ran past the loaded program.
    EndOfProgram,
    /// The stop signal was raised, or a key wait was cancelled.
    Stopped,
    /// The display reported that it is not open anymore.
    DisplayClosed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Running,
    Stopped,
}

/// Drives a chipset with the given devices.
///
/// # Example
/// ```rust
/// # use chip::{chip8::ChipSet, devices::{Keyboard, NoSound, SharedDisplay}, resources::Rom, Exit, Runner};
/// # use std::time::Duration;
/// // V0 = 5, V0 += 2
/// let rom = Rom::new("ADD", vec![0x60, 0x05, 0x70, 0x02]);
/// let chip = ChipSet::new(rom).unwrap();
///
/// let mut runner = Runner::new(chip, SharedDisplay::new(), Keyboard::new(), NoSound)
///     .with_interval(Duration::from_millis(0));
///
/// assert_eq!(Ok(Exit::EndOfProgram), runner.run());
/// assert_eq!(7, runner.chip().get_registers()[0]);
/// ```
pub struct Runner<D, K, S> {
    chip: ChipSet,
    display: D,
    keyboard: K,
    sound: S,
    interval: Duration,
    stop: StopSignal,
    state: State,
}

impl<D, K, S> Runner<D, K, S>
where
    D: DisplayCommands,
    K: KeyboardCommands,
    S: SoundCommands,
{
    pub fn new(chip: ChipSet, display: D, keyboard: K, sound: S) -> Self {
        Self {
            chip,
            display,
            keyboard,
            sound,
            interval: cpu::INTERVAL,
            stop: StopSignal::new(),
            state: State::Running,
        }
    }

    /// Will set the pause between two iterations.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Will replace the stop signal, so that it can be shared with the devices.
    pub fn with_stop_signal(mut self, stop: StopSignal) -> Self {
        self.stop = stop;
        self
    }

    pub fn stop_signal(&self) -> StopSignal {
        self.stop.clone()
    }

    pub fn chip(&self) -> &ChipSet {
        &self.chip
    }

    pub fn into_chip(self) -> ChipSet {
        self.chip
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// Will run a single iteration of the loop, without pacing. Returns `Some` once the
    /// loop has to stop.
    pub fn step(&mut self) -> Result<Option<Exit>, ProcessError> {
        if self.state == State::Stopped {
            return Ok(Some(Exit::Stopped));
        }

        let result = self.iteration();
        if !matches!(result, Ok(None)) {
            self.state = State::Stopped;
        }
        result
    }

    fn iteration(&mut self) -> Result<Option<Exit>, ProcessError> {
        if self.stop.is_stopped() {
            return Ok(Some(Exit::Stopped));
        }
        if !self.display.is_open() {
            return Ok(Some(Exit::DisplayClosed));
        }

        let operation = match self.chip.next(&mut self.keyboard)? {
            Some(operation) => operation,
            None => return Ok(Some(Exit::EndOfProgram)),
        };

        match operation {
            Operation::None => {}
            Operation::Draw => self.display.display(self.chip.get_display()),
            Operation::Wait(register) => match self.keyboard.wait_for_key(&self.stop) {
                Some(key) => self.chip.resume_with_key(register, key)?,
                None => {
                    log::debug!("key wait was cancelled");
                    return Ok(Some(Exit::Stopped));
                }
            },
        }

        if self.chip.tick_timers() {
            self.sound.play();
        }

        Ok(None)
    }

    /// Will run the loop until it stops, fatal errors end the loop and are handed back.
    pub fn run(&mut self) -> Result<Exit, ProcessError> {
        log::info!(
            "starting '{}' with an interval of {:?}",
            self.chip.get_name(),
            self.interval
        );

        let result = loop {
            match self.step() {
                Ok(None) => thread::sleep(self.interval),
                Ok(Some(exit)) => break Ok(exit),
                Err(err) => {
                    log::error!(
                        "stopping '{}' at {:#06X}: {}",
                        self.chip.get_name(),
                        self.chip.get_program_counter(),
                        err
                    );
                    break Err(err);
                }
            }
        };

        if let Ok(exit) = result {
            log::info!("stopped '{}' with {:?}", self.chip.get_name(), exit);
        }
        result
    }
}

impl<D, K, S> Runner<D, K, S>
where
    D: DisplayCommands + Send + 'static,
    K: KeyboardCommands + Send + 'static,
    S: SoundCommands + Send + 'static,
{
    /// Will run the loop on its own thread.
    pub fn spawn(mut self) -> RunnerHandle {
        let stop = self.stop.clone();
        let thread = thread::spawn(move || {
            let result = self.run();
            (self.into_chip(), result)
        });

        RunnerHandle {
            stop,
            thread: Some(thread),
        }
    }
}

type Finished = (ChipSet, Result<Exit, ProcessError>);

/// The handle onto a spawned run loop, dropping it stops the loop and waits for it.
pub struct RunnerHandle {
    stop: StopSignal,
    thread: Option<JoinHandle<Finished>>,
}

impl RunnerHandle {
    pub fn stop(&self) {
        self.stop.stop();
    }

    pub fn is_finished(&self) -> bool {
        self.thread.as_ref().map_or(true, |thread| thread.is_finished())
    }

    /// Will wait for the loop to stop on its own and hand back the chipset.
    pub fn join(mut self) -> thread::Result<Finished> {
        // only `drop` takes it otherwise, and that can't have run yet
        let thread = self.thread.take().expect("This will work.");
        thread.join()
    }
}

impl Drop for RunnerHandle {
    fn drop(&mut self) {
        if let Some(thread) = self.thread.take() {
            self.stop.stop();
            if thread.join().is_err() {
                log::error!("the run loop panicked");
            }
        }
    }
}
