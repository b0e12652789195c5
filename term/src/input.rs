//! The keypad of the terminal front end.
//!
//! Terminals only report key presses and no releases, so a key counts as held for
//! a short window after it was last pressed.
use std::{
    sync::{
        mpsc::{self, Receiver, RecvTimeoutError, Sender},
        Arc,
    },
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

use chip::{
    definitions::keyboard,
    devices::KeyboardCommands,
    StopSignal,
};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use parking_lot::Mutex;

/// How long a key counts as held after it was pressed.
const HOLD: Duration = Duration::from_millis(150);
/// How often the stop signal is looked at while blocking.
const POLL: Duration = Duration::from_millis(20);

/// The left hand side of a qwerty keyboard, laid out like the keypad
const QWERTY: [[char; 4]; 4] = [
    ['1', '2', '3', '4'],
    ['q', 'w', 'e', 'r'],
    ['a', 's', 'd', 'f'],
    ['z', 'x', 'c', 'v'],
];

type Held = [Option<Instant>; keyboard::SIZE];

/// Will map the character onto the key at the same position of the keypad.
pub fn map_key(c: char) -> Option<u8> {
    let c = c.to_ascii_lowercase();
    QWERTY.iter().zip(keyboard::LAYOUT.iter()).find_map(|(chars, keys)| {
        chars
            .iter()
            .position(|candidate| *candidate == c)
            .map(|index| keys[index])
    })
}

/// Handles the events read from the terminal.
struct KeyHandler {
    held: Arc<Mutex<Held>>,
    presses: Sender<u8>,
    stop: StopSignal,
}

impl KeyHandler {
    fn handle(&self, event: KeyEvent) {
        match event.code {
            KeyCode::Esc => self.stop.stop(),
            KeyCode::Char('c') if event.modifiers.contains(KeyModifiers::CONTROL) => {
                self.stop.stop()
            }
            KeyCode::Char(c) => match map_key(c) {
                Some(key) => {
                    self.held.lock()[key as usize] = Some(Instant::now());
                    // nobody waiting for a key is fine
                    let _ = self.presses.send(key);
                }
                None => log::debug!("'{}' is not on the keypad", c),
            },
            _ => {}
        }
    }

    /// Will read the terminal events until the stop signal is raised.
    fn read_events(self) {
        while !self.stop.is_stopped() {
            let event = match event::poll(POLL) {
                Ok(true) => event::read(),
                Ok(false) => continue,
                Err(err) => Err(err),
            };
            match event {
                Ok(Event::Key(key)) => self.handle(key),
                Ok(_) => {}
                Err(err) => {
                    log::error!("unable to read the terminal input: {}", err);
                    self.stop.stop();
                }
            }
        }
        log::debug!("stopped reading the terminal input");
    }
}

/// The keypad read from the terminal on its own thread.
pub struct TerminalKeypad {
    held: Arc<Mutex<Held>>,
    presses: Receiver<u8>,
    stop: StopSignal,
    thread: Option<JoinHandle<()>>,
}

impl TerminalKeypad {
    /// Will start reading the terminal, Esc and Ctrl-C raise the stop signal.
    pub fn start(stop: StopSignal) -> Self {
        let (mut keypad, handler) = Self::detached(stop);
        keypad.thread = Some(thread::spawn(move || handler.read_events()));
        keypad
    }

    fn detached(stop: StopSignal) -> (Self, KeyHandler) {
        let held = Arc::new(Mutex::new([None; keyboard::SIZE]));
        let (sender, receiver) = mpsc::channel();
        let handler = KeyHandler {
            held: held.clone(),
            presses: sender,
            stop: stop.clone(),
        };
        let keypad = Self {
            held,
            presses: receiver,
            stop,
            thread: None,
        };
        (keypad, handler)
    }
}

impl KeyboardCommands for TerminalKeypad {
    fn is_pressed(&mut self, key: u8) -> bool {
        self.held
            .lock()
            .get(key as usize)
            .copied()
            .flatten()
            .map_or(false, |pressed| pressed.elapsed() < HOLD)
    }

    fn wait_for_key(&mut self, stop: &StopSignal) -> Option<u8> {
        // presses from before the wait don't count
        while self.presses.try_recv().is_ok() {}

        while !stop.is_stopped() {
            match self.presses.recv_timeout(POLL) {
                Ok(key) => return Some(key),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => return None,
            }
        }
        None
    }
}

impl Drop for TerminalKeypad {
    fn drop(&mut self) {
        if let Some(thread) = self.thread.take() {
            self.stop.stop();
            if thread.join().is_err() {
                log::error!("the input thread panicked");
            }
        }
    }
}
