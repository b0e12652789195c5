use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc,
    },
};

use parking_lot::Mutex;

use crate::{
    definitions::{display, keyboard},
    StopSignal,
};

/// The framebuffer of the chip, `HEIGHT` rows of `WIDTH` pixels.
pub type Frame = [[bool; display::WIDTH]; display::HEIGHT];

#[cfg_attr(test, mockall::automock)]
/// The traits responsible for the display based code
pub trait DisplayCommands {
    /// Will display all from the pixels
    fn display(&mut self, pixels: &Frame);

    /// Checks if the display is still there to be drawn on, the run
    /// loop stops as soon as this returns false.
    fn is_open(&mut self) -> bool {
        true
    }
}

#[cfg_attr(test, mockall::automock)]
/// The trait responsible for reading the keyboard data
pub trait KeyboardCommands {
    /// Is the given key (`0x0` to `0xF`) currently held down.
    fn is_pressed(&mut self, key: u8) -> bool;

    /// Blocks until the next key is pressed. Returns `None` if the wait was
    /// cancelled, either by the stop signal or because the input went away.
    fn wait_for_key(&mut self, stop: &StopSignal) -> Option<u8>;
}

#[cfg_attr(test, mockall::automock)]
/// The trait responsible for the tone device
pub trait SoundCommands {
    /// Called once per timer tick while the sound timer is running.
    fn play(&mut self);
}

impl<T: DisplayCommands + ?Sized> DisplayCommands for &mut T {
    fn display(&mut self, pixels: &Frame) {
        (**self).display(pixels)
    }

    fn is_open(&mut self) -> bool {
        (**self).is_open()
    }
}

impl<T: KeyboardCommands + ?Sized> KeyboardCommands for &mut T {
    fn is_pressed(&mut self, key: u8) -> bool {
        (**self).is_pressed(key)
    }

    fn wait_for_key(&mut self, stop: &StopSignal) -> Option<u8> {
        (**self).wait_for_key(stop)
    }
}

impl<T: SoundCommands + ?Sized> SoundCommands for &mut T {
    fn play(&mut self) {
        (**self).play()
    }
}

/// Will store the state of the keyboard and all the presses
/// that were not consumed yet.
///
/// Input is done with a hex keyboard that has 16 keys ranging `0-F`. The `8`, `4`, `6`, and
/// `2` keys are typically used for directional input. Three opcodes are used to detect input.
/// One skips an instruction if a specific key is pressed, while another does the same if a
/// specific key is not pressed. The third waits for a key press, and then stores it in one of
/// the data registers.
///
/// As this keyboard never blocks, waiting on it with no queued press counts as a cancelled
/// wait. It is the headless counterpart to a real keypad.
#[derive(Default, Debug)]
pub struct Keyboard {
    keys: [bool; keyboard::SIZE],
    presses: VecDeque<u8>,
}

impl Keyboard {
    pub fn new() -> Self {
        Keyboard::default()
    }

    pub fn toggle_key(&mut self, key: usize) {
        self.set_key(key, !self.keys[key])
    }

    /// Will set the state of a single key, pressing a released key queues a key press.
    pub fn set_key(&mut self, key: usize, to: bool) {
        debug_assert!(key < keyboard::SIZE);
        if to && !self.keys[key] {
            self.presses.push_back(key as u8);
        }
        self.keys[key] = to;
    }

    /// Queues a key press without changing the held state of the key.
    pub fn press(&mut self, key: u8) {
        debug_assert!((key as usize) < keyboard::SIZE);
        self.presses.push_back(key);
    }

    pub fn set_mult(&mut self, keys: &[bool]) {
        assert!(keys.len() == self.keys.len());
        self.keys.copy_from_slice(keys);
    }

    pub fn get_keys(&self) -> &[bool] {
        &self.keys
    }
}

impl KeyboardCommands for Keyboard {
    fn is_pressed(&mut self, key: u8) -> bool {
        self.keys.get(key as usize).copied().unwrap_or(false)
    }

    fn wait_for_key(&mut self, stop: &StopSignal) -> Option<u8> {
        if stop.is_stopped() {
            return None;
        }
        self.presses.pop_front()
    }
}

/// A display that publishes a copy of every frame, so that an other thread
/// can pick up the latest one.
#[derive(Clone)]
pub struct SharedDisplay {
    frame: Arc<Mutex<Frame>>,
    frames: Arc<AtomicUsize>,
    closed: Arc<AtomicBool>,
}

impl SharedDisplay {
    pub fn new() -> Self {
        Self {
            frame: Arc::new(Mutex::new([[false; display::WIDTH]; display::HEIGHT])),
            frames: Arc::new(AtomicUsize::new(0)),
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// A copy of the last published frame.
    pub fn snapshot(&self) -> Frame {
        *self.frame.lock()
    }

    /// How many frames were published so far.
    pub fn frames(&self) -> usize {
        self.frames.load(Ordering::Acquire)
    }

    /// Marks the display as closed, which ends the run loop on its next iteration.
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }
}

impl Default for SharedDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplayCommands for SharedDisplay {
    fn display(&mut self, pixels: &Frame) {
        *self.frame.lock() = *pixels;
        self.frames.fetch_add(1, Ordering::AcqRel);
    }

    fn is_open(&mut self) -> bool {
        !self.closed.load(Ordering::Acquire)
    }
}

/// A tone device that stays silent.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoSound;

impl SoundCommands for NoSound {
    fn play(&mut self) {}
}
