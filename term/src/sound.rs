use std::{
    io::{self, Write},
    time::{Duration, Instant},
};

use chip::devices::SoundCommands;

/// The terminal bell
const BEL: u8 = 0x07;

/// The timers tick far more often than a terminal can ring, so a tone that keeps on
/// going only rings once per gap.
const RING_GAP: Duration = Duration::from_millis(100);

/// Rings the bell of the terminal it writes to.
pub struct Bell<W: Write> {
    out: W,
    last: Option<Instant>,
}

impl Bell<io::Stdout> {
    pub fn new() -> Self {
        Self::with_writer(io::stdout())
    }
}

impl<W: Write> Bell<W> {
    pub fn with_writer(out: W) -> Self {
        Self { out, last: None }
    }

    fn ring(&mut self) -> io::Result<()> {
        self.out.write_all(&[BEL])?;
        self.out.flush()
    }
}

impl<W: Write> SoundCommands for Bell<W> {
    fn play(&mut self) {
        if matches!(self.last, Some(last) if last.elapsed() < RING_GAP) {
            return;
        }
        self.last = Some(Instant::now());
        if let Err(err) = self.ring() {
            log::warn!("unable to ring the bell: {}", err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_bell_rings_once_per_gap() {
        let mut bell = Bell::with_writer(Vec::new());

        bell.play();
        bell.play();
        bell.play();
        assert_eq!(vec![BEL], bell.out);

        thread::sleep(RING_GAP + Duration::from_millis(10));
        bell.play();
        assert_eq!(vec![BEL, BEL], bell.out);
    }
}
