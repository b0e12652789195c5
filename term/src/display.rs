//! Renders the framebuffer into the terminal with tui.
use std::io::{self, Stdout, Write};

use anyhow::Result;
use chip::{
    definitions::display,
    devices::{DisplayCommands, Frame},
};
use crossterm::{
    cursor, execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use tui::{
    backend::CrosstermBackend,
    layout::Rect,
    text::Spans,
    widgets::{Block, Borders, Paragraph},
    Terminal,
};

const PIXEL_ON: char = '█';
const PIXEL_OFF: char = ' ';

/// Will turn every row of the frame into a line of text.
pub fn frame_lines(frame: &Frame) -> Vec<String> {
    frame
        .iter()
        .map(|row| {
            row.iter()
                .map(|pixel| if *pixel { PIXEL_ON } else { PIXEL_OFF })
                .collect()
        })
        .collect()
}

/// The terminal as a display, it takes over the terminal (alternate screen and raw
/// mode) until it is dropped.
pub struct TerminalDisplay {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    title: String,
    failed: bool,
}

impl TerminalDisplay {
    pub fn new(name: &str) -> Result<Self> {
        terminal::enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, cursor::Hide)?;

        let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        terminal.clear()?;

        Ok(Self {
            terminal,
            title: format!("CHIP-8 - {} (Esc to quit)", name),
            failed: false,
        })
    }

    fn draw(&mut self, frame: &Frame) -> io::Result<()> {
        let lines: Vec<Spans> = frame_lines(frame).into_iter().map(Spans::from).collect();
        let title = self.title.as_str();

        self.terminal.draw(|f| {
            // the frame plus the border
            let area = Rect::new(0, 0, display::WIDTH as u16 + 2, display::HEIGHT as u16 + 2)
                .intersection(f.size());
            let paragraph =
                Paragraph::new(lines).block(Block::default().title(title).borders(Borders::ALL));
            f.render_widget(paragraph, area);
        })?;
        Ok(())
    }
}

impl DisplayCommands for TerminalDisplay {
    fn display(&mut self, pixels: &Frame) {
        if let Err(err) = self.draw(pixels) {
            log::error!("unable to draw onto the terminal: {}", err);
            self.failed = true;
        }
    }

    fn is_open(&mut self) -> bool {
        !self.failed
    }
}

impl Drop for TerminalDisplay {
    fn drop(&mut self) {
        let backend = self.terminal.backend_mut();
        if let Err(err) = execute!(backend, LeaveAlternateScreen, cursor::Show) {
            log::error!("unable to leave the alternate screen: {}", err);
        }
        if let Err(err) = backend.flush() {
            log::error!("unable to flush the terminal: {}", err);
        }
        if let Err(err) = terminal::disable_raw_mode() {
            log::error!("unable to leave the raw mode: {}", err);
        }
    }
}
