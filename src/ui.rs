//! Terminal console using crossterm
//!
//! The session loop talks to the operator through the [`Console`]
//! trait so it can be driven by a scripted console in tests. The real
//! implementation, [`Screen`], runs the terminal in raw mode and
//! builds line input out of crossterm key events, which also gives us
//! a true zero-timeout readiness poll for draining stray keystrokes.

use std::io::{self, Stdout, Write};
use std::time::Duration;

use crossterm::{
    cursor::MoveTo,
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute, queue,
    style::Print,
    terminal::{self, Clear, ClearType},
};

/// Operator-facing side of the session loop
pub trait Console {
    /// Clear the screen
    fn clear(&mut self) -> io::Result<()>;

    /// Print one line
    fn line(&mut self, text: &str) -> io::Result<()>;

    /// Discard any operator input that is already buffered, without
    /// blocking. Keystrokes typed while the client was waiting on the
    /// server would otherwise be read back as the next answer.
    fn drain_input(&mut self) -> io::Result<()>;

    /// Block until the operator enters one line
    fn read_line(&mut self, prompt: &str) -> io::Result<String>;
}

/// Crossterm-backed console in raw mode
pub struct Screen {
    stdout: Stdout,
}

impl Screen {
    pub fn new() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self {
            stdout: io::stdout(),
        })
    }
}

impl Console for Screen {
    fn clear(&mut self) -> io::Result<()> {
        execute!(self.stdout, Clear(ClearType::All), MoveTo(0, 0))
    }

    fn line(&mut self, text: &str) -> io::Result<()> {
        // Raw mode: \n alone does not return the carriage
        queue!(self.stdout, Print(text), Print("\r\n"))?;
        self.stdout.flush()
    }

    fn drain_input(&mut self) -> io::Result<()> {
        while event::poll(Duration::ZERO)? {
            let _ = event::read()?;
        }
        Ok(())
    }

    fn read_line(&mut self, prompt: &str) -> io::Result<String> {
        queue!(self.stdout, Print(prompt))?;
        self.stdout.flush()?;

        let mut input = String::new();
        loop {
            let Event::Key(key) = event::read()? else {
                continue;
            };
            if key.kind == KeyEventKind::Release {
                continue;
            }
            match key.code {
                KeyCode::Enter => {
                    queue!(self.stdout, Print("\r\n"))?;
                    self.stdout.flush()?;
                    return Ok(input);
                }
                // Ctrl+C behaves like the quit keyword
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    queue!(self.stdout, Print("\r\n"))?;
                    self.stdout.flush()?;
                    return Ok("q".to_string());
                }
                KeyCode::Backspace => {
                    if input.pop().is_some() {
                        queue!(self.stdout, Print("\x08 \x08"))?;
                        self.stdout.flush()?;
                    }
                }
                KeyCode::Char(c) => {
                    input.push(c);
                    queue!(self.stdout, Print(c))?;
                    self.stdout.flush()?;
                }
                _ => {}
            }
        }
    }
}

impl Drop for Screen {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}
