//! Interactive control session
//!
//! Drives the poll/display/input cycle against the controller:
//! ask the server for the current duty cycle, redraw the screen, read
//! one line from the operator, and either forward a validated update,
//! remember a bad entry for the next redraw, or quit.
//!
//! Rejected input never reaches the server; the iteration simply
//! restarts at the next poll with the bad text queued for display.

use std::io::{Read, Write};

use tracing::info;

use crate::client::Controller;
use crate::protocol::{self, DutyCycle, FadeTime, InputError, DUTY_MAX, DUTY_MIN};
use crate::ui::Console;

/// The word that ends the session
pub const QUIT_KEYWORD: &str = "q";

/// Whether updates carry a fade time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Duty cycle changes take effect immediately
    Direct,
    /// The operator supplies a duty cycle and a fade time in ms
    Fade,
}

/// Carry-over from the previous iteration's input
#[derive(Debug, Clone, PartialEq, Eq)]
enum PendingInput {
    Clean,
    Invalid(InputError),
}

/// What one line of operator input asks for
#[derive(Debug, Clone, PartialEq, Eq)]
enum Action {
    Quit,
    Set { duty: DutyCycle, fade: FadeTime },
    Rejected(InputError),
}

/// Interpret one line of operator input
fn interpret(input: &str, mode: Mode) -> Action {
    if input.trim() == QUIT_KEYWORD {
        return Action::Quit;
    }
    // The parsers tolerate whitespace padding themselves; handing
    // them the untrimmed line keeps the exact raw text in the error
    let parsed = match mode {
        Mode::Direct => protocol::parse_direct(input),
        Mode::Fade => protocol::parse_fade(input),
    };
    match parsed {
        Ok((duty, fade)) => Action::Set { duty, fade },
        Err(err) => Action::Rejected(err),
    }
}

/// The session loop
pub struct Session<T: Read + Write, C: Console> {
    controller: Controller<T>,
    console: C,
    mode: Mode,
}

impl<T: Read + Write, C: Console> Session<T, C> {
    pub fn new(controller: Controller<T>, console: C, mode: Mode) -> Self {
        Self {
            controller,
            console,
            mode,
        }
    }

    /// Run until the operator quits.
    ///
    /// I/O errors from the socket or the terminal propagate out and
    /// end the process; there is no reconnect.
    pub fn run(&mut self) -> std::io::Result<()> {
        let mut pending = PendingInput::Clean;

        loop {
            let duty = self.controller.poll()?;

            self.console.clear()?;
            if let PendingInput::Invalid(err) =
                std::mem::replace(&mut pending, PendingInput::Clean)
            {
                self.console.line(&err.to_string())?;
                self.console.line("")?;
            }

            // Keystrokes typed while we were blocked on the server
            // must not become the next answer
            self.console.drain_input()?;

            self.console.line(&format!("Current duty cycle is {}%.", duty))?;
            self.console.line(&self.instructions())?;
            let input = self.console.read_line("> ")?;
            self.console.clear()?;

            match interpret(&input, self.mode) {
                Action::Quit => {
                    info!("operator quit, resetting duty cycle");
                    self.controller.shutdown()?;
                    self.console.line("Goodbye!")?;
                    return Ok(());
                }
                Action::Set { duty, fade } => {
                    info!("setting duty cycle to {} (fade {} ms)", duty, fade.millis());
                    self.controller.set(duty, fade)?;
                }
                Action::Rejected(err) => {
                    info!("rejected input: {:?}", err.raw());
                    pending = PendingInput::Invalid(err);
                }
            }
        }
    }

    fn instructions(&self) -> String {
        match self.mode {
            Mode::Direct => format!(
                "Enter new duty cycle between {} and {} or {} to quit.",
                DUTY_MIN, DUTY_MAX, QUIT_KEYWORD
            ),
            Mode::Fade => format!(
                "Enter new duty cycle between {} and {} and a fade time in ms, \
                 separated by a comma, or {} to quit.",
                DUTY_MIN, DUTY_MAX, QUIT_KEYWORD
            ),
        }
    }
}
