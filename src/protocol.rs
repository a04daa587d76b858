//! Wire commands and operator input validation
//!
//! The controller speaks a tiny plain-text protocol over TCP:
//!
//! - `"0"`: status request, the server answers with the current duty cycle
//! - `"1 {duty} {fade}"`: set the duty cycle, fading over `{fade}` ms
//! - `"1 0 0"`: shutdown, resets the duty cycle to zero
//!
//! There is no framing and no delimiters; each command is sent as one
//! write and the server replies (to a status request only) with raw
//! text read in a single bounded recv.

use std::fmt;

use thiserror::Error;

/// Lowest accepted duty cycle, in percent
pub const DUTY_MIN: i32 = -100;
/// Highest accepted duty cycle, in percent
pub const DUTY_MAX: i32 = 100;

/// Operator input that could not be turned into a command.
///
/// Carries the raw text so the next screen can name exactly what was
/// rejected. Recoverable: the session keeps running and nothing is
/// sent to the server for that iteration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0} is not a valid entry.")]
pub struct InputError(pub String);

impl InputError {
    /// The raw rejected text
    pub fn raw(&self) -> &str {
        &self.0
    }
}

/// A duty cycle percentage, validated to lie in [-100, 100]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DutyCycle(i32);

impl DutyCycle {
    /// Validate an already-parsed integer
    pub fn new(value: i32) -> Option<Self> {
        if (DUTY_MIN..=DUTY_MAX).contains(&value) {
            Some(Self(value))
        } else {
            None
        }
    }

    /// Parse operator text as a duty cycle
    pub fn parse(text: &str) -> Result<Self, InputError> {
        text.trim()
            .parse::<i32>()
            .ok()
            .and_then(Self::new)
            .ok_or_else(|| InputError(text.to_string()))
    }

    pub fn value(&self) -> i32 {
        self.0
    }
}

impl fmt::Display for DutyCycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A fade duration in milliseconds, validated non-negative
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FadeTime(i32);

impl FadeTime {
    pub const NONE: FadeTime = FadeTime(0);

    pub fn new(millis: i32) -> Option<Self> {
        if millis >= 0 {
            Some(Self(millis))
        } else {
            None
        }
    }

    pub fn millis(&self) -> i32 {
        self.0
    }
}

/// A client-to-server command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Ask for the current duty cycle
    Status,
    /// Set a new duty cycle, fading over the given time
    Set { duty: DutyCycle, fade: FadeTime },
    /// Reset the duty cycle to zero before disconnecting
    Shutdown,
}

impl Command {
    /// Encode the command as wire text
    pub fn encode(&self) -> String {
        match self {
            Command::Status => "0".to_string(),
            Command::Set { duty, fade } => format!("1 {} {}", duty.value(), fade.millis()),
            Command::Shutdown => "1 0 0".to_string(),
        }
    }
}

/// Parse direct-mode input: a single duty cycle value
pub fn parse_direct(text: &str) -> Result<(DutyCycle, FadeTime), InputError> {
    let duty = DutyCycle::parse(text)?;
    Ok((duty, FadeTime::NONE))
}

/// Parse fade-mode input: `{duty},{fade}` with fade in milliseconds
pub fn parse_fade(text: &str) -> Result<(DutyCycle, FadeTime), InputError> {
    let reject = || InputError(text.to_string());

    let (duty_str, fade_str) = text.trim().split_once(',').ok_or_else(reject)?;
    let duty = DutyCycle::parse(duty_str).map_err(|_| reject())?;
    let fade = fade_str
        .trim()
        .parse::<i32>()
        .ok()
        .and_then(FadeTime::new)
        .ok_or_else(reject)?;

    Ok((duty, fade))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duty_range() {
        assert_eq!(DutyCycle::parse("0").unwrap().value(), 0);
        assert_eq!(DutyCycle::parse("-100").unwrap().value(), -100);
        assert_eq!(DutyCycle::parse("100").unwrap().value(), 100);
        assert_eq!(DutyCycle::parse(" 50 ").unwrap().value(), 50);

        assert!(DutyCycle::parse("101").is_err());
        assert!(DutyCycle::parse("-101").is_err());
        assert!(DutyCycle::parse("150").is_err());
    }

    #[test]
    fn test_duty_not_a_number() {
        for bad in ["abc", "", "12.5", "1 0", "q", "--5"] {
            let err = DutyCycle::parse(bad).unwrap_err();
            assert_eq!(err.raw(), bad);
        }
    }

    #[test]
    fn test_input_error_message() {
        let err = DutyCycle::parse("150").unwrap_err();
        assert_eq!(err.to_string(), "150 is not a valid entry.");
    }

    #[test]
    fn test_command_encoding() {
        assert_eq!(Command::Status.encode(), "0");
        assert_eq!(Command::Shutdown.encode(), "1 0 0");

        let (duty, fade) = parse_direct("50").unwrap();
        assert_eq!(Command::Set { duty, fade }.encode(), "1 50 0");

        let (duty, fade) = parse_direct("-75").unwrap();
        assert_eq!(Command::Set { duty, fade }.encode(), "1 -75 0");
    }

    #[test]
    fn test_direct_mode_always_zero_fade() {
        for v in [-100, -1, 0, 1, 100] {
            let (duty, fade) = parse_direct(&v.to_string()).unwrap();
            assert_eq!(Command::Set { duty, fade }.encode(), format!("1 {} 0", v));
        }
    }

    #[test]
    fn test_fade_parsing() {
        let (duty, fade) = parse_fade("40,2000").unwrap();
        assert_eq!(Command::Set { duty, fade }.encode(), "1 40 2000");

        let (duty, fade) = parse_fade(" -20 , 500 ").unwrap();
        assert_eq!(Command::Set { duty, fade }.encode(), "1 -20 500");

        // Missing fade time
        assert!(parse_fade("40").is_err());
        // Negative fade time
        assert!(parse_fade("40,-5").is_err());
        // Out-of-range duty
        assert!(parse_fade("150,100").is_err());
        // Raw text is preserved whole
        assert_eq!(parse_fade("40,-5").unwrap_err().raw(), "40,-5");
    }
}
