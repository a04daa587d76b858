//! TCP controller connection
//!
//! Owns the socket to the controller for the lifetime of the program.
//! All traffic is sequential request/response with no framing: a
//! status request is answered by one bounded read, updates and the
//! final shutdown get no reply.
//!
//! Failure model: connecting is the only recoverable point (it is
//! reported and the process exits). Once connected, send/recv errors
//! propagate up as fatal: no retries, no timeouts, a dead server
//! either blocks the next read forever or surfaces as an I/O error.

use std::io::{self, Read, Write};
use std::net::TcpStream;

use thiserror::Error;
use tracing::{debug, info};

use crate::protocol::{Command, DutyCycle, FadeTime};

/// Largest server response accepted in one read
const MAX_RESPONSE: usize = 128;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Failed to connect to {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: io::Error,
    },
}

/// A connection to the duty-cycle controller
pub struct Controller<T: Read + Write> {
    stream: T,
}

impl Controller<TcpStream> {
    /// Establish the connection. Blocks until connected or failed;
    /// failure is terminal for the caller.
    pub fn connect(addr: &str) -> Result<Self, ClientError> {
        info!("connecting to {}", addr);
        let stream = TcpStream::connect(addr).map_err(|source| ClientError::Connect {
            addr: addr.to_string(),
            source,
        })?;
        info!("connected");
        Ok(Self { stream })
    }
}

impl<T: Read + Write> Controller<T> {
    /// Wrap an existing transport
    pub fn new(stream: T) -> Self {
        Self { stream }
    }

    /// Ask the server for the current duty cycle.
    ///
    /// Sends a status request and performs exactly one bounded read.
    /// The response is opaque to the client: whatever text the server
    /// sends back is returned (lossily decoded, trimmed) for display
    /// as-is, never parsed or validated.
    pub fn poll(&mut self) -> io::Result<String> {
        self.send(Command::Status)?;

        let mut buf = [0u8; MAX_RESPONSE];
        let n = self.stream.read(&mut buf)?;
        let text = String::from_utf8_lossy(&buf[..n]).trim().to_string();
        debug!("status response: {:?}", text);
        Ok(text)
    }

    /// Send a new duty cycle to the server
    pub fn set(&mut self, duty: DutyCycle, fade: FadeTime) -> io::Result<()> {
        self.send(Command::Set { duty, fade })
    }

    /// Tell the server to reset the duty cycle to zero
    pub fn shutdown(&mut self) -> io::Result<()> {
        self.send(Command::Shutdown)
    }

    /// Consume the controller and hand back the transport
    #[allow(dead_code)]
    pub fn into_inner(self) -> T {
        self.stream
    }

    fn send(&mut self, command: Command) -> io::Result<()> {
        let text = command.encode();
        debug!("send: {:?}", text);
        self.stream.write_all(text.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::parse_direct;

    /// Transport double: records writes, serves scripted reads
    struct MockStream {
        sent: Vec<Vec<u8>>,
        responses: Vec<Vec<u8>>,
    }

    impl MockStream {
        fn new(responses: &[&str]) -> Self {
            Self {
                sent: Vec::new(),
                responses: responses.iter().rev().map(|r| r.as_bytes().to_vec()).collect(),
            }
        }

        fn sent_text(&self) -> Vec<String> {
            self.sent
                .iter()
                .map(|b| String::from_utf8_lossy(b).to_string())
                .collect()
        }
    }

    impl Read for MockStream {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let data = self.responses.pop().unwrap_or_default();
            let n = data.len().min(buf.len());
            buf[..n].copy_from_slice(&data[..n]);
            Ok(n)
        }
    }

    impl Write for MockStream {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.sent.push(buf.to_vec());
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_poll_sends_status_and_returns_response() {
        let mut ctl = Controller::new(MockStream::new(&["42"]));
        let duty = ctl.poll().unwrap();
        assert_eq!(duty, "42");
        assert_eq!(ctl.stream.sent_text(), vec!["0"]);
    }

    #[test]
    fn test_response_is_opaque() {
        // Garbage from the server is displayed, not rejected
        let mut ctl = Controller::new(MockStream::new(&["not a number\n"]));
        assert_eq!(ctl.poll().unwrap(), "not a number");
    }

    #[test]
    fn test_set_wire_format() {
        let mut ctl = Controller::new(MockStream::new(&[]));
        let (duty, fade) = parse_direct("50").unwrap();
        ctl.set(duty, fade).unwrap();
        assert_eq!(ctl.stream.sent_text(), vec!["1 50 0"]);
    }

    #[test]
    fn test_shutdown_wire_format() {
        let mut ctl = Controller::new(MockStream::new(&[]));
        ctl.shutdown().unwrap();
        assert_eq!(ctl.stream.sent_text(), vec!["1 0 0"]);
    }
}
