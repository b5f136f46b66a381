//! Line-oriented transport to the adapter

use serialport::SerialPort;
use std::io::{self, Read, Write};
use std::time::{Duration, Instant};

use super::serial::open_port;
use super::BridgeError;

/// Line terminator appended to every write
pub const LINE_TERMINATOR: &[u8] = b"\n";

/// Abstraction over the duplex channel to the adapter (a USB-serial port in
/// practice, a scripted fake in tests)
pub trait Transport: Send {
    /// Whether the channel is open
    fn is_open(&self) -> bool;

    /// Write `data` followed by the line terminator, then wait for the
    /// adapter to settle
    fn write_line(&mut self, data: &[u8]) -> Result<(), BridgeError>;

    /// Drain the complete lines buffered so far. Never blocks longer than the
    /// read timeout; returns an empty vec when nothing arrived.
    fn read_lines(&mut self) -> Result<Vec<String>, BridgeError>;

    /// Discard pending input and output. No-op when closed.
    fn flush(&mut self) -> Result<(), BridgeError>;

    /// Close the channel. Idempotent.
    fn close(&mut self) -> Result<(), BridgeError>;
}

/// Split complete lines off the front of `pending`, leaving any partial line.
///
/// Only the line terminator is stripped (`\n` and a preceding `\r`), so a line
/// that is an echoed space keeps its space.
pub fn split_lines(pending: &mut Vec<u8>) -> Vec<String> {
    let mut lines = Vec::new();
    while let Some(pos) = pending.iter().position(|&b| b == b'\n') {
        let mut line: Vec<u8> = pending.drain(..=pos).collect();
        line.pop();
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        lines.push(String::from_utf8_lossy(&line).into_owned());
    }
    lines
}

/// Serial port transport
pub struct SerialTransport {
    port: Option<Box<dyn SerialPort>>,
    name: String,
    timeout: Duration,
    min_delay: Duration,
    pending: Vec<u8>,
}

impl SerialTransport {
    /// Open `device` at `baud`.
    ///
    /// Fails with `TransportUnavailable` if the device cannot be opened.
    pub fn open(
        device: &str,
        baud: u32,
        timeout: Duration,
        min_delay: Duration,
    ) -> Result<Self, BridgeError> {
        let port = open_port(device, baud, timeout)?;
        tracing::debug!(device, baud, ?timeout, "opened serial transport");
        Self::from_port(port, device, timeout, min_delay)
    }

    /// Wrap an already opened port, applying `timeout` to it
    pub fn from_port(
        mut port: Box<dyn SerialPort>,
        name: &str,
        timeout: Duration,
        min_delay: Duration,
    ) -> Result<Self, BridgeError> {
        port.set_timeout(timeout)?;
        Ok(Self {
            port: Some(port),
            name: name.to_string(),
            timeout,
            min_delay,
            pending: Vec::new(),
        })
    }

    /// Device name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Settle delay applied after every write
    pub fn min_delay(&self) -> Duration {
        self.min_delay
    }

    fn port_mut(&mut self) -> Result<&mut Box<dyn SerialPort>, BridgeError> {
        self.port.as_mut().ok_or(BridgeError::NotOpen)
    }
}

impl Transport for SerialTransport {
    fn is_open(&self) -> bool {
        self.port.is_some()
    }

    fn write_line(&mut self, data: &[u8]) -> Result<(), BridgeError> {
        let min_delay = self.min_delay;
        let port = self.port_mut()?;
        port.write_all(data)?;
        port.write_all(LINE_TERMINATOR)?;
        std::thread::sleep(min_delay);
        Ok(())
    }

    /// Each read is limited to the time left before the deadline, so the
    /// whole call takes at most about one read timeout even while the adapter
    /// keeps talking.
    fn read_lines(&mut self) -> Result<Vec<String>, BridgeError> {
        let timeout = self.timeout;
        let deadline = Instant::now() + timeout;
        let port = self.port.as_mut().ok_or(BridgeError::NotOpen)?;
        let mut buf = [0u8; 256];

        let result: Result<(), BridgeError> = loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if let Err(e) = port.set_timeout(remaining) {
                break Err(e.into());
            }
            match port.read(&mut buf) {
                Ok(0) => break Ok(()),
                Ok(n) => self.pending.extend_from_slice(&buf[..n]),
                Err(e) if e.kind() == io::ErrorKind::TimedOut => break Ok(()),
                Err(e) => break Err(e.into()),
            }
            if Instant::now() >= deadline {
                break Ok(());
            }
        };

        // Writes share the port timeout
        port.set_timeout(timeout)?;
        result?;
        Ok(split_lines(&mut self.pending))
    }

    fn flush(&mut self) -> Result<(), BridgeError> {
        let min_delay = self.min_delay;
        let Some(port) = self.port.as_mut() else {
            return Ok(());
        };
        port.clear(serialport::ClearBuffer::Input)?;
        std::thread::sleep(min_delay);
        port.clear(serialport::ClearBuffer::Output)?;
        std::thread::sleep(min_delay);
        self.pending.clear();
        Ok(())
    }

    fn close(&mut self) -> Result<(), BridgeError> {
        if let Some(port) = self.port.take() {
            // Dropping the handle closes the file descriptor
            drop(port);
            std::thread::sleep(self.min_delay);
            tracing::debug!(device = %self.name, "closed serial transport");
        }
        self.pending.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_split_complete_lines() {
        let mut pending = b"READ: a\r\nREAD: b\n".to_vec();
        assert_eq!(split_lines(&mut pending), vec!["READ: a", "READ: b"]);
        assert!(pending.is_empty());
    }

    #[test]
    fn test_partial_line_kept() {
        let mut pending = b"READ: a\r\nUART>".to_vec();
        assert_eq!(split_lines(&mut pending), vec!["READ: a"]);
        assert_eq!(pending, b"UART>");

        pending.extend_from_slice(b"READ: z\r\n");
        assert_eq!(split_lines(&mut pending), vec!["UART>READ: z"]);
    }

    #[test]
    fn test_trailing_space_preserved() {
        let mut pending = b"READ:  \r\n".to_vec();
        assert_eq!(split_lines(&mut pending), vec!["READ:  "]);
    }

    #[test]
    fn test_nothing_buffered() {
        let mut pending = Vec::new();
        assert!(split_lines(&mut pending).is_empty());
    }

    #[cfg(unix)]
    fn pty_transport(timeout: Duration) -> (SerialTransport, serialport::TTYPort) {
        let (master, mut slave) = serialport::TTYPort::pair().unwrap();
        slave.set_timeout(Duration::from_secs(1)).unwrap();
        let transport =
            SerialTransport::from_port(Box::new(master), "pty", timeout, Duration::ZERO).unwrap();
        (transport, slave)
    }

    #[cfg(unix)]
    #[test]
    fn test_write_line_appends_terminator() {
        let (mut transport, mut slave) = pty_transport(Duration::from_millis(50));
        assert_eq!(transport.name(), "pty");
        assert_eq!(transport.min_delay(), Duration::ZERO);

        transport.write_line(b"\"hi!\"").unwrap();

        let mut received = [0u8; 6];
        slave.read_exact(&mut received).unwrap();
        assert_eq!(&received, b"\"hi!\"\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_read_lines_keeps_partial_line() {
        let (mut transport, mut slave) = pty_transport(Duration::from_millis(50));

        slave.write_all(b"READ: a\r\nREAD: b\r\nUART>").unwrap();
        assert_eq!(transport.read_lines().unwrap(), vec!["READ: a", "READ: b"]);

        assert!(transport.read_lines().unwrap().is_empty());

        slave.write_all(b"READ: c\r\n").unwrap();
        assert_eq!(transport.read_lines().unwrap(), vec!["UART>READ: c"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_read_lines_honours_timeout() {
        let (mut transport, _slave) = pty_transport(Duration::from_millis(10));

        let started = Instant::now();
        assert!(transport.read_lines().unwrap().is_empty());
        assert!(started.elapsed() < Duration::from_millis(80));
    }

    #[cfg(unix)]
    #[test]
    fn test_read_lines_bounded_while_streaming() {
        let (mut transport, mut slave) = pty_transport(Duration::from_millis(50));
        let writer = std::thread::spawn(move || {
            for _ in 0..40 {
                if slave.write_all(b"READ: x\r\n").is_err() {
                    break;
                }
                std::thread::sleep(Duration::from_millis(5));
            }
            slave
        });

        let started = Instant::now();
        transport.read_lines().unwrap();
        assert!(started.elapsed() < Duration::from_millis(150));

        let _slave = writer.join().unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn test_closed_transport() {
        let (mut transport, _slave) = pty_transport(Duration::from_millis(10));

        transport.close().unwrap();
        transport.close().unwrap();

        assert!(!transport.is_open());
        assert!(matches!(transport.write_line(b"x"), Err(BridgeError::NotOpen)));
        assert!(matches!(transport.read_lines(), Err(BridgeError::NotOpen)));
        assert!(transport.flush().is_ok());
    }

    #[test]
    fn test_open_missing_device() {
        let result = SerialTransport::open(
            "/dev/obcsim-does-not-exist",
            115200,
            Duration::from_millis(10),
            Duration::ZERO,
        );
        assert!(matches!(result, Err(BridgeError::TransportUnavailable(_))));
    }
}
