//! Bridge session lifecycle
//!
//! `Closed -> Configuring -> Idle -> Streaming -> Closed`. A session is
//! configured exactly once; reconfiguring needs a new session.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use super::{
    decoder::decode, AdapterCommand, BridgeError, Payload, ReceivedLine, SerialTransport,
    Transport, UartSettings,
};
use crate::config::BridgeConfig;

/// Session state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    /// Transport closed; terminal
    Closed,
    /// Transport open, adapter not yet configured
    Configuring,
    /// Adapter in UART mode, not echoing
    Idle,
    /// Adapter echoing UART traffic
    Streaming,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionState::Closed => "closed",
            SessionState::Configuring => "configuring",
            SessionState::Idle => "idle",
            SessionState::Streaming => "streaming",
        };
        f.write_str(s)
    }
}

/// A session with one bridge adapter.
///
/// Owns its transport. Not meant to be shared between threads; hand the whole
/// session to whichever thread drives it.
pub struct Session {
    transport: Box<dyn Transport>,
    state: SessionState,
    uart: UartSettings,
    delimiter: char,
    min_delay: Duration,
}

impl Session {
    /// Open the serial device named in `config`
    pub fn open(config: &BridgeConfig) -> Result<Self, BridgeError> {
        let transport = SerialTransport::open(
            &config.device,
            config.adapter_baud,
            config.read_timeout(),
            config.min_delay(),
        )?;
        Self::with_transport(Box::new(transport), config)
    }

    /// Open, configure and start streaming
    pub fn establish(config: &BridgeConfig) -> Result<Self, BridgeError> {
        let mut session = Self::open(config)?;
        session.configure()?;
        session.start_stream()?;
        Ok(session)
    }

    /// Start a session on an already opened transport
    pub fn with_transport(
        transport: Box<dyn Transport>,
        config: &BridgeConfig,
    ) -> Result<Self, BridgeError> {
        if !transport.is_open() {
            return Err(BridgeError::TransportUnavailable(
                "transport reports closed after open".to_string(),
            ));
        }
        tracing::info!("bridge session opened on {}", config.device);
        Ok(Self {
            transport,
            state: SessionState::Configuring,
            uart: config.uart,
            delimiter: config.delimiter,
            min_delay: config.min_delay(),
        })
    }

    /// Current state
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Whether the adapter is echoing UART traffic
    pub fn is_streaming(&self) -> bool {
        self.state == SessionState::Streaming
    }

    /// Baud rate of the bridged UART line
    pub fn uart_baud(&self) -> u32 {
        self.uart.baud.bps()
    }

    /// Settings the adapter is (or will be) configured with
    pub fn uart_settings(&self) -> &UartSettings {
        &self.uart
    }

    /// Settle delay after each command
    pub fn min_delay(&self) -> Duration {
        self.min_delay
    }

    /// Message delimiter appended by the framer
    pub fn delimiter(&self) -> char {
        self.delimiter
    }

    fn require_configured(&self) -> Result<(), BridgeError> {
        match self.state {
            SessionState::Idle | SessionState::Streaming => Ok(()),
            state => Err(BridgeError::NotConfigured(state.to_string())),
        }
    }

    fn write_command(&mut self, cmd: AdapterCommand) -> Result<(), BridgeError> {
        tracing::debug!("adapter command: {}", cmd);
        let mut buf = [0u8; 4];
        let encoded = cmd.as_char().encode_utf8(&mut buf);
        self.transport.write_line(encoded.as_bytes())
    }

    /// Send a single adapter command outside the configuration sequence
    pub fn send_command(&mut self, cmd: AdapterCommand) -> Result<(), BridgeError> {
        if self.state == SessionState::Closed {
            return Err(BridgeError::NotOpen);
        }
        self.write_command(cmd)
    }

    /// Run the configuration sequence.
    ///
    /// Fire-and-forget: the adapter never acknowledges, so success only
    /// means every command was written.
    pub fn configure(&mut self) -> Result<(), BridgeError> {
        if self.state != SessionState::Configuring {
            return Err(BridgeError::NotConfigured(format!(
                "cannot configure a session that is {}",
                self.state
            )));
        }
        for cmd in self.uart.command_sequence() {
            self.write_command(cmd)?;
        }
        self.state = SessionState::Idle;
        tracing::info!(
            "adapter configured for UART at {} baud",
            self.uart.baud.bps()
        );
        Ok(())
    }

    /// Tell the adapter to start echoing UART traffic
    pub fn start_stream(&mut self) -> Result<(), BridgeError> {
        self.require_configured()?;
        self.write_command(AdapterCommand::StartStream)?;
        self.state = SessionState::Streaming;
        Ok(())
    }

    /// Tell the adapter to stop echoing. Sent even if streaming was never
    /// started; the adapter ignores it then.
    pub fn stop_stream(&mut self) -> Result<(), BridgeError> {
        if self.state == SessionState::Closed {
            return Err(BridgeError::NotOpen);
        }
        self.write_command(AdapterCommand::StopStream)?;
        if self.state == SessionState::Streaming {
            self.state = SessionState::Idle;
        }
        Ok(())
    }

    /// Frame and send `payload`, then collect whatever the adapter echoed
    /// straight back
    pub fn transmit(&mut self, payload: impl Into<Payload>) -> Result<String, BridgeError> {
        self.require_configured()?;
        let payload = payload.into();
        let framed = payload.frame(self.delimiter)?;
        if let Payload::Text(text) = &payload {
            tracing::info!("[TX]: >>>{}<<<", text);
        }
        self.transport.write_line(framed.as_bytes())?;
        self.receive()
    }

    /// Pull whatever echo lines have arrived and reassemble them.
    ///
    /// An empty string means nothing arrived within the read timeout.
    pub fn receive(&mut self) -> Result<String, BridgeError> {
        self.require_configured()?;
        let lines = self.transport.read_lines()?;
        for line in &lines {
            if let ReceivedLine::Status(status) = ReceivedLine::classify(line) {
                tracing::debug!("adapter: {}", status);
            }
        }
        let received = decode(&lines);
        if received.is_empty() {
            tracing::info!("[RX]: >>>NONE<<<");
        } else {
            tracing::info!("[RX]: >>>{}<<<", received);
        }
        Ok(received)
    }

    /// Drain pending lines and return only the adapter's status text
    pub fn status_lines(&mut self) -> Result<Vec<String>, BridgeError> {
        if self.state == SessionState::Closed {
            return Err(BridgeError::NotOpen);
        }
        let lines = self.transport.read_lines()?;
        Ok(lines
            .iter()
            .filter_map(|line| match ReceivedLine::classify(line) {
                ReceivedLine::Status(status) => Some(status),
                ReceivedLine::Echo(_) => None,
            })
            .collect())
    }

    /// Tear the session down: stop streaming, flush, close.
    ///
    /// Stop and flush failures are logged and swallowed so the transport is
    /// always closed. Only the close itself can fail this call, and the
    /// session is `Closed` afterwards either way.
    pub fn close(&mut self) -> Result<(), BridgeError> {
        if self.state == SessionState::Closed {
            return Ok(());
        }

        if let Err(e) = self.stop_stream() {
            tracing::warn!("teardown: stop stream failed: {e}");
        }
        if let Err(e) = self.transport.flush() {
            tracing::warn!("teardown: flush failed: {e}");
        }
        self.state = SessionState::Closed;

        self.transport.close()?;
        if self.transport.is_open() {
            return Err(BridgeError::CloseFailed);
        }
        tracing::info!("bridge session closed");
        Ok(())
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            tracing::warn!("teardown on drop failed: {e}");
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("state", &self.state)
            .field("uart", &self.uart)
            .field("delimiter", &self.delimiter)
            .field("min_delay", &self.min_delay)
            .finish_non_exhaustive()
    }
}
