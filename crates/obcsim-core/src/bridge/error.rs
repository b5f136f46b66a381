//! Bridge errors

use thiserror::Error;

/// Errors that can occur while talking to the bridge adapter
#[derive(Error, Debug)]
pub enum BridgeError {
    /// Device missing or busy at open
    #[error("Transport unavailable: {0}")]
    TransportUnavailable(String),

    /// Operation on a closed channel
    #[error("Transport is not open")]
    NotOpen,

    /// Channel did not report closed after close
    #[error("Transport still reports open after close")]
    CloseFailed,

    /// Payload kind with no wire encoding
    #[error("Unsupported payload type: {0}")]
    UnsupportedPayloadType(&'static str),

    /// Operation not allowed in the current session state
    #[error("Adapter is not configured (session state: {0})")]
    NotConfigured(String),

    /// Error from the serial port driver
    #[error("Serial port error: {0}")]
    Serial(String),

    /// I/O error on the port
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serialport::Error> for BridgeError {
    fn from(e: serialport::Error) -> Self {
        BridgeError::Serial(e.to_string())
    }
}
