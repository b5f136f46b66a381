//! UART Bridge Adapter
//!
//! Drives a bus adapter (Bus Pirate style firmware) into UART passthrough mode
//! and exchanges framed payloads with the microcontroller on the far side of it.
//!
//! The adapter has no acknowledgment channel: configuration is fire-and-forget
//! and paced only by a fixed settle delay after every command.

pub mod commands;
pub mod decoder;
mod error;
pub mod framer;
pub mod monitor;
pub mod serial;
mod session;
pub mod transport;
pub mod uart;

pub use commands::AdapterCommand;
pub use decoder::{decode, ReceivedLine};
pub use error::BridgeError;
pub use framer::{frame, Payload};
pub use serial::{list_ports, open_port, PortInfo};
pub use session::{Session, SessionState};
pub use transport::{SerialTransport, Transport};
pub use uart::{DisplayFormat, IdleLevel, OutputLevel, ParityMode, StopBits, UartBaud, UartSettings};

/// Default baud rate of the USB link to the adapter
pub const DEFAULT_ADAPTER_BAUD: u32 = 115200;

/// Default read timeout in milliseconds
pub const DEFAULT_READ_TIMEOUT_MS: u64 = 100;

/// Settle time after every write, in milliseconds
pub const DEFAULT_MIN_DELAY_MS: u64 = 100;

/// Message delimiter understood by the firmware under test
pub const DEFAULT_DELIMITER: char = '!';

/// Prefix the adapter puts in front of every byte it reads off the UART
pub const ECHO_PREFIX: &str = "READ: ";
