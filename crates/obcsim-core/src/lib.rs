//! # OBC Simulator Core Library
//!
//! Lets a workstation stand in for the onboard computer while firmware is
//! brought up on the bench.

//!
//! This library provides:
//! - A session manager for a UART bridge adapter (Bus Pirate style)
//! - Payload framing and echo decoding for the adapter's text protocol
//! - Typed requests for the firmware's JSON command set
//! - A persisted bridge configuration
//!
//! ## Example
//!
//! ```rust,ignore
//! use obcsim_core::{config::BridgeConfig, bridge::Session, obc::ObcRequest};
//!
//! let config = BridgeConfig::load("bridge.json".as_ref())?;
//! let mut session = Session::establish(&config)?;
//!
//! let echoed = session.transmit(ObcRequest::FwVersion.to_json()?)?;
//! println!("{}", echoed);
//!
//! session.close()?;
//! ```

#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod bridge;
pub mod config;
pub mod obc;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::bridge::{BridgeError, Payload, Session, SessionState, UartSettings};
    pub use crate::config::BridgeConfig;
    pub use crate::obc::{Axis, ObcReply, ObcRequest, WheelDirection};
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
