//! Outbound payload framing
//!
//! The adapter only flushes a write as one unit when it is wrapped in double
//! quotes. Its command grammar has no escape for an embedded double quote, so
//! those are replaced with apostrophes. That substitution is lossy.

use super::BridgeError;

const QUOTE: char = '"';
const QUOTE_SUBSTITUTE: char = '\'';

/// Application payload to send across the bridged UART
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// Text payload, framed and sent as-is
    Text(String),
    /// Integer payload. No wire encoding exists for these yet.
    Integer(i64),
}

impl Payload {
    /// Frame this payload for the adapter
    pub fn frame(&self, delimiter: char) -> Result<String, BridgeError> {
        match self {
            Payload::Text(text) => Ok(frame(text, delimiter)),
            Payload::Integer(_) => Err(BridgeError::UnsupportedPayloadType("integer")),
        }
    }
}

impl From<&str> for Payload {
    fn from(s: &str) -> Self {
        Payload::Text(s.to_string())
    }
}

impl From<String> for Payload {
    fn from(s: String) -> Self {
        Payload::Text(s)
    }
}

impl From<i64> for Payload {
    fn from(n: i64) -> Self {
        Payload::Integer(n)
    }
}

/// Frame a text payload: append `delimiter` unless it is already the last
/// character, substitute embedded double quotes, then wrap in double quotes.
pub fn frame(body: &str, delimiter: char) -> String {
    let mut delimited = String::with_capacity(body.len() + 3);
    delimited.push_str(body);
    if !delimited.ends_with(delimiter) {
        delimited.push(delimiter);
    }

    let mut framed = String::with_capacity(delimited.len() + 2);
    framed.push(QUOTE);
    framed.extend(delimited.chars().map(|c| if c == QUOTE { QUOTE_SUBSTITUTE } else { c }));
    framed.push(QUOTE);
    framed
}

/// Strip the wrapping quotes added by [`frame`], if present
pub fn unwrap_framed(framed: &str) -> &str {
    framed
        .strip_prefix(QUOTE)
        .and_then(|s| s.strip_suffix(QUOTE))
        .unwrap_or(framed)
}
