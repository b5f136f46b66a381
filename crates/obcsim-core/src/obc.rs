//! Onboard-computer requests
//!
//! The firmware under test parses one JSON object per message, keyed by the
//! command name, with the command name first. Requests are serialized by hand
//! so that key order survives.

use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Reaction wheel axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    /// X wheel
    X,
    /// Y wheel
    Y,
    /// Z wheel
    Z,
}

impl Axis {
    fn suffix(&self) -> &'static str {
        match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
        }
    }
}

/// Reaction wheel spin direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WheelDirection {
    /// "clock"
    Clockwise,
    /// "antiClock"
    AntiClockwise,
}

impl WheelDirection {
    /// Name used on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            WheelDirection::Clockwise => "clock",
            WheelDirection::AntiClockwise => "antiClock",
        }
    }
}

/// A request the firmware's JSON command table understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObcRequest {
    /// Firmware version
    FwVersion,
    /// Hardware version
    HwVersion,
    /// Current PWM duty of a wheel
    ReadWheelPwm(Axis),
    /// Set the PWM duty of a wheel
    WriteWheelPwm(Axis, u16),
    /// Current spin direction of a wheel
    ReadWheelDir(Axis),
    /// Set the spin direction of a wheel
    WriteWheelDir(Axis, WheelDirection),
}

impl ObcRequest {
    /// Command key of this request
    pub fn key(&self) -> String {
        match self {
            ObcRequest::FwVersion => "fwVersion".to_string(),
            ObcRequest::HwVersion => "hwVersion".to_string(),
            ObcRequest::ReadWheelPwm(axis) | ObcRequest::WriteWheelPwm(axis, _) => {
                format!("pwm_rw_{}", axis.suffix())
            }
            ObcRequest::ReadWheelDir(axis) | ObcRequest::WriteWheelDir(axis, _) => {
                format!("dir_rw_{}", axis.suffix())
            }
        }
    }

    /// Serialize to the JSON text the firmware expects
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl Serialize for ObcRequest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let key = self.key();
        match self {
            ObcRequest::FwVersion
            | ObcRequest::HwVersion
            | ObcRequest::ReadWheelPwm(_)
            | ObcRequest::ReadWheelDir(_) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry(&key, "read")?;
                map.end()
            }
            ObcRequest::WriteWheelPwm(_, pwm) => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry(&key, "write")?;
                map.serialize_entry("value", pwm)?;
                map.end()
            }
            ObcRequest::WriteWheelDir(_, dir) => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry(&key, "write")?;
                map.serialize_entry("value", dir.as_str())?;
                map.end()
            }
        }
    }
}

impl fmt::Display for ObcRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_json() {
            Ok(json) => f.write_str(&json),
            Err(_) => f.write_str(&self.key()),
        }
    }
}

/// A reply from the firmware, e.g. `{"pwm_rw_x" : 55}`
#[derive(Debug, Clone, PartialEq)]
pub struct ObcReply {
    /// Command key the reply answers
    pub key: String,
    /// Reported value
    pub value: Value,
}

impl ObcReply {
    /// Parse a reassembled reply, ignoring a trailing message delimiter.
    ///
    /// Returns `None` for anything that is not a single-key JSON object.
    pub fn parse(text: &str, delimiter: char) -> Option<Self> {
        let trimmed = text.trim();
        let body = trimmed.strip_suffix(delimiter).unwrap_or(trimmed);
        let map: Map<String, Value> = serde_json::from_str(body).ok()?;
        let mut entries = map.into_iter();
        let (key, value) = entries.next()?;
        if entries.next().is_some() {
            return None;
        }
        Some(Self { key, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_read_requests() {
        assert_eq!(ObcRequest::FwVersion.to_json().unwrap(), r#"{"fwVersion":"read"}"#);
        assert_eq!(ObcRequest::HwVersion.to_json().unwrap(), r#"{"hwVersion":"read"}"#);
        assert_eq!(
            ObcRequest::ReadWheelPwm(Axis::Y).to_json().unwrap(),
            r#"{"pwm_rw_y":"read"}"#
        );
        assert_eq!(
            ObcRequest::ReadWheelDir(Axis::Z).to_json().unwrap(),
            r#"{"dir_rw_z":"read"}"#
        );
    }

    #[test]
    fn test_write_requests_keep_key_first() {
        assert_eq!(
            ObcRequest::WriteWheelPwm(Axis::X, 55).to_json().unwrap(),
            r#"{"pwm_rw_x":"write","value":55}"#
        );
        assert_eq!(
            ObcRequest::WriteWheelDir(Axis::Y, WheelDirection::AntiClockwise)
                .to_json()
                .unwrap(),
            r#"{"dir_rw_y":"write","value":"antiClock"}"#
        );
    }

    #[test]
    fn test_parse_reply() {
        let reply = ObcReply::parse(r#"{"pwm_rw_x" : 55}!"#, '!').unwrap();
        assert_eq!(reply.key, "pwm_rw_x");
        assert_eq!(reply.value, Value::from(55));

        let reply = ObcReply::parse(r#"{"dir_rw_y":"written"}"#, '!').unwrap();
        assert_eq!(reply.value, Value::from("written"));
    }

    #[test]
    fn test_parse_reply_rejects_noise() {
        assert_eq!(ObcReply::parse("", '!'), None);
        assert_eq!(ObcReply::parse("garbage", '!'), None);
        assert_eq!(ObcReply::parse(r#"{"a":1,"b":2}"#, '!'), None);
    }
}
