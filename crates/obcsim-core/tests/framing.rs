//! Framing and decoding through the public API

use obcsim_core::bridge::{decode, frame, framer::unwrap_framed, DEFAULT_DELIMITER};
use obcsim_core::obc::{Axis, ObcReply, ObcRequest};
use pretty_assertions::assert_eq;

const PAYLOADS: &[&str] = &[
    "",
    "a",
    "hello",
    "with space",
    "two!!marks",
    r#"say "hi""#,
    r#"{"pwm_rw_z":"write","value":12}"#,
];

#[test]
fn test_single_trailing_delimiter() {
    for &payload in PAYLOADS {
        let framed = frame(payload, '!');
        let inner = unwrap_framed(&framed);
        assert!(inner.ends_with('!'), "{framed}");
        if !payload.ends_with('!') {
            assert_eq!(inner.len(), payload.len() + 1);
        }
    }
}

#[test]
fn test_no_inner_double_quotes() {
    for &payload in PAYLOADS {
        let framed = frame(payload, '!');
        assert_eq!(framed.matches('"').count(), 2, "{framed}");
        assert!(framed.starts_with('"') && framed.ends_with('"'));
    }
}

#[test]
fn test_frame_is_stable_on_reframe() {
    for &payload in PAYLOADS {
        let once = frame(payload, '!');
        assert_eq!(frame(unwrap_framed(&once), '!'), once);
    }
}

#[test]
fn test_decode_single_char_echoes() {
    assert_eq!(decode(&["READ: a", "READ: b", "READ: !"]), "ab!");
    assert_eq!(decode::<&str>(&[]), "");
    assert_eq!(decode(&["status: ok"]), "");
}

#[test]
fn test_obc_request_framed() {
    let json = ObcRequest::ReadWheelPwm(Axis::X).to_json().unwrap();
    assert_eq!(
        frame(&json, DEFAULT_DELIMITER),
        "\"{'pwm_rw_x':'read'}!\""
    );
}

#[test]
fn test_obc_reply_from_echo() {
    let text = r#"{"hwVersion" : "1.2"}!"#;
    let lines: Vec<String> = text.chars().map(|c| format!("READ: {c}")).collect();
    let reply = ObcReply::parse(&decode(&lines), DEFAULT_DELIMITER).unwrap();
    assert_eq!(reply.key, "hwVersion");
}
