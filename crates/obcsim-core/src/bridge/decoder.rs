//! Inbound line decoding
//!
//! In streaming mode the adapter prints one line per byte it reads off the
//! UART, prefixed with [`ECHO_PREFIX`]. Anything else it prints is status text.

use super::ECHO_PREFIX;

/// A line read from the adapter, classified
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReceivedLine {
    /// A byte echoed off the bridged UART
    Echo(char),
    /// Menu prompts, mode banners and other adapter chatter
    Status(String),
}

impl ReceivedLine {
    /// Classify a raw line.
    ///
    /// The prefix may appear after a prompt that was left without a newline,
    /// so it is searched for anywhere in the line. Only the first character
    /// after the prefix is kept. A prefix with nothing after it is status.
    pub fn classify(line: &str) -> Self {
        line.find(ECHO_PREFIX)
            .and_then(|idx| line[idx + ECHO_PREFIX.len()..].chars().next())
            .map(ReceivedLine::Echo)
            .unwrap_or_else(|| ReceivedLine::Status(line.trim_end().to_string()))
    }

    /// Echoed character, if this is an echo line
    pub fn echo(&self) -> Option<char> {
        match self {
            ReceivedLine::Echo(c) => Some(*c),
            ReceivedLine::Status(_) => None,
        }
    }
}

/// Reassemble the UART stream from a batch of lines, in read order.
///
/// Returns an empty string when no line carried an echo.
pub fn decode<S: AsRef<str>>(lines: &[S]) -> String {
    lines
        .iter()
        .filter_map(|line| ReceivedLine::classify(line.as_ref()).echo())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_decode_empty() {
        let lines: [&str; 0] = [];
        assert_eq!(decode(&lines), "");
    }

    #[test]
    fn test_decode_status_only() {
        assert_eq!(decode(&["status: ok"]), "");
    }

    #[test]
    fn test_decode_echo_lines() {
        assert_eq!(decode(&["READ: a", "READ: b", "READ: !"]), "ab!");
    }

    #[test]
    fn test_decode_skips_chatter() {
        let lines = ["UART>{", "READ: h", "Raw UTF8", "READ: i"];
        assert_eq!(decode(&lines), "hi");
    }

    #[test]
    fn test_only_first_char_kept() {
        assert_eq!(decode(&["READ: xyz"]), "x");
    }

    #[test]
    fn test_prefix_after_prompt() {
        assert_eq!(ReceivedLine::classify("UART>READ: q"), ReceivedLine::Echo('q'));
    }

    #[test]
    fn test_space_is_echoed() {
        assert_eq!(decode(&["READ:  ", "READ: x"]), " x");
    }

    #[test]
    fn test_bare_prefix_is_status() {
        assert_eq!(
            ReceivedLine::classify("READ: "),
            ReceivedLine::Status("READ:".to_string())
        );
    }

    #[test]
    fn test_classify_status() {
        assert_eq!(
            ReceivedLine::classify("Mode selected\r"),
            ReceivedLine::Status("Mode selected".to_string())
        );
    }
}
