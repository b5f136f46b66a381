//! Adapter commands
//!
//! Every command the adapter firmware understands is a single ASCII character
//! sent on its own line.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::uart::{DisplayFormat, IdleLevel, OutputLevel, ParityMode, StopBits, UartBaud};

/// Single-character commands for the adapter firmware
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdapterCommand {
    /// Print help/status ('?')
    Help,

    /// Reset the adapter ('#')
    Reset,

    /// Enter the mode-select menu ('m')
    ModeSelect,

    /// Pick UART from the mode-select menu ('3')
    UartMode,

    /// Baud rate preset for the bridged line
    Baud(UartBaud),

    /// Data bits and parity
    Parity(ParityMode),

    /// Stop bit count
    StopBits(StopBits),

    /// Receive polarity (idle level)
    IdleLevel(IdleLevel),

    /// Output pin type
    OutputLevel(OutputLevel),

    /// Enter the output display config menu ('o')
    OutputConfig,

    /// Display format for echoed bytes
    Display(DisplayFormat),

    /// Start echoing UART traffic ('{')
    StartStream,

    /// Stop echoing UART traffic ('}')
    StopStream,
}

impl AdapterCommand {
    /// Get the character sent over the transport
    pub fn as_char(&self) -> char {
        match self {
            AdapterCommand::Help => '?',
            AdapterCommand::Reset => '#',
            AdapterCommand::ModeSelect => 'm',
            AdapterCommand::UartMode => '3',
            AdapterCommand::Baud(baud) => baud.code(),
            AdapterCommand::Parity(parity) => parity.code(),
            AdapterCommand::StopBits(stop_bits) => stop_bits.code(),
            AdapterCommand::IdleLevel(idle) => idle.code(),
            AdapterCommand::OutputLevel(level) => level.code(),
            AdapterCommand::OutputConfig => 'o',
            AdapterCommand::Display(format) => format.code(),
            AdapterCommand::StartStream => '{',
            AdapterCommand::StopStream => '}',
        }
    }

    /// Short name used in log output
    pub fn name(&self) -> &'static str {
        match self {
            AdapterCommand::Help => "help",
            AdapterCommand::Reset => "reset",
            AdapterCommand::ModeSelect => "mode-select",
            AdapterCommand::UartMode => "uart-mode",
            AdapterCommand::Baud(_) => "baud",
            AdapterCommand::Parity(_) => "parity",
            AdapterCommand::StopBits(_) => "stop-bits",
            AdapterCommand::IdleLevel(_) => "idle-level",
            AdapterCommand::OutputLevel(_) => "output-level",
            AdapterCommand::OutputConfig => "output-config",
            AdapterCommand::Display(_) => "display-format",
            AdapterCommand::StartStream => "start-stream",
            AdapterCommand::StopStream => "stop-stream",
        }
    }
}

impl fmt::Display for AdapterCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:?})", self.name(), self.as_char())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_command_chars() {
        assert_eq!(AdapterCommand::Help.as_char(), '?');
        assert_eq!(AdapterCommand::Reset.as_char(), '#');
        assert_eq!(AdapterCommand::ModeSelect.as_char(), 'm');
        assert_eq!(AdapterCommand::UartMode.as_char(), '3');
        assert_eq!(AdapterCommand::OutputConfig.as_char(), 'o');
        assert_eq!(AdapterCommand::StartStream.as_char(), '{');
        assert_eq!(AdapterCommand::StopStream.as_char(), '}');
    }

    #[test]
    fn test_parameterized_command_chars() {
        assert_eq!(AdapterCommand::Baud(UartBaud::B9600).as_char(), '5');
        assert_eq!(AdapterCommand::Parity(ParityMode::EightNone).as_char(), '1');
        assert_eq!(AdapterCommand::StopBits(StopBits::Two).as_char(), '2');
        assert_eq!(AdapterCommand::Display(DisplayFormat::Ascii).as_char(), '4');
    }

    #[test]
    fn test_display() {
        assert_eq!(AdapterCommand::Reset.to_string(), "reset ('#')");
    }
}
