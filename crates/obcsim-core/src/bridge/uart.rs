//! UART settings for the bridged line
//!
//! Each setting maps onto the digit the adapter's configuration menu expects.
//! The defaults reproduce the sequence the bench setup has always used:
//! 9600 baud, 8N, one stop bit, idle high, normal outputs, ASCII display.

use serde::{Deserialize, Serialize};

use super::AdapterCommand;

/// Baud rate presets offered by the adapter's UART menu
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum UartBaud {
    /// 300 bps
    B300,
    /// 1200 bps
    B1200,
    /// 2400 bps
    B2400,
    /// 4800 bps
    B4800,
    /// 9600 bps
    #[default]
    B9600,
    /// 19200 bps
    B19200,
    /// 38400 bps
    B38400,
    /// 57600 bps
    B57600,
    /// 115200 bps
    B115200,
}

impl UartBaud {
    /// All presets in menu order
    pub const ALL: [UartBaud; 9] = [
        UartBaud::B300,
        UartBaud::B1200,
        UartBaud::B2400,
        UartBaud::B4800,
        UartBaud::B9600,
        UartBaud::B19200,
        UartBaud::B38400,
        UartBaud::B57600,
        UartBaud::B115200,
    ];

    /// Menu digit for this preset
    pub fn code(&self) -> char {
        match self {
            UartBaud::B300 => '1',
            UartBaud::B1200 => '2',
            UartBaud::B2400 => '3',
            UartBaud::B4800 => '4',
            UartBaud::B9600 => '5',
            UartBaud::B19200 => '6',
            UartBaud::B38400 => '7',
            UartBaud::B57600 => '8',
            UartBaud::B115200 => '9',
        }
    }

    /// Bits per second
    pub fn bps(&self) -> u32 {
        match self {
            UartBaud::B300 => 300,
            UartBaud::B1200 => 1200,
            UartBaud::B2400 => 2400,
            UartBaud::B4800 => 4800,
            UartBaud::B9600 => 9600,
            UartBaud::B19200 => 19200,
            UartBaud::B38400 => 38400,
            UartBaud::B57600 => 57600,
            UartBaud::B115200 => 115200,
        }
    }

    /// Look up the preset for a bps value
    pub fn from_bps(bps: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.bps() == bps)
    }
}

impl TryFrom<u32> for UartBaud {
    type Error = String;

    fn try_from(bps: u32) -> Result<Self, Self::Error> {
        UartBaud::from_bps(bps).ok_or_else(|| format!("no adapter preset for {} baud", bps))
    }
}

impl From<UartBaud> for u32 {
    fn from(baud: UartBaud) -> Self {
        baud.bps()
    }
}

/// Data bits and parity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ParityMode {
    /// 8 data bits, no parity
    #[default]
    EightNone,
    /// 8 data bits, even parity
    EightEven,
    /// 8 data bits, odd parity
    EightOdd,
    /// 9 data bits, no parity
    NineNone,
}

impl ParityMode {
    /// Menu digit
    pub fn code(&self) -> char {
        match self {
            ParityMode::EightNone => '1',
            ParityMode::EightEven => '2',
            ParityMode::EightOdd => '3',
            ParityMode::NineNone => '4',
        }
    }
}

/// Stop bit count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StopBits {
    /// One stop bit
    #[default]
    One,
    /// Two stop bits
    Two,
}

impl StopBits {
    /// Menu digit
    pub fn code(&self) -> char {
        match self {
            StopBits::One => '1',
            StopBits::Two => '2',
        }
    }
}

/// Receive polarity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IdleLevel {
    /// Line idles at 1 (standard UART)
    #[default]
    High,
    /// Line idles at 0
    Low,
}

impl IdleLevel {
    /// Menu digit
    pub fn code(&self) -> char {
        match self {
            IdleLevel::High => '1',
            IdleLevel::Low => '2',
        }
    }
}

/// Output pin drive type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputLevel {
    /// H=Hi-Z, L=GND
    OpenDrain,
    /// H=Vcc, L=GND
    #[default]
    Normal,
}

impl OutputLevel {
    /// Menu digit
    pub fn code(&self) -> char {
        match self {
            OutputLevel::OpenDrain => '1',
            OutputLevel::Normal => '2',
        }
    }
}

/// How the adapter renders bytes it reads off the UART
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DisplayFormat {
    /// Hexadecimal
    Hex,
    /// Decimal
    Dec,
    /// Binary
    Bin,
    /// Required by the receive decoder
    #[default]
    Ascii,
}

impl DisplayFormat {
    /// Menu digit
    pub fn code(&self) -> char {
        match self {
            DisplayFormat::Hex => '1',
            DisplayFormat::Dec => '2',
            DisplayFormat::Bin => '3',
            DisplayFormat::Ascii => '4',
        }
    }
}

/// Full configuration of the bridged UART line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UartSettings {
    /// Bridged line baud rate
    pub baud: UartBaud,
    /// Data bits and parity
    pub parity: ParityMode,
    /// Stop bits
    pub stop_bits: StopBits,
    /// Receive polarity
    pub idle_level: IdleLevel,
    /// Output pin type
    pub output_level: OutputLevel,
    /// Echo display format
    pub display: DisplayFormat,
}

impl UartSettings {
    /// Settings with a different bridged baud rate, everything else default
    pub fn with_baud(baud: UartBaud) -> Self {
        Self {
            baud,
            ..Self::default()
        }
    }

    /// Ordered command sequence that takes the adapter from reset into UART
    /// passthrough with these settings.
    ///
    /// The order is a contract with the adapter firmware's menus; a step sent
    /// out of place is consumed by the wrong prompt.
    pub fn command_sequence(&self) -> Vec<AdapterCommand> {
        vec![
            AdapterCommand::Reset,
            AdapterCommand::ModeSelect,
            AdapterCommand::UartMode,
            AdapterCommand::Baud(self.baud),
            AdapterCommand::Parity(self.parity),
            AdapterCommand::StopBits(self.stop_bits),
            AdapterCommand::IdleLevel(self.idle_level),
            AdapterCommand::OutputLevel(self.output_level),
            AdapterCommand::OutputConfig,
            AdapterCommand::Display(self.display),
        ]
    }
}
