//! Command line arguments

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use obcsim_core::obc::{Axis, ObcRequest, WheelDirection};

#[derive(Parser, Debug)]
#[command(version, about = "Simulate the onboard computer over a UART bridge adapter")]
pub struct Cli {
    /// JSON bridge config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Serial device the adapter is attached to
    #[arg(short, long, global = true)]
    pub device: Option<String>,

    /// Baud rate of the USB link to the adapter
    #[arg(short, long, global = true)]
    pub baud: Option<u32>,

    /// Baud rate of the bridged UART line
    #[arg(short, long, global = true)]
    pub uart_baud: Option<u32>,

    /// Message delimiter appended to payloads
    #[arg(long, global = true)]
    pub delimiter: Option<char>,

    /// Debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List serial ports
    Ports,

    /// Print the effective configuration
    ShowConfig,

    /// Stream everything the microcontroller sends until CTRL + C
    Monitor {
        /// Poll interval in milliseconds
        #[arg(long, default_value_t = 100)]
        poll_ms: u64,
    },

    /// Send one text payload and print the reply
    Send {
        text: String,

        /// Wait after starting the stream before sending, in milliseconds
        #[arg(long, default_value_t = 1000)]
        settle_ms: u64,

        /// Keep printing received data until CTRL + C
        #[arg(short, long)]
        listen: bool,
    },

    /// Send a firmware JSON request and print the reply
    Request {
        #[command(subcommand)]
        request: RequestArgs,

        /// Wait after starting the stream before sending, in milliseconds
        #[arg(long, default_value_t = 1000)]
        settle_ms: u64,
    },
}

#[derive(Subcommand, Debug, Clone, Copy)]
pub enum RequestArgs {
    /// Read the firmware version
    FwVersion,
    /// Read the hardware version
    HwVersion,
    /// Read a reaction wheel PWM duty
    PwmRead { axis: AxisArg },
    /// Set a reaction wheel PWM duty
    PwmWrite { axis: AxisArg, value: u16 },
    /// Read a reaction wheel direction
    DirRead { axis: AxisArg },
    /// Set a reaction wheel direction
    DirWrite {
        axis: AxisArg,
        direction: DirectionArg,
    },
}

impl RequestArgs {
    pub fn into_request(self) -> ObcRequest {
        match self {
            RequestArgs::FwVersion => ObcRequest::FwVersion,
            RequestArgs::HwVersion => ObcRequest::HwVersion,
            RequestArgs::PwmRead { axis } => ObcRequest::ReadWheelPwm(axis.into()),
            RequestArgs::PwmWrite { axis, value } => ObcRequest::WriteWheelPwm(axis.into(), value),
            RequestArgs::DirRead { axis } => ObcRequest::ReadWheelDir(axis.into()),
            RequestArgs::DirWrite { axis, direction } => {
                ObcRequest::WriteWheelDir(axis.into(), direction.into())
            }
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum AxisArg {
    X,
    Y,
    Z,
}

impl From<AxisArg> for Axis {
    fn from(axis: AxisArg) -> Self {
        match axis {
            AxisArg::X => Axis::X,
            AxisArg::Y => Axis::Y,
            AxisArg::Z => Axis::Z,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum DirectionArg {
    Clock,
    AntiClock,
}

impl From<DirectionArg> for WheelDirection {
    fn from(dir: DirectionArg) -> Self {
        match dir {
            DirectionArg::Clock => WheelDirection::Clockwise,
            DirectionArg::AntiClock => WheelDirection::AntiClockwise,
        }
    }
}
