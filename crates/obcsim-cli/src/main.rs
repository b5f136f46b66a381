//! `obcsim`: stand in for the onboard computer over a UART bridge adapter.
//!
//! Usage:
//!   obcsim [--config FILE] [--device DEV] ports
//!   obcsim --device /dev/ttyUSB0 monitor
//!   obcsim send "hello"
//!   obcsim request pwm-write x 55
//!
//! CTRL + C stops the adapter stream and closes the port before exiting.

mod args;
mod runner;

use anyhow::{anyhow, Context};
use clap::Parser;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use obcsim_core::bridge::{list_ports, monitor, BridgeError, Session, UartBaud};
use obcsim_core::config::BridgeConfig;
use obcsim_core::obc::ObcReply;

use args::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = resolve_config(&cli)?;

    match cli.command {
        Commands::Ports => {
            let ports = list_ports();
            if ports.is_empty() {
                println!("No serial ports found");
            }
            for port in ports {
                println!("{}", port.describe());
            }
            Ok(())
        }
        Commands::ShowConfig => {
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(())
        }
        Commands::Monitor { poll_ms } => {
            let poll = Duration::from_millis(poll_ms);
            run_on_adapter(config, move |session, cancel| {
                monitor::run(session, cancel, poll, |text| println!("{}", text))?;
                Ok(())
            })
            .await
        }
        Commands::Send {
            text,
            settle_ms,
            listen,
        } => {
            let settle = Duration::from_millis(settle_ms);
            run_on_adapter(config, move |session, cancel| {
                if wait_or_cancel(cancel, settle) {
                    return Ok(());
                }
                let received = session.transmit(text)?;
                if !received.is_empty() {
                    println!("{}", received);
                }
                if listen {
                    monitor::run(session, cancel, session_poll(), |text| println!("{}", text))?;
                }
                Ok(())
            })
            .await
        }
        Commands::Request { request, settle_ms } => {
            let request = request.into_request();
            let json = request.to_json()?;
            let settle = Duration::from_millis(settle_ms);
            run_on_adapter(config, move |session, cancel| {
                if wait_or_cancel(cancel, settle) {
                    return Ok(());
                }
                let delimiter = session.delimiter();
                let received = session.transmit(json)?;
                match ObcReply::parse(&received, delimiter) {
                    Some(reply) => println!("{} = {}", reply.key, reply.value),
                    None if received.is_empty() => println!("no reply"),
                    None => println!("{}", received),
                }
                Ok(())
            })
            .await
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();
}

/// Config file (or defaults) with command line overrides applied
fn resolve_config(cli: &Cli) -> anyhow::Result<BridgeConfig> {
    let mut config = match &cli.config {
        Some(path) => BridgeConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => BridgeConfig::default(),
    };

    if let Some(device) = &cli.device {
        config.device = device.clone();
    }
    if let Some(baud) = cli.baud {
        config.adapter_baud = baud;
    }
    if let Some(bps) = cli.uart_baud {
        config.uart.baud =
            UartBaud::from_bps(bps).ok_or_else(|| anyhow!("adapter has no preset for {} baud", bps))?;
    }
    if let Some(delimiter) = cli.delimiter {
        config.delimiter = delimiter;
    }
    Ok(config)
}

fn session_poll() -> Duration {
    Duration::from_millis(100)
}

/// Sleep for `duration` in small steps; true if cancelled meanwhile
fn wait_or_cancel(cancel: &CancellationToken, duration: Duration) -> bool {
    let step = Duration::from_millis(10);
    let mut waited = Duration::ZERO;
    while waited < duration {
        if cancel.is_cancelled() {
            return true;
        }
        std::thread::sleep(step);
        waited += step;
    }
    cancel.is_cancelled()
}

/// Bring the adapter up per `config` and run `work` on it until it finishes
/// or CTRL + C arrives
async fn run_on_adapter<F>(config: BridgeConfig, work: F) -> anyhow::Result<()>
where
    F: FnOnce(&mut Session, &CancellationToken) -> Result<(), BridgeError> + Send + 'static,
{
    let open = move || -> anyhow::Result<Session> {
        let session = Session::establish(&config)
            .with_context(|| format!("failed to bring up adapter on {}", config.device))?;
        tracing::debug!(
            "session settings: {:?}, settle delay {:?}",
            session.uart_settings(),
            session.min_delay()
        );
        Ok(session)
    };
    runner::run_session(open, work, tokio::signal::ctrl_c()).await
}
