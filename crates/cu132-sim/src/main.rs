//! CU132 Simulator Binary
//!
//! Answers control unit commands on a serial port (or stdin/stdout) until
//! interrupted.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use cu132_core::prelude::*;
use cu132_core::protocol::list_ports;
use tracing_subscriber::{fmt, EnvFilter};

/// CU132 control unit simulator
#[derive(Parser, Debug)]
#[command(name = "cu132-sim")]
#[command(about = "Simulates a CU132 control unit on a serial link")]
#[command(version)]
struct Args {
    /// Serial port to answer on (e.g. /dev/ttyUSB0 or COM4)
    #[arg(short, long)]
    port: Option<String>,

    /// Baud rate
    #[arg(short, long)]
    baud: Option<u32>,

    /// Serial read timeout in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Use stdin/stdout instead of a serial port
    #[arg(long, conflicts_with = "port")]
    stdio: bool,

    /// Seed for poll replies (random when omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// JSON config file; flags override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// List serial ports and exit
    #[arg(long)]
    list_ports: bool,
}

impl Args {
    /// Merge the config file (if any) with command line overrides
    fn resolve_config(&self) -> Result<SimulatorConfig> {
        let mut config = match &self.config {
            Some(path) => SimulatorConfig::from_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => SimulatorConfig::default(),
        };

        if let Some(port) = &self.port {
            config.port.name = port.clone();
        }
        if let Some(baud) = self.baud {
            config.port.baud_rate = baud;
        }
        if let Some(timeout_ms) = self.timeout_ms {
            config.port.timeout_ms = timeout_ms;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }

        config.validate()?;
        if !self.stdio && config.port.name.is_empty() {
            bail!("No serial port given; use --port, --stdio or a config file");
        }
        Ok(config)
    }
}

fn bit_source(config: &SimulatorConfig) -> RandomBits {
    match config.seed {
        Some(seed) => {
            tracing::info!("Poll replies seeded with {}", seed);
            RandomBits::seeded(seed)
        }
        None => RandomBits::from_entropy(),
    }
}

fn serve<T: Transport>(transport: T, config: &SimulatorConfig, cancel: CancelToken) -> Result<()> {
    let framer =
        Framer::new(transport, cancel).with_idle_poll(Duration::from_millis(config.idle_poll_ms));
    let mut session = Session::new(framer, Interpreter::new(bit_source(config)));
    session.run().context("Session ended with an error")?;
    Ok(())
}

fn run(args: Args) -> Result<()> {
    if args.list_ports {
        for port in list_ports()? {
            match &port.product {
                Some(product) => println!("{}\t{}\t{}", port.name, port.kind, product),
                None => println!("{}\t{}", port.name, port.kind),
            }
        }
        return Ok(());
    }

    let config = args.resolve_config()?;

    let cancel = CancelToken::new();
    let handler_token = cancel.clone();
    ctrlc::set_handler(move || {
        tracing::info!("Received Ctrl+C, shutting down...");
        handler_token.cancel();
    })
    .context("Failed to install Ctrl+C handler")?;

    if args.stdio {
        tracing::info!("Answering on stdin/stdout");
        serve(StdioTransport::new(), &config, cancel)
    } else {
        let port = open_port(&config.port)?;
        serve(SerialTransport::new(port), &config, cancel)
    }
}

fn main() -> ExitCode {
    // Logs go to stderr so stdout stays free for the stdio transport
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    tracing::info!("CU132 simulator v{}", cu132_core::VERSION);

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_defaults() {
        let args = Args::parse_from(["cu132-sim", "--port", "COM4", "--baud", "9600", "--seed", "5"]);
        let config = args.resolve_config().unwrap();
        assert_eq!(config.port.name, "COM4");
        assert_eq!(config.port.baud_rate, 9600);
        assert_eq!(config.seed, Some(5));
    }

    #[test]
    fn test_port_required_without_stdio() {
        let args = Args::parse_from(["cu132-sim"]);
        assert!(args.resolve_config().is_err());
    }

    #[test]
    fn test_stdio_needs_no_port() {
        let args = Args::parse_from(["cu132-sim", "--stdio"]);
        let config = args.resolve_config().unwrap();
        assert!(config.port.name.is_empty());
    }

    #[test]
    fn test_stdio_conflicts_with_port() {
        assert!(Args::try_parse_from(["cu132-sim", "--stdio", "--port", "COM4"]).is_err());
    }
}
