//! Binary crate for the `weather` command-line tool.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Logging setup
//! - Interactive configuration
//! - Human-friendly output formatting

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use weather_core::ErrorKind;

mod cli;

const DEFAULT_LOG_FILTER: &str = "warn";

#[tokio::main]
async fn main() -> ExitCode {
    let cmd = cli::Cli::parse();

    let config = match cmd.load_config() {
        Ok(config) => config,
        Err(err) => {
            init_logging(cmd.log_level.as_deref());
            eprintln!("Error: {err:#}");
            return ExitCode::FAILURE;
        }
    };

    init_logging(cmd.log_level.as_deref().or(config.log_level.as_deref()));

    match cmd.run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => report(&err),
    }
}

/// `RUST_LOG` wins, then the explicit level, then [`DEFAULT_LOG_FILTER`].
fn init_logging(level: Option<&str>) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level.unwrap_or(DEFAULT_LOG_FILTER)))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn report(err: &anyhow::Error) -> ExitCode {
    let Some(core) = err.downcast_ref::<weather_core::Error>() else {
        eprintln!("Error: {err:#}");
        return ExitCode::FAILURE;
    };

    tracing::debug!(error = %err, "Command failed");
    eprintln!("Error: {}", core.user_message());

    ExitCode::from(exit_code(core.kind()))
}

fn exit_code(kind: ErrorKind) -> u8 {
    match kind {
        ErrorKind::Validation => 2,
        ErrorKind::Upstream => 3,
        ErrorKind::Storage => 4,
    }
}
