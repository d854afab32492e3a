//! EPP registrar command-line client.
//!
//! Every subcommand runs one registrar flow in its own session and prints
//! the structured result as JSON on stdout. Failures print
//! `{"error": "..."}` and exit non-zero. Logs go to stderr.
//!
//! # Usage
//!
//! ```bash
//! # Register a domain described in a request file
//! epp --config registry.toml register request.toml
//!
//! # Replace the delegation
//! epp --config registry.toml save-nameservers example.lv ns1.host.lv ns2.host.lv
//!
//! # Verbose session trace
//! RUST_LOG=epp_core=debug epp --config registry.toml sync example.lv
//! ```

mod command;
mod error;
mod files;

use std::{
    io::{self, Write},
    path::PathBuf,
    process::ExitCode,
};

use clap::Parser;
use command::Command;
use epp_client::Registrar;
use epp_core::{SystemEnv, TlsConnector};
use error::CliError;
use serde_json::{Value, json};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// EPP registrar client
#[derive(Parser, Debug)]
#[command(name = "epp")]
#[command(about = "Domain, contact and nameserver management over EPP")]
#[command(version)]
struct Args {
    /// Endpoint configuration (TOML)
    #[arg(short, long, default_value = "epp.toml")]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// Pretty-print the JSON result
    #[arg(long)]
    pretty: bool,

    #[command(subcommand)]
    command: Command,
}

fn main() -> ExitCode {
    let args = Args::parse();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry().with(fmt::layer().with_writer(io::stderr)).with(filter).init();

    let (value, code) = match run(&args) {
        Ok(value) => (value, ExitCode::SUCCESS),
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            (json!({ "error": e.to_string() }), ExitCode::FAILURE)
        },
    };

    match emit(&value, args.pretty) {
        Ok(()) => code,
        Err(e) => {
            tracing::error!(error = %e, "cannot write result");
            ExitCode::FAILURE
        },
    }
}

fn run(args: &Args) -> Result<Value, CliError> {
    let config = files::load_config(&args.config)?;
    let connector = TlsConnector::new(&config.tls)?;
    let registrar = Registrar::new(connector, config, SystemEnv::new());

    tracing::debug!(command = ?args.command, "running");
    args.command.run(&registrar)
}

fn emit(value: &Value, pretty: bool) -> Result<(), CliError> {
    let rendered = if pretty { serde_json::to_string_pretty(value)? } else { serde_json::to_string(value)? };
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{rendered}")?;
    stdout.flush()?;
    Ok(())
}
