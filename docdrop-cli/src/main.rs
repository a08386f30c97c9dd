//! docdrop — trigger-driven document delivery agent.
//!
//! # Usage
//!
//! ```text
//! docdrop run [--config <path>] [--dry-run] [--json]
//! docdrop watch [--config <path>] [--interval <secs>] [--dry-run]
//! docdrop validate [--config <path>]
//! ```
//!
//! Without `--config`, the file named by `$DOCDROP_CONFIG` or
//! `~/.docdrop/config.yaml` is used.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{run::RunArgs, validate::ValidateArgs, watch::WatchArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "docdrop",
    version,
    about = "Deliver triggered local files to a remote document repository",
    long_about = None,
)]
struct Cli {
    /// Emit logs as JSON lines instead of plain text.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run one delivery pass over every configured task.
    Run(RunArgs),

    /// Run delivery passes on an interval until interrupted.
    Watch(WatchArgs),

    /// Load and check the config file without delivering anything.
    Validate(ValidateArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);
    match cli.command {
        Commands::Run(args) => args.run(),
        Commands::Watch(args) => args.run(),
        Commands::Validate(args) => args.run(),
    }
}

/// Logs go to stderr so `--json` output on stdout stays machine-readable.
fn init_tracing(json: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    let _ = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}
