//! Tessera CLI - entity records from the command line.
//!
//! Reads compilation units handed off by a front-end as JSON, extracts
//! entity, relation and diagnostic records, and writes them as JSON Lines.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

mod cli;

/// Tessera: entity identity and cross-reference extraction.
#[derive(Parser)]
#[command(name = "tessera")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Verbose output (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract records from front-end JSON units
    Extract {
        /// Unit files written by the front-end
        #[arg(required = true)]
        units: Vec<PathBuf>,

        /// Configuration file (defaults to ./tessera.yaml when present)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Write JSON Lines here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the canonical identity string and key of an entity
    Key {
        #[command(subcommand)]
        kind: cli::key::KeyKind,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Extract {
            units,
            config,
            output,
        } => cli::extract::run(&units, config.as_deref(), output.as_deref()),
        Commands::Key { kind } => cli::key::run(&kind),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {e}", "error".red().bold());
            // Show cause chain for nested errors
            let mut source = std::error::Error::source(&e);
            while let Some(cause) = source {
                eprintln!("  {}: {cause}", "caused by".dimmed());
                source = std::error::Error::source(cause);
            }
            ExitCode::FAILURE
        }
    }
}
