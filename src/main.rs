//! # Main — CLI Entry Point
//!
//! Routes subcommands to the sieve engine and prints results as plain text or
//! JSON.
//!
//! ## Subcommands
//!
//! - `sieve`: sieve up to a bound and report how many primes it holds.
//! - `list`: print every prime up to a bound.
//! - `pi`: count primes up to x, exact within the sieved bound, estimated beyond.
//! - `is-prime`: test one or more integers.
//!
//! ## Global Options
//!
//! - `--config` / `WHEELSIEVE_CONFIG`: TOML file with engine tunables.
//! - `--segment-bytes` / `WHEELSIEVE_SEGMENT_BYTES`: segment budget override.
//! - `--json`: machine-readable output.

mod cli;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "wheelsieve", about = "Segmented wheel-30 prime sieve")]
struct Cli {
    /// Path to a TOML config file (segment_bytes, default_limit)
    #[arg(long, env = "WHEELSIEVE_CONFIG")]
    config: Option<PathBuf>,

    /// Bytes of sieve per segment (each byte covers 30 integers); overrides the config file
    #[arg(long, env = "WHEELSIEVE_SEGMENT_BYTES")]
    segment_bytes: Option<u32>,

    /// Emit results as JSON
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sieve up to a limit and report the number of primes found
    Sieve {
        /// Upper bound (defaults to default_limit from the config)
        #[arg(long)]
        limit: Option<u64>,
    },
    /// Print all primes up to a limit
    List {
        /// Upper bound (defaults to default_limit from the config)
        #[arg(long)]
        limit: Option<u64>,
    },
    /// Count primes up to x: exact within the sieved bound, estimated beyond it
    Pi {
        /// Count primes <= x (defaults to the sieve limit)
        #[arg(long)]
        x: Option<u64>,
        /// Sieve bound (defaults to default_limit from the config)
        #[arg(long)]
        limit: Option<u64>,
    },
    /// Test integers for primality
    IsPrime {
        /// Integers to test
        #[arg(required = true)]
        numbers: Vec<u64>,
        /// Sieve up to this bound first; larger inputs use trial division
        #[arg(long)]
        limit: Option<u64>,
    },
}

fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    // LOG_FORMAT=json for log shippers, human-readable otherwise
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_default();
    if log_format == "json" {
        tracing_subscriber::fmt()
            .json()
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .init();
    }

    let cli = Cli::parse();
    let config = cli::load_config(&cli)?;

    match &cli.command {
        Commands::Sieve { limit } => cli::run_sieve(&cli, &config, *limit),
        Commands::List { limit } => cli::run_list(&cli, &config, *limit),
        Commands::Pi { x, limit } => cli::run_pi(&cli, &config, *x, *limit),
        Commands::IsPrime { numbers, limit } => cli::run_is_prime(&cli, &config, numbers, *limit),
    }
}
