//! # CLI Execution Functions
//!
//! Extracted from `main.rs` to keep the entry point slim. Each subcommand
//! builds an engine from the resolved config, runs it, and prints the result.

use anyhow::Result;
use serde::Serialize;
use std::io::Write;
use std::time::Instant;
use tracing::info;
use wheelsieve::{config, Primes, SieveConfig};

use super::Cli;

// ── Configuration ───────────────────────────────────────────────

/// Resolve the config file (if any), then apply command-line overrides.
pub fn load_config(cli: &Cli) -> Result<SieveConfig> {
    let mut resolved = match &cli.config {
        Some(path) => config::parse_toml_file(path)?,
        None => SieveConfig::default(),
    };
    if let Some(bytes) = cli.segment_bytes {
        resolved.segment_bytes = bytes;
    }
    resolved.validate()?;
    Ok(resolved)
}

/// Sieve to `limit` (or the configured default) and log how long it took.
fn sieved_engine(config: &SieveConfig, limit: Option<u64>) -> Result<Primes> {
    let limit = limit.unwrap_or(config.default_limit);
    let mut primes = Primes::from_config(config);
    let start = Instant::now();
    primes.sieve(limit)?;
    info!(
        limit,
        segment_bytes = primes.segment_bytes(),
        elapsed_secs = start.elapsed().as_secs_f64(),
        "sieved"
    );
    Ok(primes)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string(value)?);
    Ok(())
}

// ── Subcommands ─────────────────────────────────────────────────

#[derive(Serialize)]
struct SieveReport {
    limit: u64,
    count: u64,
    bytes: usize,
}

pub fn run_sieve(cli: &Cli, config: &SieveConfig, limit: Option<u64>) -> Result<()> {
    let primes = sieved_engine(config, limit)?;
    let report = SieveReport {
        limit: primes.limit(),
        count: primes.pi(0)?,
        bytes: primes.bytes(),
    };
    if cli.json {
        return print_json(&report);
    }
    println!(
        "{} primes up to {} ({} bytes)",
        report.count, report.limit, report.bytes
    );
    Ok(())
}

pub fn run_list(cli: &Cli, config: &SieveConfig, limit: Option<u64>) -> Result<()> {
    let mut primes = sieved_engine(config, limit)?;
    let list = primes.get_list(0)?;
    if cli.json {
        return print_json(&list);
    }
    let stdout = std::io::stdout();
    let mut out = std::io::BufWriter::new(stdout.lock());
    for p in list {
        writeln!(out, "{}", p)?;
    }
    out.flush()?;
    Ok(())
}

#[derive(Serialize)]
struct PiReport {
    x: u64,
    pi: u64,
    exact: bool,
}

pub fn run_pi(cli: &Cli, config: &SieveConfig, x: Option<u64>, limit: Option<u64>) -> Result<()> {
    let primes = sieved_engine(config, limit)?;
    // `pi(0)` means "up to the sieve limit"; an explicit --x 0 counts nothing.
    let (x, pi) = match x {
        None => (primes.limit(), primes.pi(0)?),
        Some(0) => (0, 0),
        Some(x) => (x, primes.pi(x)?),
    };
    let report = PiReport {
        x,
        pi,
        exact: x <= primes.limit(),
    };
    if cli.json {
        return print_json(&report);
    }
    if report.exact {
        println!("pi({}) = {}", report.x, report.pi);
    } else {
        println!("pi({}) <= {} (estimate)", report.x, report.pi);
    }
    Ok(())
}

#[derive(Serialize)]
struct PrimalityReport {
    n: u64,
    prime: bool,
}

pub fn run_is_prime(
    cli: &Cli,
    config: &SieveConfig,
    numbers: &[u64],
    limit: Option<u64>,
) -> Result<()> {
    // Without an explicit limit, skip sieving: trial division answers alone.
    let primes = match limit {
        Some(_) => sieved_engine(config, limit)?,
        None => Primes::from_config(config),
    };
    let reports: Vec<PrimalityReport> = numbers
        .iter()
        .map(|&n| PrimalityReport {
            n,
            prime: primes.is_prime(n),
        })
        .collect();
    if cli.json {
        return print_json(&reports);
    }
    for r in &reports {
        println!("{} {}", r.n, if r.prime { "prime" } else { "composite" });
    }
    Ok(())
}
