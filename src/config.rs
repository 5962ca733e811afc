//! TOML configuration for the sieve engine and the command-line front end.
//!
//! ```toml
//! # wheelsieve.toml
//! segment_bytes = 32768     # per-segment byte budget (×30 integers)
//! default_limit = 1000000   # bound used when a command omits --limit
//! ```

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::sieve::L1D_CACHE_BYTES;

/// Largest accepted segment budget; past this the segment no longer fits any cache.
pub const MAX_SEGMENT_BYTES: u32 = 1 << 30;

/// Tunables for [`crate::sieve::Primes`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SieveConfig {
    /// Bytes of bit-packed store per segment; each byte covers 30 integers.
    pub segment_bytes: u32,
    /// Sieve bound used by the CLI when none is given.
    pub default_limit: u64,
}

impl Default for SieveConfig {
    fn default() -> Self {
        SieveConfig {
            segment_bytes: L1D_CACHE_BYTES,
            default_limit: 1_000_000,
        }
    }
}

/// Parse and validate a TOML config string.
pub fn parse_toml(content: &str) -> Result<SieveConfig> {
    let config: SieveConfig = toml::from_str(content)?;
    config.validate()?;
    Ok(config)
}

/// Parse and validate a TOML config file.
pub fn parse_toml_file(path: &std::path::Path) -> Result<SieveConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    parse_toml(&content).with_context(|| format!("parsing config {}", path.display()))
}

impl SieveConfig {
    /// Check the tunables; run again after applying command-line overrides.
    pub fn validate(&self) -> Result<()> {
        if self.segment_bytes == 0 {
            bail!("segment_bytes must be at least 1");
        }
        if self.segment_bytes > MAX_SEGMENT_BYTES {
            bail!(
                "segment_bytes {} exceeds maximum {}",
                self.segment_bytes,
                MAX_SEGMENT_BYTES
            );
        }
        Ok(())
    }
}
