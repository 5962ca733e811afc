pub mod bitpack;
pub mod config;
pub mod error;
pub mod sieve;
pub mod wheel;

pub use config::SieveConfig;
pub use error::SieveError;
pub use sieve::{estimate_pi, trial_division, Primes};
