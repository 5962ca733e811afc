//! Errors raised by the bit-packed store and the sieve engine.

/// Failure modes of [`crate::bitpack::BitPackedStore`] and [`crate::sieve::Primes`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SieveError {
    /// A store query reached past the sieved bound.
    OutOfRange { n: u64, limit: u64 },
    /// "Use the current bound" was requested before any bound was established.
    DomainError,
    /// The bit buffer for the requested limit could not be allocated.
    AllocationFailure { bytes: u64 },
}

impl std::fmt::Display for SieveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SieveError::OutOfRange { n, limit } => {
                write!(f, "{} hasn't been sieved (limit {})", n, limit)
            }
            SieveError::DomainError => write!(f, "need a limit: nothing has been sieved yet"),
            SieveError::AllocationFailure { bytes } => {
                write!(f, "failed to allocate {} bytes for the sieve", bytes)
            }
        }
    }
}

impl std::error::Error for SieveError {}
