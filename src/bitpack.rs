//! # Bitpack — Wheel-30 Primality Store
//!
//! One byte per block of 30 integers, one bit per spoke residue (see
//! [`crate::wheel`]). A clear bit (0) means the candidate has not been proven
//! composite; a set bit (1) means it has. Integers divisible by 2, 3 or 5 have
//! no bit at all and are composite by construction; 2, 3 and 5 themselves are
//! supplied as constants when extracting lists and counts.
//!
//! Memory: ⌈limit/30⌉ + 1 bytes, i.e. 26.7% of a one-bit-per-odd sieve.

use crate::error::SieveError;
use crate::wheel;

/// The wheel primes that never appear in storage.
const AXLE_PRIMES: [u64; 3] = [2, 3, 5];

/// Bit-packed record of which wheel residues up to `limit` are composite.
#[derive(Debug, Default)]
pub struct BitPackedStore {
    data: Vec<u8>,
    limit: u64,
}

impl BitPackedStore {
    /// An empty store (limit 0, no storage).
    pub fn new() -> Self {
        Self::default()
    }

    /// Upper bound covered by the store.
    #[inline]
    pub fn limit(&self) -> u64 {
        self.limit
    }

    /// Raw block bytes.
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Reallocate for all integers up to `limit` and reset every candidate to
    /// "prime", except 1. Prior contents are always discarded.
    ///
    /// On allocation failure the store is left empty.
    pub fn resize(&mut self, limit: u64) -> Result<(), SieveError> {
        self.data = Vec::new();
        self.limit = 0;

        let blocks = wheel::block(limit) + 1;
        let len = usize::try_from(blocks)
            .map_err(|_| SieveError::AllocationFailure { bytes: blocks })?;
        let mut data = Vec::new();
        data.try_reserve_exact(len)
            .map_err(|_| SieveError::AllocationFailure { bytes: blocks })?;
        data.resize(len, 0u8);

        tracing::trace!(limit, bytes = len, "bitpack resized");
        self.data = data;
        self.limit = limit;
        self.set(1);
        Ok(())
    }

    /// Whether `n` is still a prime candidate.
    ///
    /// Integers off the wheel answer `false` without touching storage.
    #[inline]
    pub fn check(&self, n: u64) -> Result<bool, SieveError> {
        if n > self.limit {
            return Err(SieveError::OutOfRange {
                n,
                limit: self.limit,
            });
        }
        let mask = wheel::bit_mask(n);
        if mask == 0 {
            return Ok(false);
        }
        Ok(self.data[wheel::block(n) as usize] & mask == 0)
    }

    /// Mark `n` composite. Silently ignored past the limit: the segment
    /// stepper may compute one multiple beyond the active segment.
    #[inline]
    pub fn set(&mut self, n: u64) {
        if n > self.limit {
            return;
        }
        let mask = wheel::bit_mask(n);
        if mask == 0 {
            return;
        }
        self.data[wheel::block(n) as usize] |= mask;
    }

    /// All primes up to `limit`, ascending.
    pub fn list(&self, limit: u64) -> Result<Vec<u64>, SieveError> {
        if limit > self.limit {
            return Err(SieveError::OutOfRange {
                n: limit,
                limit: self.limit,
            });
        }

        let mut primes = Vec::with_capacity(crate::sieve::estimate_pi(limit) as usize);
        primes.extend(AXLE_PRIMES.iter().copied().filter(|&p| p <= limit));
        if self.data.is_empty() {
            return Ok(primes);
        }

        let last_block = wheel::block(limit);
        'blocks: for (block, &byte) in self.data[..=last_block as usize].iter().enumerate() {
            if byte == 0xFF {
                continue;
            }
            for bit in 0..wheel::SPOKES {
                let n = wheel::value_at(block as u64, bit);
                if n > limit {
                    break 'blocks;
                }
                if byte & (1 << bit) == 0 {
                    primes.push(n);
                }
            }
        }
        Ok(primes)
    }

    /// Exact number of primes ≤ `x`.
    pub fn count(&self, x: u64) -> Result<u64, SieveError> {
        if x > self.limit {
            return Err(SieveError::OutOfRange {
                n: x,
                limit: self.limit,
            });
        }

        let mut count = AXLE_PRIMES.iter().filter(|&&p| p <= x).count() as u64;
        if self.data.is_empty() {
            return Ok(count);
        }

        let full_blocks = wheel::block(x) as usize;
        count += self.data[..full_blocks]
            .iter()
            .map(|&byte| (!byte).count_ones() as u64)
            .sum::<u64>();

        // Partial final block: only spokes at or below x.
        let rem = x % wheel::MODULUS;
        let byte = self.data[full_blocks];
        for (bit, &r) in wheel::RESIDUES.iter().enumerate() {
            if r as u64 > rem {
                break;
            }
            if byte & (1 << bit) == 0 {
                count += 1;
            }
        }
        Ok(count)
    }
}
