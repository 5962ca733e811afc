//! # Sieve — Segmented Wheel-30 Prime Engine
//!
//! Maintains a bit-packed primality record up to a caller-chosen bound and
//! answers queries against it:
//!
//! 1. **Sieving** (`sieve`) via a segmented Sieve of Eratosthenes over the
//!    mod-30 wheel. Segments are sized to the L1 data cache so the working
//!    set stays bounded no matter how large the limit is.
//! 2. **Primality** (`is_prime`) answered from the store when sieved, and by
//!    wheel-stepped trial division beyond the sieved bound.
//! 3. **Prime lists** (`get_list`) extracted lazily and cached until the next
//!    resieve.
//! 4. **Prime counting** (`pi`): exact at or below the sieved bound, the
//!    analytic upper bound above it.
//!
//! ## Algorithm: Segmented Eratosthenes
//!
//! The interval [0, limit] is walked in segments of `segment_bytes · 30`
//! integers. A prefix up to min(√limit, √segment) is trial-sieved first so the
//! crossing-off primes for the first segment can be read back from the store.
//! Before each segment, every newly certified prime p with p² ≤ high joins a
//! single accumulator of (p, next multiple) cursors. Within a segment each
//! cursor steps through multiples p·k with k on the wheel, so only multiples
//! coprime to 30 are ever visited, and the cursor carries over to the next
//! segment.
//!
//! Complexity: O(n log log n) time, O(n/30) space, O(segment) working set.
//!
//! ## References
//!
//! - Eratosthenes of Cyrene, ~240 BCE.
//! - Rosser & Schoenfeld, "Approximate formulas for some functions of prime
//!   numbers", Illinois J. Math. 6 (1962): pi(x) < (x/ln x)(1 + 3/(2 ln x)).
//!   The 1.2762 constant is Dusart's sharper bound (1999).

use tracing::debug;

use crate::bitpack::BitPackedStore;
use crate::config::SieveConfig;
use crate::error::SieveError;
use crate::wheel;

/// Typical L1 data cache size, the default per-segment byte budget.
pub const L1D_CACHE_BYTES: u32 = 32 * 1024;

/// Dusart's constant in pi(x) ≤ (x/ln x)(1 + 1.2762/ln x).
const DUSART_CONSTANT: f64 = 1.2762;

/// A prime used for crossing off, and the next multiple of it to mark.
#[derive(Debug, Clone, Copy)]
struct Cursor {
    prime: u64,
    next: u64,
}

/// Segmented prime sieve with cached prime list.
///
/// Not internally synchronized; share between threads only behind a lock.
#[derive(Debug)]
pub struct Primes {
    store: BitPackedStore,
    list: Option<Vec<u64>>,
    segment_bytes: u32,
    sieved: bool,
}

impl Default for Primes {
    fn default() -> Self {
        Self::new()
    }
}

impl Primes {
    /// An engine with no bound established and an L1-sized segment budget.
    pub fn new() -> Self {
        Self::with_segment_bytes(L1D_CACHE_BYTES)
    }

    /// An engine using `segment_bytes` bytes (×30 integers) per segment.
    /// A budget of 0 is raised to 1.
    pub fn with_segment_bytes(segment_bytes: u32) -> Self {
        Primes {
            store: BitPackedStore::new(),
            list: None,
            segment_bytes: segment_bytes.max(1),
            sieved: false,
        }
    }

    pub fn from_config(config: &SieveConfig) -> Self {
        Self::with_segment_bytes(config.segment_bytes)
    }

    /// Largest integer covered by the sieve (0 before the first sieve).
    #[inline]
    pub fn limit(&self) -> u64 {
        self.store.limit()
    }

    #[inline]
    pub fn segment_bytes(&self) -> u32 {
        self.segment_bytes
    }

    /// Size of the bit-packed store in bytes.
    #[inline]
    pub fn bytes(&self) -> usize {
        self.store.data().len()
    }

    /// Whether any bound has been established by `sieve`.
    #[inline]
    pub fn is_sieved(&self) -> bool {
        self.sieved
    }

    /// Sieve every integer up to `limit`, discarding any previous state.
    ///
    /// Allocates `limit/30 + 1` bytes. Fails with
    /// [`SieveError::AllocationFailure`] when that allocation cannot be made,
    /// leaving the engine unsieved.
    pub fn sieve(&mut self, limit: u64) -> Result<(), SieveError> {
        self.list = None;
        self.sieved = false;
        self.store.resize(limit)?;

        let segment_size = u64::from(self.segment_bytes) * wheel::MODULUS;
        let sqrt_limit = isqrt(limit);
        let presieve = sqrt_limit.min(isqrt(segment_size));

        // Make [0, presieve] authoritative so the first segment's crossing-off
        // primes can be read back from the store.
        let mut f = 7u64;
        while f * f <= presieve {
            if self.store.check(f)? {
                let mut j = f * f;
                while j <= presieve {
                    self.store.set(j);
                    j += 2 * f;
                }
            }
            f += 2;
        }

        let mut cursors: Vec<Cursor> = Vec::with_capacity(estimate_pi(sqrt_limit) as usize);
        let mut candidate = 7u64;
        let mut candidate_spoke = 1usize;
        let mut segments = 0u64;
        let mut low = 0u64;

        while low <= limit {
            let high = low.saturating_add(segment_size - 1).min(limit);

            while candidate * candidate <= high {
                if self.store.check(candidate)? {
                    cursors.push(Cursor {
                        prime: candidate,
                        next: candidate * candidate,
                    });
                }
                candidate += u64::from(wheel::GAPS[candidate_spoke]);
                candidate_spoke = wheel::next_spoke(candidate_spoke);
            }

            for cursor in cursors.iter_mut() {
                cursor.next = self.cross_off(cursor.prime, cursor.next, high);
            }

            segments += 1;
            low = match high.checked_add(1) {
                Some(next) => next,
                None => break,
            };
        }

        self.sieved = true;
        debug!(
            limit,
            segment_size,
            segments,
            crossing_primes = cursors.len(),
            bytes = self.store.data().len(),
            "sieve complete"
        );
        Ok(())
    }

    /// Mark multiples p·k (k coprime to 30) from `start` until passing `high`.
    /// Returns the first unmarked multiple, where the next segment resumes.
    ///
    /// `start` is always marked, even when it already lies past `high`; the
    /// store drops marks beyond the limit.
    #[inline]
    fn cross_off(&mut self, prime: u64, start: u64, high: u64) -> u64 {
        let mut spoke = wheel::spoke(start / prime).unwrap_or(0);
        let mut s = start;
        loop {
            self.store.set(s);
            s += prime * u64::from(wheel::GAPS[spoke]);
            spoke = wheel::next_spoke(spoke);
            if s > high {
                return s;
            }
        }
    }

    /// Whether `n` is prime.
    ///
    /// Answered from the store when `n` is within the sieved bound, otherwise
    /// by trial division; never triggers a resieve.
    pub fn is_prime(&self, n: u64) -> bool {
        if n < 10 {
            return matches!(n, 2 | 3 | 5 | 7);
        }
        if n % 2 == 0 || n % 3 == 0 || n % 5 == 0 {
            return false;
        }
        if self.sieved {
            if let Ok(answer) = self.store.check(n) {
                return answer;
            }
        }
        trial_division(n)
    }

    /// Ascending primes up to `limit`; 0 means everything currently sieved.
    ///
    /// Resieves when `limit` exceeds the current bound. The full list up to the
    /// sieved bound is built once and reused until the next resieve.
    pub fn get_list(&mut self, limit: u64) -> Result<&[u64], SieveError> {
        let limit = if limit == 0 {
            if !self.sieved {
                return Err(SieveError::DomainError);
            }
            self.store.limit()
        } else {
            limit
        };

        if !self.sieved || limit > self.store.limit() {
            self.sieve(limit)?;
        }

        let list = match self.list.take() {
            Some(list) => list,
            None => self.store.list(self.store.limit())?,
        };
        let list = self.list.insert(list);
        let end = list.partition_point(|&p| p <= limit);
        Ok(&list[..end])
    }

    /// pi(x), the number of primes ≤ `x`; 0 means the current sieved bound.
    ///
    /// Exact when `x` is within the sieved bound (binary search over the cached
    /// list, or a popcount over the store). Beyond it, returns the analytic
    /// upper bound from [`estimate_pi`].
    pub fn pi(&self, x: u64) -> Result<u64, SieveError> {
        let x = if x == 0 {
            if !self.sieved {
                return Err(SieveError::DomainError);
            }
            self.store.limit()
        } else {
            x
        };

        if self.sieved && x <= self.store.limit() {
            if let Some(list) = &self.list {
                return Ok(list.partition_point(|&p| p <= x) as u64);
            }
            return self.store.count(x);
        }
        Ok(estimate_pi(x))
    }
}

/// Floor of √n, corrected for f64 rounding.
fn isqrt(n: u64) -> u64 {
    let mut r = (n as f64).sqrt() as u64;
    while r > 0 && r.checked_mul(r).map_or(true, |sq| sq > n) {
        r -= 1;
    }
    while (r + 1).checked_mul(r + 1).is_some_and(|sq| sq <= n) {
        r += 1;
    }
    r
}

/// Upper-bound estimate of pi(x): (x/ln x)(1 + 1.2762/ln x). Zero below 2.
pub fn estimate_pi(x: u64) -> u64 {
    if x < 2 {
        return 0;
    }
    let xf = x as f64;
    let ln = xf.ln();
    ((xf / ln) * (1.0 + DUSART_CONSTANT / ln)) as u64
}

/// Primality by trial division over wheel-30 candidates 7, 11, 13, 17, ...
///
/// Handles every `n`, but is only efficient when `n` has a small factor or
/// √n is modest.
pub fn trial_division(n: u64) -> bool {
    if n < 2 {
        return false;
    }
    for p in [2u64, 3, 5] {
        if n % p == 0 {
            return n == p;
        }
    }

    let mut f = 7u64;
    let mut spoke = 1usize;
    while f <= n / f {
        if n % f == 0 {
            return false;
        }
        f += u64::from(wheel::GAPS[spoke]);
        spoke = wheel::next_spoke(spoke);
    }
    true
}

#[cfg(test)]
mod tests {
    //! # Engine Tests
    //!
    //! Known values of pi(x) (OEIS [A000720](https://oeis.org/A000720)):
    //! pi(100) = 25, pi(1000) = 168, pi(10000) = 1229, pi(100000) = 9592.
    //! Small segment budgets force the cursor accumulator across many
    //! segment boundaries.

    use super::*;

    fn naive_is_prime(n: u64) -> bool {
        n >= 2 && (2..).take_while(|d| d * d <= n).all(|d| n % d != 0)
    }

    // ── Sieve ──────────────────────────────────────────────────────────

    #[test]
    fn sieve_100_lists_25_primes() {
        let mut primes = Primes::new();
        primes.sieve(100).unwrap();
        let list = primes.get_list(100).unwrap();
        assert_eq!(
            list,
            &[
                2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71, 73, 79,
                83, 89, 97
            ]
        );
        assert_eq!(primes.pi(100), Ok(25));
        assert!(primes.is_prime(97));
        assert!(!primes.is_prime(100));
    }

    #[test]
    fn known_counts() {
        let mut primes = Primes::new();
        for (x, expected) in [(1000u64, 168usize), (10_000, 1229), (100_000, 9592)] {
            assert_eq!(primes.get_list(x).unwrap().len(), expected, "pi({})", x);
        }
        primes.sieve(1_000_000).unwrap();
        assert_eq!(primes.pi(0), Ok(78_498));
    }

    /// Limits below 49 never cross anything off; everything on the wheel is prime.
    #[test]
    fn tiny_limits() {
        let mut primes = Primes::new();
        primes.sieve(0).unwrap();
        assert_eq!(primes.get_list(0).unwrap(), &[] as &[u64]);
        assert_eq!(primes.get_list(1).unwrap(), &[] as &[u64]);
        assert_eq!(primes.get_list(2).unwrap(), &[2]);
        assert_eq!(primes.get_list(48).unwrap().len(), 15);
        assert_eq!(primes.get_list(49).unwrap().len(), 15);
    }

    #[test]
    fn one_byte_segments_match_naive() {
        let mut primes = Primes::with_segment_bytes(1);
        primes.sieve(5000).unwrap();
        for n in 0..=5000 {
            assert_eq!(primes.is_prime(n), naive_is_prime(n), "n={}", n);
        }
    }

    #[test]
    fn odd_segment_budgets_agree() {
        let mut reference = Primes::new();
        let expected = reference.get_list(50_000).unwrap().to_vec();
        for bytes in [1u32, 3, 7, 64, 333, 1024] {
            let mut primes = Primes::with_segment_bytes(bytes);
            assert_eq!(primes.get_list(50_000).unwrap(), &expected[..], "bytes={}", bytes);
        }
    }

    #[test]
    fn bytes_tracks_store_size() {
        let mut primes = Primes::new();
        assert_eq!(primes.bytes(), 0);
        primes.sieve(100).unwrap();
        assert_eq!(primes.bytes(), 4);
        primes.sieve(29).unwrap();
        assert_eq!(primes.bytes(), 1);
    }

    #[test]
    fn zero_segment_budget_is_raised() {
        assert_eq!(Primes::with_segment_bytes(0).segment_bytes(), 1);
        assert_eq!(Primes::new().segment_bytes(), L1D_CACHE_BYTES);
    }

    /// Squares of primes and products straddling a segment edge must be marked.
    #[test]
    fn segment_edges_are_sieved() {
        // One byte per segment: segments are [0,29], [30,59], ...
        let mut primes = Primes::with_segment_bytes(1);
        primes.sieve(2000).unwrap();
        for n in [49u64, 77, 91, 899, 961, 1147, 1681, 1849, 1997, 1999] {
            assert_eq!(primes.is_prime(n), naive_is_prime(n), "n={}", n);
        }
    }

    // ── is_prime ───────────────────────────────────────────────────────

    #[test]
    fn is_prime_small_table() {
        let primes = Primes::new();
        let expected = [
            false, false, true, true, false, true, false, true, false, false,
        ];
        for (n, &want) in expected.iter().enumerate() {
            assert_eq!(primes.is_prime(n as u64), want, "n={}", n);
        }
    }

    #[test]
    fn is_prime_beyond_sieve_uses_trial_division() {
        let mut primes = Primes::new();
        primes.sieve(1000).unwrap();
        assert!(primes.is_prime(1_000_003));
        assert!(!primes.is_prime(1_000_001)); // 101 · 9901
        assert!(primes.is_prime(2_147_483_647)); // M31
        assert!(!primes.is_prime(1_018_081)); // 1009²
        assert_eq!(primes.limit(), 1000);
    }

    #[test]
    fn is_prime_unsieved_engine() {
        let primes = Primes::new();
        assert!(!primes.is_sieved());
        assert!(primes.is_prime(97));
        assert!(!primes.is_prime(91));
    }

    #[test]
    fn isqrt_is_exact_floor() {
        for n in [0u64, 1, 2, 3, 4, 24, 25, 26, 983_040, 999_999_999_999] {
            let r = isqrt(n);
            assert!(r * r <= n && (r + 1) * (r + 1) > n, "isqrt({}) = {}", n, r);
        }
        assert_eq!(isqrt(u64::MAX), u32::MAX as u64);
    }

    #[test]
    fn trial_division_edges() {
        assert!(!trial_division(0));
        assert!(!trial_division(1));
        assert!(trial_division(2));
        assert!(trial_division(5));
        assert!(!trial_division(49));
        assert!(trial_division(4_294_967_291)); // largest prime < 2^32
        assert!(!trial_division(u64::MAX));
    }

    // ── get_list ───────────────────────────────────────────────────────

    #[test]
    fn get_list_without_bound_is_domain_error() {
        let mut primes = Primes::new();
        assert_eq!(primes.get_list(0), Err(SieveError::DomainError));
        assert_eq!(primes.pi(0), Err(SieveError::DomainError));
    }

    #[test]
    fn get_list_extends_sieve_on_demand() {
        let mut primes = Primes::new();
        primes.sieve(100).unwrap();
        assert_eq!(primes.get_list(1000).unwrap().len(), 168);
        assert_eq!(primes.limit(), 1000);
        // Smaller requests reuse the cache without resieving.
        assert_eq!(primes.get_list(100).unwrap().len(), 25);
        assert_eq!(primes.limit(), 1000);
    }

    #[test]
    fn get_list_zero_returns_everything_sieved() {
        let mut primes = Primes::new();
        primes.sieve(30).unwrap();
        assert_eq!(
            primes.get_list(0).unwrap(),
            &[2, 3, 5, 7, 11, 13, 17, 19, 23, 29]
        );
    }

    // ── pi ─────────────────────────────────────────────────────────────

    #[test]
    fn pi_with_and_without_cached_list_agree() {
        let mut primes = Primes::new();
        primes.sieve(10_000).unwrap();
        let counted: Vec<u64> = (0..=10_000).step_by(37).map(|x| primes.pi(x).unwrap()).collect();
        primes.get_list(0).unwrap();
        let searched: Vec<u64> = (0..=10_000).step_by(37).map(|x| primes.pi(x).unwrap()).collect();
        assert_eq!(counted, searched);
    }

    #[test]
    fn pi_beyond_sieve_is_estimate() {
        let mut primes = Primes::new();
        primes.sieve(100).unwrap();
        assert_eq!(primes.pi(1_000_000), Ok(estimate_pi(1_000_000)));
        // Unsieved engine with an explicit x also estimates.
        assert_eq!(Primes::new().pi(1000), Ok(estimate_pi(1000)));
    }

    #[test]
    fn estimate_pi_is_an_upper_bound() {
        assert_eq!(estimate_pi(0), 0);
        assert_eq!(estimate_pi(1), 0);
        for (x, exact) in [(1000u64, 168u64), (100_000, 9592), (1_000_000, 78_498)] {
            let est = estimate_pi(x);
            assert!(est >= exact, "estimate_pi({}) = {} < {}", x, est, exact);
            assert!((est - exact) as f64 / (exact as f64) < 0.05, "x={}", x);
        }
    }
}
