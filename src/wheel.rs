//! # Wheel — Mod-30 Residue Codec
//!
//! Every integer coprime to 30 = 2·3·5 falls on one of 8 "spokes" of the
//! wheel: residues {1, 7, 11, 13, 17, 19, 23, 29}. The bit-packed store keeps
//! one byte per block of 30 integers, bit `i` holding spoke `RESIDUES[i]`.
//!
//! The mapping is expressed as constant lookup tables so that neither the
//! store nor the sieve ever branches on a residue.

/// Width of one wheel block (one byte of storage).
pub const MODULUS: u64 = 30;

/// Number of spokes per block.
pub const SPOKES: usize = 8;

/// Spoke residues in bit order: bit `i` of a block byte is `RESIDUES[i]`.
pub const RESIDUES: [u8; SPOKES] = [1, 7, 11, 13, 17, 19, 23, 29];

/// Distance from `RESIDUES[i]` to the next spoke (wrapping 29 → 31).
pub const GAPS: [u8; SPOKES] = [6, 4, 2, 4, 2, 4, 6, 2];

/// Marker in [`RESIDUE_TO_SPOKE`] for residues that share a factor with 30.
pub const NOT_ON_WHEEL: u8 = 255;

/// Residue → bit mask within a block byte; 0 when divisible by 2, 3 or 5.
pub const RESIDUE_TO_BIT: [u8; 30] = [
    0, 0x01, 0, 0, 0, 0, 0, 0x02, 0, 0, 0, 0x04, 0, 0x08, 0, 0, 0, 0x10, 0, 0x20, 0, 0, 0, 0x40,
    0, 0, 0, 0, 0, 0x80,
];

/// Residue → spoke index (0..8); [`NOT_ON_WHEEL`] off the wheel.
pub const RESIDUE_TO_SPOKE: [u8; 30] = [
    255, 0, 255, 255, 255, 255, 255, 1, 255, 255, 255, 2, 255, 3, 255, 255, 255, 4, 255, 5, 255,
    255, 255, 6, 255, 255, 255, 255, 255, 7,
];

/// Block index holding `n`.
#[inline]
pub fn block(n: u64) -> u64 {
    n / MODULUS
}

/// Bit mask for `n` inside its block, or 0 if `n` is divisible by 2, 3 or 5.
#[inline]
pub fn bit_mask(n: u64) -> u8 {
    RESIDUE_TO_BIT[(n % MODULUS) as usize]
}

/// Spoke index of `n`, or `None` if `n` is not coprime to 30.
#[inline]
pub fn spoke(n: u64) -> Option<usize> {
    match RESIDUE_TO_SPOKE[(n % MODULUS) as usize] {
        NOT_ON_WHEEL => None,
        idx => Some(idx as usize),
    }
}

/// Spoke following `idx`, wrapping after spoke 7 (residue 29).
#[inline]
pub fn next_spoke(idx: usize) -> usize {
    (idx + 1) % SPOKES
}

/// Reconstruct the integer stored at (`block`, `bit`).
#[inline]
pub fn value_at(block: u64, bit: usize) -> u64 {
    block * MODULUS + RESIDUES[bit] as u64
}
