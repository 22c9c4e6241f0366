//! Perceptual fingerprints and the distance between them.
//!
//! A [`Fingerprint`] is an ordered, non-empty run of 64-bit blocks. Image
//! fingerprints are a single block; video fingerprints carry one block per
//! sampled frame and their length varies from file to file.
//!
//! # Example
//!
//! ```
//! use phashdupe::fingerprint::Fingerprint;
//!
//! let a = Fingerprint::single(0b1011);
//! let b = Fingerprint::single(0b0001);
//! assert_eq!(a.distance(&b), 2);
//!
//! // Every unmatched trailing block counts as maximally distant.
//! let long = Fingerprint::new(vec![0b1011, 0, 0]).unwrap();
//! assert_eq!(a.distance(&long), 128);
//! ```

pub mod codec;

use std::fmt;
use std::sync::Arc;

pub use codec::{decode, encode, CodecError};

/// Number of bits in one fingerprint block.
pub const BLOCK_BITS: u32 = u64::BITS;

/// Hamming distance between two blocks.
#[inline]
#[must_use]
pub fn block_distance(a: u64, b: u64) -> u32 {
    (a ^ b).count_ones()
}

/// An immutable, non-empty sequence of 64-bit blocks.
///
/// Cloning is cheap: the blocks live in a reference-counted slice, so a
/// fingerprint loaded from the cache and its working-set copy share storage.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    blocks: Arc<[u64]>,
}

impl Fingerprint {
    /// Build a fingerprint from its blocks.
    ///
    /// Returns `None` when `blocks` is empty.
    #[must_use]
    pub fn new(blocks: Vec<u64>) -> Option<Self> {
        if blocks.is_empty() {
            None
        } else {
            Some(Self {
                blocks: blocks.into(),
            })
        }
    }

    /// Build a single-block fingerprint, as produced for images.
    #[must_use]
    pub fn single(block: u64) -> Self {
        Self {
            blocks: Arc::from([block]),
        }
    }

    /// The blocks in order.
    #[must_use]
    pub fn blocks(&self) -> &[u64] {
        &self.blocks
    }

    /// Number of blocks; always at least one.
    #[must_use]
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Always `false`; present for API symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Whether every block is zero.
    ///
    /// The hashing backends treat an all-zero result as a failed computation.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.blocks.iter().all(|&b| b == 0)
    }

    /// Distance to another fingerprint.
    ///
    /// Blocks are paired by index up to the shorter length and their Hamming
    /// distances summed. Each trailing block of the longer fingerprint adds
    /// [`BLOCK_BITS`]. The result is symmetric and saturates at `u32::MAX`.
    #[must_use]
    pub fn distance(&self, other: &Fingerprint) -> u32 {
        let paired = self
            .blocks
            .iter()
            .zip(other.blocks.iter())
            .fold(0u32, |acc, (&a, &b)| {
                acc.saturating_add(block_distance(a, b))
            });

        let unmatched = self.blocks.len().abs_diff(other.blocks.len());
        let penalty = u32::try_from(unmatched)
            .unwrap_or(u32::MAX)
            .saturating_mul(BLOCK_BITS);

        paired.saturating_add(penalty)
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Fingerprint")
            .field(&encode(self))
            .finish()
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&encode(self))
    }
}
