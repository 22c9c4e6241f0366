//! Perceptual image hashing.
//!
//! Images are hashed with a DCT-based median hash over an 8x8 coefficient
//! grid, which yields exactly one 64-bit block. The hash is stable under
//! resizing and recompression.

use std::path::Path;

use image::DynamicImage;
use image_hasher::{HashAlg, HasherConfig};

use super::{FingerprintSource, HashError, HashKind};
use crate::fingerprint::Fingerprint;

/// Side length of the hash grid; `HASH_SIDE * HASH_SIDE` must be 64.
const HASH_SIDE: u32 = 8;

/// Computes single-block fingerprints for images.
pub struct PerceptualHasher {
    hasher: image_hasher::Hasher,
}

impl PerceptualHasher {
    /// Create a new hasher.
    #[must_use]
    pub fn new() -> Self {
        let hasher = HasherConfig::new()
            .hash_size(HASH_SIDE, HASH_SIDE)
            .hash_alg(HashAlg::Median)
            .preproc_dct()
            .to_hasher();
        Self { hasher }
    }

    /// Hash an already decoded image into one 64-bit block.
    ///
    /// Used directly by the video hasher for sampled frames.
    #[must_use]
    pub fn hash_block(&self, img: &DynamicImage) -> u64 {
        let hash = self.hasher.hash_image(img);
        hash.as_bytes()
            .iter()
            .take(8)
            .fold(0u64, |acc, &byte| (acc << 8) | u64::from(byte))
    }
}

impl Default for PerceptualHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl FingerprintSource for PerceptualHasher {
    fn kind(&self) -> HashKind {
        HashKind::Image
    }

    fn fingerprint(&self, path: &Path) -> Result<Fingerprint, HashError> {
        let img = image::open(path).map_err(|source| HashError::Image {
            path: path.to_path_buf(),
            source,
        })?;

        let block = self.hash_block(&img);
        if block == 0 {
            return Err(HashError::Degenerate(path.to_path_buf()));
        }
        Ok(Fingerprint::single(block))
    }
}
