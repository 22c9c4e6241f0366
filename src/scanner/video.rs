//! Perceptual video hashing through the `ffmpeg` command-line tool.
//!
//! `ffmpeg` is asked to emit only intra-coded (key) frames, scaled down to
//! small grayscale raw frames on stdout. Each frame is hashed with the image
//! hasher, giving one 64-bit block per key frame. Longer videos therefore get
//! longer fingerprints.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use image::{DynamicImage, GrayImage};

use super::perceptual::PerceptualHasher;
use super::{FingerprintSource, HashError, HashKind};
use crate::fingerprint::Fingerprint;

/// Default decoder program, resolved through `PATH`.
pub const DEFAULT_FFMPEG: &str = "ffmpeg";

/// Width and height of the frames requested from the decoder.
const FRAME_SIDE: u32 = 32;

/// Bytes in one raw 8-bit grayscale frame.
const FRAME_BYTES: usize = (FRAME_SIDE * FRAME_SIDE) as usize;

/// Computes multi-block fingerprints for videos.
pub struct VideoHasher {
    ffmpeg: PathBuf,
    frames: PerceptualHasher,
}

impl VideoHasher {
    /// Create a hasher that runs the given `ffmpeg` binary.
    #[must_use]
    pub fn new(ffmpeg: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            frames: PerceptualHasher::new(),
        }
    }

    /// The decoder program this hasher runs.
    #[must_use]
    pub fn program(&self) -> &Path {
        &self.ffmpeg
    }

    fn decode_key_frames(&self, path: &Path) -> Result<Vec<u8>, HashError> {
        let filter = format!(
            "select='eq(pict_type,PICT_TYPE_I)',scale={FRAME_SIDE}:{FRAME_SIDE},format=gray"
        );
        let output = Command::new(&self.ffmpeg)
            .args(["-nostdin", "-hide_banner", "-loglevel", "error", "-i"])
            .arg(path)
            .args(["-vf", &filter, "-vsync", "vfr", "-f", "rawvideo", "-"])
            .stdin(Stdio::null())
            .output()
            .map_err(|source| HashError::Spawn {
                program: self.ffmpeg.display().to_string(),
                path: path.to_path_buf(),
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(HashError::Decoder {
                path: path.to_path_buf(),
                message: format!("{} ({})", output.status, stderr.trim()),
            });
        }

        Ok(output.stdout)
    }

    /// Hash a buffer of concatenated raw grayscale frames.
    ///
    /// A trailing partial frame is ignored.
    fn hash_frames(&self, raw: &[u8]) -> Vec<u64> {
        raw.chunks_exact(FRAME_BYTES)
            .filter_map(|chunk| GrayImage::from_raw(FRAME_SIDE, FRAME_SIDE, chunk.to_vec()))
            .map(|frame| self.frames.hash_block(&DynamicImage::ImageLuma8(frame)))
            .collect()
    }
}

impl Default for VideoHasher {
    fn default() -> Self {
        Self::new(DEFAULT_FFMPEG)
    }
}

impl FingerprintSource for VideoHasher {
    fn kind(&self) -> HashKind {
        HashKind::Video
    }

    fn fingerprint(&self, path: &Path) -> Result<Fingerprint, HashError> {
        let raw = self.decode_key_frames(path)?;
        let blocks = self.hash_frames(&raw);
        log::trace!("Sampled {} key frame(s) from {}", blocks.len(), path.display());

        let fingerprint =
            Fingerprint::new(blocks).ok_or_else(|| HashError::Empty(path.to_path_buf()))?;
        if fingerprint.is_degenerate() {
            return Err(HashError::Degenerate(path.to_path_buf()));
        }
        Ok(fingerprint)
    }
}
