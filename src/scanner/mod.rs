//! Scanner module for input discovery and fingerprint computation.
//!
//! This module provides functionality for:
//! - Recursive file collection with extension filtering
//! - Reading a path list from standard input
//! - Perceptual image hashing
//! - Perceptual video hashing via `ffmpeg`
//!
//! # Architecture
//!
//! The scanner is divided into submodules:
//! - [`walker`]: Directory traversal and path list parsing
//! - [`perceptual`]: Image fingerprints (one 64-bit block)
//! - [`video`]: Video fingerprints (one 64-bit block per sampled frame)
//!
//! Both hashers implement [`FingerprintSource`], the single capability the
//! hashing pipeline depends on.

pub mod perceptual;
pub mod video;
pub mod walker;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::fingerprint::Fingerprint;

pub use perceptual::PerceptualHasher;
pub use video::VideoHasher;
pub use walker::{collect_files, read_path_list};

/// Which kind of media is being fingerprinted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashKind {
    /// Still images: one block per file.
    Image,
    /// Videos: one block per sampled frame.
    Video,
}

impl std::fmt::Display for HashKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Image => write!(f, "image"),
            Self::Video => write!(f, "video"),
        }
    }
}

/// Something that can compute a fingerprint for a file.
///
/// Implementations must be usable from several worker threads at once.
pub trait FingerprintSource: Send + Sync {
    /// The media kind this source handles.
    fn kind(&self) -> HashKind;

    /// Compute the fingerprint of the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns a [`HashError`] if the file cannot be decoded or the result is
    /// empty or degenerate.
    fn fingerprint(&self, path: &Path) -> Result<Fingerprint, HashError>;
}

/// Errors that can occur while fingerprinting a single file.
#[derive(thiserror::Error, Debug)]
pub enum HashError {
    /// The file could not be opened or decoded as an image.
    #[error("Failed to load image {path}: {source}")]
    Image {
        /// Path of the file
        path: PathBuf,
        /// The underlying decoder error
        #[source]
        source: image::ImageError,
    },

    /// The external decoder could not be started.
    #[error("Failed to run {program} for {path}: {source}")]
    Spawn {
        /// Decoder program
        program: String,
        /// Path of the file
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The external decoder exited unsuccessfully.
    #[error("Decoder failed for {path}: {message}")]
    Decoder {
        /// Path of the file
        path: PathBuf,
        /// Exit status and captured diagnostics
        message: String,
    },

    /// Decoding succeeded but produced nothing to hash.
    #[error("No frames could be sampled from {0}")]
    Empty(PathBuf),

    /// The computed fingerprint carries no information (all bits zero).
    #[error("Degenerate fingerprint for {0}")]
    Degenerate(PathBuf),
}
