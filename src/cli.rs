//! Command-line interface definitions for phashdupe.
//!
//! The short flags follow the classic perceptual-hash compare tool so that
//! existing scripts keep working; the long-only options are additions.
//!
//! # Example
//!
//! ```bash
//! # Compare every image under ~/Pictures, reporting pairs within distance 8
//! phashdupe -i -d 8 -r ~/Pictures
//!
//! # Build a fingerprint cache for videos without comparing
//! phashdupe -v -g -s videos.db -j 8 -r ~/Videos -t mp4 -t mkv
//!
//! # Compare using the cache and persist anything new
//! phashdupe -v -s videos.db -w -r ~/Videos --format json
//!
//! # Paths from stdin
//! find . -name '*.png' | phashdupe -i -d 4
//! ```

use clap::{ArgGroup, Parser, ValueEnum};
use std::path::PathBuf;

/// Find near-duplicate images and videos with perceptual fingerprints.
///
/// Fingerprints are computed in parallel, optionally cached in a plain-text
/// store, and every pair of files is reported with its Hamming distance.
#[derive(Debug, Parser)]
#[command(name = "phashdupe")]
#[command(author, version, about, long_about = None)]
#[command(group(ArgGroup::new("mode").required(true).args(["image", "video"])))]
pub struct Cli {
    /// Only report pairs whose distance is at most this value
    #[arg(short = 'd', long = "distance", value_name = "THRESHOLD")]
    pub threshold: Option<u32>,

    /// Fingerprint cache file to load from and append to
    #[arg(short = 's', long = "store", value_name = "PATH")]
    pub source: Option<PathBuf>,

    /// Persist newly computed fingerprints to the cache after reporting
    #[arg(short = 'w', long = "write")]
    pub write: bool,

    /// Compute and persist fingerprints only, without comparing
    #[arg(short = 'g', long = "generate", requires = "source")]
    pub generate: bool,

    /// Number of concurrent hashing workers
    #[arg(short = 'j', long = "jobs", value_name = "N", value_parser = parse_jobs)]
    pub jobs: Option<usize>,

    /// Fingerprint files as images (PNG, GIF, BMP, TIFF, WebP; JPEG is not supported)
    #[arg(short = 'i', long = "image")]
    pub image: bool,

    /// Fingerprint files as videos (key frames decoded with ffmpeg)
    #[arg(short = 'v', long = "video")]
    pub video: bool,

    /// Recursively collect files under this directory (repeatable)
    #[arg(short = 'r', long = "recursive", value_name = "DIR")]
    pub dirs: Vec<PathBuf>,

    /// Restrict recursive collection to this extension (repeatable)
    #[arg(short = 't', long = "type", value_name = "EXT")]
    pub extensions: Vec<String>,

    /// Files to fingerprint; paths are read from stdin when no files are found
    #[arg(value_name = "FILE")]
    pub files: Vec<PathBuf>,

    /// Report format
    #[arg(long, value_enum, default_value = "text")]
    pub format: ReportFormat,

    /// Show a progress bar while fingerprinting
    #[arg(long)]
    pub progress: bool,

    /// Increase log verbosity (--verbose for debug, twice for trace)
    #[arg(long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all diagnostics except errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output fatal errors as JSON on stderr
    #[arg(long)]
    pub json_errors: bool,

    /// Configuration file to use instead of the platform default
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// Output format for the duplicate report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ReportFormat {
    /// `<distance> - <path> - <other>` lines
    #[default]
    Text,
    /// Array of groups for scripting
    Json,
}

impl std::fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportFormat::Text => write!(f, "text"),
            ReportFormat::Json => write!(f, "json"),
        }
    }
}

/// Parse a worker count, which must be a positive integer.
///
/// # Examples
///
/// ```
/// use phashdupe::cli::parse_jobs;
///
/// assert_eq!(parse_jobs("4").unwrap(), 4);
/// assert!(parse_jobs("0").is_err());
/// assert!(parse_jobs("many").is_err());
/// ```
///
/// # Errors
///
/// Returns an error if the value is not an integer or is zero.
pub fn parse_jobs(s: &str) -> Result<usize, String> {
    let jobs: usize = s
        .trim()
        .parse()
        .map_err(|_| format!("Invalid worker count: '{s}'"))?;
    if jobs == 0 {
        return Err("Worker count must be at least 1".to_string());
    }
    Ok(jobs)
}
