//! Near-duplicate detection module.
//!
//! This module provides functionality for:
//! - Concurrent fingerprint computation ([`pipeline`])
//! - All-pairs comparison and report grouping ([`compare`])
//! - Orchestration of cache, pipeline, comparison and persistence ([`finder`])

pub mod compare;
pub mod finder;
pub mod pipeline;

use std::path::PathBuf;

use crate::fingerprint::Fingerprint;

pub use compare::{compare, Match, Report, ReportGroup};
pub use finder::{Finder, FinderConfig, FinderError, FinderMode, FinderOutcome, FinderSummary};
pub use pipeline::{PipelineConfig, PipelineError, PipelineOutput, PipelineStats};

/// Where a working-set fingerprint came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Loaded from the fingerprint cache.
    Cached,
    /// Computed during this run.
    Computed,
}

/// One `(path, fingerprint)` pair of the working set, tagged with its origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkingEntry {
    /// File path as supplied
    pub path: PathBuf,
    /// The file's fingerprint
    pub fingerprint: Fingerprint,
    /// Cache hit or fresh computation
    pub origin: Origin,
}

impl WorkingEntry {
    /// Create a new working-set entry.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, fingerprint: Fingerprint, origin: Origin) -> Self {
        Self {
            path: path.into(),
            fingerprint,
            origin,
        }
    }

    /// Whether the fingerprint was computed during this run.
    #[must_use]
    pub fn is_computed(&self) -> bool {
        self.origin == Origin::Computed
    }
}
