//! Near-duplicate finder orchestrating cache, pipeline and comparison.
//!
//! # Overview
//!
//! 1. **Cache lookup**: inputs already present in the fingerprint store reuse
//!    their stored fingerprint as is.
//! 2. **Pipeline**: the remaining inputs are fingerprinted concurrently (see
//!    [`crate::duplicates::pipeline`]).
//! 3. **Merge**: cache hits and fresh results are put back into input order,
//!    each tagged with its [`Origin`].
//! 4. **Compare**: all pairs are compared (skipped in generate-only mode).
//! 5. **Persist**: freshly computed entries can be appended to the store with
//!    [`Finder::persist`], typically after the report has been written.
//!
//! # Example
//!
//! ```no_run
//! use phashdupe::cache::FingerprintStore;
//! use phashdupe::duplicates::{Finder, FinderConfig};
//! use phashdupe::scanner::PerceptualHasher;
//! use std::path::PathBuf;
//! use std::sync::Arc;
//!
//! let config = FinderConfig::default()
//!     .with_workers(4)
//!     .with_threshold(Some(10))
//!     .with_store(Arc::new(FingerprintStore::new("hashes.db")))
//!     .with_persist(true);
//! let finder = Finder::new(Arc::new(PerceptualHasher::new()), config);
//!
//! let inputs = vec![PathBuf::from("a.png"), PathBuf::from("b.png")];
//! let outcome = finder.find(&inputs).unwrap();
//! if let Some(report) = &outcome.report {
//!     for (distance, a, b) in report.pairs() {
//!         println!("{} - {} - {}", distance, a.display(), b.display());
//!     }
//! }
//! finder.persist(&outcome).unwrap();
//! ```

use std::collections::{HashMap, HashSet};
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use thiserror::Error;

use super::compare::{compare, Report};
use super::pipeline::{self, PipelineConfig, PipelineError};
use super::{Origin, WorkingEntry};
use crate::cache::{CacheEntry, CacheError, FingerprintMap, FingerprintStore};
use crate::fingerprint::Fingerprint;
use crate::progress::ProgressCallback;
use crate::scanner::FingerprintSource;

/// Errors that abort a finder run.
#[derive(Debug, Error)]
pub enum FinderError {
    /// The fingerprint cache exists but could not be read.
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// The hashing pipeline could not be started.
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    /// Fingerprinting was interrupted by a shutdown request.
    #[error("Interrupted before all fingerprints were computed")]
    Interrupted,
}

/// What the finder does after fingerprinting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FinderMode {
    /// Compare all pairs and produce a report.
    #[default]
    Compare,
    /// Only compute fingerprints so they can be persisted; no report.
    GenerateOnly,
}

/// Configuration for the finder.
#[derive(Clone)]
pub struct FinderConfig {
    /// Number of concurrent hashing workers.
    pub workers: usize,
    /// Maximum distance of reported pairs; `None` reports every pair.
    pub threshold: Option<u32>,
    /// Optional fingerprint store to load from and persist to.
    pub store: Option<Arc<FingerprintStore>>,
    /// Persist newly computed fingerprints after a compare run.
    pub persist: bool,
    /// Compare or generate-only.
    pub mode: FinderMode,
    /// Optional progress callback for the hashing phase.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
    /// Optional shutdown flag for graceful termination.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
}

impl std::fmt::Debug for FinderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinderConfig")
            .field("workers", &self.workers)
            .field("threshold", &self.threshold)
            .field("store", &self.store.as_ref().map(|s| s.path().to_path_buf()))
            .field("persist", &self.persist)
            .field("mode", &self.mode)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .field("shutdown_flag", &self.shutdown_flag)
            .finish()
    }
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            workers: 1,
            threshold: None,
            store: None,
            persist: false,
            mode: FinderMode::Compare,
            progress_callback: None,
            shutdown_flag: None,
        }
    }
}

impl FinderConfig {
    /// Set the number of hashing workers.
    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Set the reporting threshold.
    #[must_use]
    pub fn with_threshold(mut self, threshold: Option<u32>) -> Self {
        self.threshold = threshold;
        self
    }

    /// Set the fingerprint store.
    #[must_use]
    pub fn with_store(mut self, store: Arc<FingerprintStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Persist newly computed fingerprints after comparing.
    #[must_use]
    pub fn with_persist(mut self, persist: bool) -> Self {
        self.persist = persist;
        self
    }

    /// Set the run mode.
    #[must_use]
    pub fn with_mode(mut self, mode: FinderMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Set the shutdown flag for graceful termination.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Whether a run with this configuration writes to the store.
    #[must_use]
    pub fn writes_store(&self) -> bool {
        self.store.is_some() && (self.persist || self.mode == FinderMode::GenerateOnly)
    }

    fn pipeline_config(&self) -> PipelineConfig {
        let mut config = PipelineConfig::default().with_workers(self.workers);
        if let Some(ref callback) = self.progress_callback {
            config = config.with_progress_callback(Arc::clone(callback));
        }
        if let Some(ref flag) = self.shutdown_flag {
            config = config.with_shutdown_flag(Arc::clone(flag));
        }
        config
    }
}

/// Counters describing a finder run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FinderSummary {
    /// Paths supplied, including repeats
    pub input_files: usize,
    /// Distinct paths after dropping repeats
    pub unique_files: usize,
    /// Records loaded from the store
    pub cache_entries: usize,
    /// Inputs answered from the store
    pub cache_hits: usize,
    /// Inputs fingerprinted in this run
    pub computed: usize,
    /// Inputs whose fingerprint could not be computed
    pub failed: usize,
}

/// Result of [`Finder::find`].
#[derive(Debug)]
pub struct FinderOutcome {
    /// The working set in input order
    pub working_set: Vec<WorkingEntry>,
    /// Comparison report; `None` in generate-only mode
    pub report: Option<Report>,
    /// Run counters
    pub summary: FinderSummary,
}

impl FinderOutcome {
    /// Working-set entries computed during this run, in input order.
    pub fn computed_entries(&self) -> impl Iterator<Item = &WorkingEntry> + '_ {
        self.working_set.iter().filter(|e| e.is_computed())
    }
}

/// Orchestrates one near-duplicate search.
pub struct Finder {
    source: Arc<dyn FingerprintSource>,
    config: FinderConfig,
}

impl Finder {
    /// Create a finder using `source` to fingerprint files missing from the cache.
    #[must_use]
    pub fn new(source: Arc<dyn FingerprintSource>, config: FinderConfig) -> Self {
        Self { source, config }
    }

    /// The finder configuration.
    #[must_use]
    pub fn config(&self) -> &FinderConfig {
        &self.config
    }

    /// Build the working set for `inputs` and, in compare mode, the report.
    ///
    /// Repeated input paths are considered once, at their first position.
    /// Paths are matched against each other and the cache as exact strings.
    ///
    /// # Errors
    ///
    /// Fails if the store cannot be read, the pipeline cannot start, or the
    /// run was interrupted. Individual files that cannot be fingerprinted are
    /// logged and left out instead.
    pub fn find(&self, inputs: &[PathBuf]) -> Result<FinderOutcome, FinderError> {
        let unique = dedup_preserving_order(inputs);
        if unique.len() < inputs.len() {
            log::debug!(
                "Ignoring {} repeated input path(s)",
                inputs.len() - unique.len()
            );
        }

        let cached = self.load_cache()?;

        let (hits, misses): (Vec<&Path>, Vec<&Path>) =
            unique.iter().partition(|p| cached.contains_key(p.as_os_str()));
        for path in &hits {
            log::debug!("Loaded fingerprint for {} from cache", path.display());
        }
        log::info!(
            "{} of {} file(s) found in cache, {} to fingerprint",
            hits.len(),
            unique.len(),
            misses.len()
        );

        let to_compute: Vec<PathBuf> = misses.iter().map(|p| p.to_path_buf()).collect();
        let output = pipeline::compute(
            to_compute,
            self.source.as_ref(),
            &self.config.pipeline_config(),
        )?;
        if output.stats.interrupted {
            return Err(FinderError::Interrupted);
        }

        let mut fresh: HashMap<OsString, Fingerprint> = output
            .results
            .into_iter()
            .map(|(path, fp)| (path.into_os_string(), fp))
            .collect();
        let working_set: Vec<WorkingEntry> = unique
            .iter()
            .filter_map(|&path| {
                if let Some(fp) = cached.get(path.as_os_str()) {
                    Some(WorkingEntry::new(path, fp.clone(), Origin::Cached))
                } else {
                    fresh
                        .remove(path.as_os_str())
                        .map(|fp| WorkingEntry::new(path, fp, Origin::Computed))
                }
            })
            .collect();

        let summary = FinderSummary {
            input_files: inputs.len(),
            unique_files: unique.len(),
            cache_entries: cached.len(),
            cache_hits: hits.len(),
            computed: output.stats.hashed_files,
            failed: output.stats.failed_files,
        };

        let report = match self.config.mode {
            FinderMode::Compare => Some(compare(&working_set, self.config.threshold)),
            FinderMode::GenerateOnly => None,
        };

        Ok(FinderOutcome {
            working_set,
            report,
            summary,
        })
    }

    /// Append the entries computed in `outcome` to the store, if this
    /// configuration asks for it.
    ///
    /// Returns `Ok(None)` when nothing is to be written because no store is
    /// configured or persistence is off, and `Ok(Some(n))` with the number of
    /// lines appended otherwise. Cached entries are never written again.
    ///
    /// # Errors
    ///
    /// Returns the store's [`CacheError`] if the append fails. The outcome
    /// itself is unaffected.
    pub fn persist(&self, outcome: &FinderOutcome) -> Result<Option<usize>, CacheError> {
        if !self.config.writes_store() {
            return Ok(None);
        }
        let Some(ref store) = self.config.store else {
            return Ok(None);
        };

        let entries: Vec<CacheEntry> = outcome
            .computed_entries()
            .map(|e| CacheEntry::new(e.path.clone(), e.fingerprint.clone()))
            .collect();
        if entries.is_empty() {
            log::info!("No new fingerprints to save (all files already in cache)");
            return Ok(Some(0));
        }

        let written = store.append(&entries)?;
        log::info!(
            "Saved {} new fingerprint(s) to {}",
            written,
            store.path().display()
        );
        Ok(Some(written))
    }

    fn load_cache(&self) -> Result<FingerprintMap, CacheError> {
        match self.config.store {
            Some(ref store) => {
                let map = store.load()?;
                log::info!(
                    "Loaded {} existing fingerprint(s) from {}",
                    map.len(),
                    store.path().display()
                );
                Ok(map)
            }
            None => Ok(FingerprintMap::new()),
        }
    }
}

fn dedup_preserving_order(inputs: &[PathBuf]) -> Vec<&Path> {
    let mut seen: HashSet<&OsStr> = HashSet::with_capacity(inputs.len());
    inputs
        .iter()
        .map(PathBuf::as_path)
        .filter(|p| seen.insert(p.as_os_str()))
        .collect()
}
