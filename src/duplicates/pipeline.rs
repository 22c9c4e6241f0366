//! Concurrent fingerprint computation.
//!
//! # Overview
//!
//! The pipeline takes the paths that were not found in the cache and hands
//! them to a [`FingerprintSource`]. Work is distributed through a shared FIFO
//! queue: each worker repeatedly claims the next path, computes its
//! fingerprint to completion and pushes the result into a shared results
//! list. The queue and the results each sit behind their own mutex.
//!
//! A dedicated rayon pool of exactly `workers` threads is built for every
//! call and torn down when it returns. With one worker (or at most one path)
//! the same drain loop simply runs on the calling thread.
//!
//! Failures are per file: the path is logged and dropped, the rest continue.
//! Result order is unspecified; callers re-associate results by path.
//!
//! # Example
//!
//! ```no_run
//! use phashdupe::duplicates::pipeline::{compute, PipelineConfig};
//! use phashdupe::scanner::PerceptualHasher;
//! use std::path::PathBuf;
//!
//! let paths = vec![PathBuf::from("a.png"), PathBuf::from("b.png")];
//! let config = PipelineConfig::default().with_workers(4);
//! let output = compute(paths, &PerceptualHasher::new(), &config).unwrap();
//! println!("{} fingerprints", output.results.len());
//! ```

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use thiserror::Error;

use crate::fingerprint::Fingerprint;
use crate::progress::ProgressCallback;
use crate::scanner::FingerprintSource;

/// Phase name reported to progress callbacks.
pub const PHASE_FINGERPRINT: &str = "fingerprint";

/// Errors that prevent the pipeline from running at all.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Zero workers were requested.
    #[error("Worker count must be at least 1, got {0}")]
    InvalidWorkerCount(usize),

    /// The worker thread pool could not be created.
    #[error("Failed to start worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Configuration for a pipeline run.
#[derive(Clone)]
pub struct PipelineConfig {
    /// Number of concurrent workers.
    pub workers: usize,
    /// Optional progress callback.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
    /// Optional shutdown flag; once set no further paths are claimed.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
}

impl std::fmt::Debug for PipelineConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineConfig")
            .field("workers", &self.workers)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .field("shutdown_flag", &self.shutdown_flag)
            .finish()
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            workers: 1,
            progress_callback: None,
            shutdown_flag: None,
        }
    }
}

impl PipelineConfig {
    /// Set the worker count. Zero is rejected when the pipeline runs.
    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
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
}

/// Statistics from one pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineStats {
    /// Paths handed to the pipeline
    pub input_files: usize,
    /// Paths fingerprinted successfully
    pub hashed_files: usize,
    /// Paths whose fingerprint could not be computed
    pub failed_files: usize,
    /// Whether the run stopped early because of a shutdown request
    pub interrupted: bool,
}

/// Fingerprints computed by the pipeline, in completion order.
#[derive(Debug, Default)]
pub struct PipelineOutput {
    /// Successfully fingerprinted paths
    pub results: Vec<(PathBuf, Fingerprint)>,
    /// Run statistics
    pub stats: PipelineStats,
}

/// Shared state for one run.
struct WorkQueue<'a> {
    source: &'a dyn FingerprintSource,
    config: &'a PipelineConfig,
    total: usize,
    pending: Mutex<VecDeque<PathBuf>>,
    results: Mutex<Vec<(PathBuf, Fingerprint)>>,
    processed: AtomicUsize,
    failed: AtomicUsize,
    interrupted: AtomicBool,
}

impl<'a> WorkQueue<'a> {
    fn new(
        paths: Vec<PathBuf>,
        source: &'a dyn FingerprintSource,
        config: &'a PipelineConfig,
    ) -> Self {
        let total = paths.len();
        Self {
            source,
            config,
            total,
            pending: Mutex::new(paths.into()),
            results: Mutex::new(Vec::with_capacity(total)),
            processed: AtomicUsize::new(0),
            failed: AtomicUsize::new(0),
            interrupted: AtomicBool::new(false),
        }
    }

    fn is_shutdown_requested(&self) -> bool {
        self.config
            .shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    /// Pop the next path, or `None` when the queue is drained or a shutdown
    /// was requested.
    fn claim(&self) -> Option<PathBuf> {
        if self.is_shutdown_requested() {
            self.interrupted.store(true, Ordering::SeqCst);
            return None;
        }
        self.pending
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .pop_front()
    }

    /// Worker loop: claim, compute, record, until there is nothing left.
    fn drain(&self) {
        while let Some(path) = self.claim() {
            let outcome = self.source.fingerprint(&path);
            let current = self.processed.fetch_add(1, Ordering::SeqCst) + 1;
            let label = path.to_string_lossy().into_owned();

            match outcome {
                Ok(fingerprint) if fingerprint.is_degenerate() => {
                    self.failed.fetch_add(1, Ordering::SeqCst);
                    log::warn!(
                        "Failed to compute {} fingerprint for {}: degenerate result",
                        self.source.kind(),
                        path.display()
                    );
                }
                Ok(fingerprint) => {
                    log::info!(
                        "Computed {} fingerprint for {}",
                        self.source.kind(),
                        path.display()
                    );
                    self.results
                        .lock()
                        .unwrap_or_else(|poisoned| poisoned.into_inner())
                        .push((path, fingerprint));
                }
                Err(e) => {
                    self.failed.fetch_add(1, Ordering::SeqCst);
                    log::warn!(
                        "Failed to compute {} fingerprint for {}: {}",
                        self.source.kind(),
                        path.display(),
                        e
                    );
                }
            }

            if let Some(ref callback) = self.config.progress_callback {
                callback.on_progress(current, &label);
            }
        }
    }

    fn finish(self) -> PipelineOutput {
        let results = self
            .results
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let remaining = self
            .pending
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len();

        let stats = PipelineStats {
            input_files: self.total,
            hashed_files: results.len(),
            failed_files: self.failed.into_inner(),
            interrupted: self.interrupted.into_inner() && remaining > 0,
        };
        PipelineOutput { results, stats }
    }
}

/// Compute fingerprints for `paths` with `config.workers` concurrent workers.
///
/// Paths whose fingerprint cannot be computed (including all-zero results)
/// are left out of the output. Results arrive in completion order, which is
/// only the input order when running sequentially.
///
/// # Errors
///
/// Returns [`PipelineError::InvalidWorkerCount`] for zero workers and
/// [`PipelineError::ThreadPool`] if the worker threads cannot be started.
pub fn compute(
    paths: Vec<PathBuf>,
    source: &dyn FingerprintSource,
    config: &PipelineConfig,
) -> Result<PipelineOutput, PipelineError> {
    if config.workers == 0 {
        return Err(PipelineError::InvalidWorkerCount(0));
    }

    if paths.is_empty() {
        log::debug!("Pipeline: No files to fingerprint");
        return Ok(PipelineOutput::default());
    }

    let total = paths.len();
    let workers = config.workers.min(total);

    if let Some(ref callback) = config.progress_callback {
        callback.on_phase_start(PHASE_FINGERPRINT, total);
    }

    let queue = WorkQueue::new(paths, source, config);

    if workers <= 1 {
        log::debug!("Pipeline: Fingerprinting {} file(s) sequentially", total);
        queue.drain();
    } else {
        log::info!(
            "Processing {} files with {} workers",
            total,
            workers
        );
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("fingerprint-worker-{i}"))
            .build()?;
        pool.scope(|scope| {
            for _ in 0..workers {
                scope.spawn(|_| queue.drain());
            }
        });
    }

    if let Some(ref callback) = config.progress_callback {
        callback.on_phase_end(PHASE_FINGERPRINT);
    }

    let output = queue.finish();
    if output.stats.interrupted {
        log::info!("Pipeline: Interrupted by shutdown signal");
    }
    Ok(output)
}
