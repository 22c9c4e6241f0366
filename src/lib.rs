//! phashdupe - Near-Duplicate Image and Video Finder
//!
//! Computes perceptual fingerprints for images (one 64-bit block) and videos
//! (one block per key frame), keeps them in an append-only text cache, and
//! reports every pair of files with its Hamming distance.

pub mod cache;
pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod fingerprint;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;
pub mod signal;

use std::collections::BTreeSet;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::cache::FingerprintStore;
use crate::cli::{Cli, ReportFormat};
use crate::config::Config;
use crate::duplicates::{Finder, FinderConfig, FinderMode, FinderOutcome};
use crate::error::ExitCode;
use crate::output::{JsonOutput, TextOutput};
use crate::progress::Progress;
use crate::scanner::walker::normalize_extension;
use crate::scanner::{collect_files, read_path_list, FingerprintSource, PerceptualHasher, VideoHasher};

/// Run the application for parsed command-line arguments.
///
/// Initializes logging and the Ctrl+C handler, loads the configuration and
/// runs [`execute`] against the process's stdin and stdout.
///
/// # Errors
///
/// See [`execute`].
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);

    let shutdown = match signal::install_handler() {
        Ok(handler) => Some(handler.get_flag()),
        Err(e) => {
            log::warn!("{}; Ctrl+C will terminate immediately", e);
            None
        }
    };

    let config = Config::load(cli.config.as_deref());

    let stdin = io::stdin();
    let stdout = io::stdout();
    execute(&cli, &config, shutdown, stdin.lock(), &mut stdout.lock())
}

/// Run one invocation with explicit configuration and I/O.
///
/// `input` is only read when the command line yields no files, either because
/// none were given or because the directories held no matching files. The report is written to `out`; diagnostics go to the log.
///
/// # Errors
///
/// Fails when there are no input files, the cache cannot be read, the worker
/// pool cannot be built, the report cannot be written, or the run was
/// interrupted (the error then downcasts to
/// [`FinderError::Interrupted`](crate::duplicates::FinderError::Interrupted)).
/// A failure to persist new fingerprints is logged and does not fail the run.
pub fn execute<R: BufRead, W: Write>(
    cli: &Cli,
    config: &Config,
    shutdown: Option<Arc<AtomicBool>>,
    input: R,
    out: &mut W,
) -> Result<ExitCode> {
    let inputs = gather_inputs(cli, config, input);
    if inputs.is_empty() {
        anyhow::bail!("No input files specified");
    }
    log::debug!("{} input path(s)", inputs.len());

    let finder = Finder::new(fingerprint_source(cli, config), finder_config(cli, config, shutdown));
    let outcome = finder.find(&inputs).context("Failed to fingerprint input files")?;

    write_report(cli, &outcome, out)?;
    log_summary(&outcome);

    if let Err(e) = finder.persist(&outcome) {
        log::error!("Failed to save fingerprints: {}", e);
    }

    Ok(ExitCode::Success)
}

/// Positional files first, then recursive results; stdin only when that list is empty.
fn gather_inputs<R: BufRead>(cli: &Cli, config: &Config, input: R) -> Vec<PathBuf> {
    let mut inputs = cli.files.clone();
    if !cli.dirs.is_empty() {
        let filter = if cli.extensions.is_empty() {
            &config.extensions
        } else {
            &cli.extensions
        };
        let extensions: BTreeSet<String> = filter
            .iter()
            .map(|e| normalize_extension(e))
            .filter(|e| !e.is_empty())
            .collect();
        inputs.extend(collect_files(&cli.dirs, &extensions));
    }

    if inputs.is_empty() {
        log::debug!("Reading input paths from stdin");
        inputs = read_path_list(input);
    }
    inputs
}

fn fingerprint_source(cli: &Cli, config: &Config) -> Arc<dyn FingerprintSource> {
    if cli.video {
        Arc::new(VideoHasher::new(config.ffmpeg.clone()))
    } else {
        Arc::new(PerceptualHasher::new())
    }
}

fn finder_config(cli: &Cli, config: &Config, shutdown: Option<Arc<AtomicBool>>) -> FinderConfig {
    let mode = if cli.generate {
        FinderMode::GenerateOnly
    } else {
        FinderMode::Compare
    };

    let mut finder_config = FinderConfig::default()
        .with_workers(cli.jobs.unwrap_or(config.jobs))
        .with_threshold(cli.threshold)
        .with_persist(cli.write)
        .with_mode(mode);

    if let Some(path) = cli.source.clone().or_else(|| config.cache.clone()) {
        finder_config = finder_config.with_store(Arc::new(FingerprintStore::new(path)));
    }
    if (cli.progress || config.progress) && !cli.quiet {
        finder_config = finder_config.with_progress_callback(Arc::new(Progress::new(false)));
    }
    if let Some(flag) = shutdown {
        finder_config = finder_config.with_shutdown_flag(flag);
    }
    finder_config
}

fn write_report<W: Write>(cli: &Cli, outcome: &FinderOutcome, out: &mut W) -> Result<()> {
    let Some(ref report) = outcome.report else {
        return Ok(());
    };
    match cli.format {
        ReportFormat::Text => TextOutput::new(report)
            .write_to(out)
            .context("Failed to write report")?,
        ReportFormat::Json => JsonOutput::new(report)
            .write_to(out, true)
            .context("Failed to write JSON report")?,
    }
    Ok(())
}

fn log_summary(outcome: &FinderOutcome) {
    let summary = &outcome.summary;
    log::info!(
        "{} file(s): {} from cache, {} computed, {} failed",
        summary.unique_files,
        summary.cache_hits,
        summary.computed,
        summary.failed
    );
    if let Some(ref report) = outcome.report {
        log::info!(
            "{} pair(s) reported in {} group(s)",
            report.pair_count(),
            report.groups.len()
        );
    }
}
