use phashdupe::cache::FingerprintStore;
use phashdupe::duplicates::{Finder, FinderConfig, FinderMode};
use phashdupe::fingerprint::Fingerprint;
use phashdupe::scanner::{FingerprintSource, HashError, HashKind};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::tempdir;

/// Fingerprints derived from the file name, with a little jitter in timing so
/// that workers finish out of order.
struct SlowNameSource {
    calls: AtomicUsize,
}

impl SlowNameSource {
    fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }
}

impl FingerprintSource for SlowNameSource {
    fn kind(&self) -> HashKind {
        HashKind::Video
    }

    fn fingerprint(&self, path: &Path) -> Result<Fingerprint, HashError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let name = path.file_stem().unwrap().to_string_lossy();
        let n: u64 = name.trim_start_matches("f").parse().unwrap();
        std::thread::sleep(Duration::from_millis((n * 7) % 5));
        if n % 11 == 10 {
            return Err(HashError::Empty(path.to_path_buf()));
        }
        let blocks = (0..(n % 3 + 1)).map(|k| (n + 1).rotate_left(k as u32 * 5)).collect();
        Ok(Fingerprint::new(blocks).unwrap())
    }
}

fn inputs(n: usize) -> Vec<PathBuf> {
    (0..n).map(|i| PathBuf::from(format!("/media/f{i}.mkv"))).collect()
}

#[test]
fn test_concurrent_and_sequential_runs_agree() {
    let inputs = inputs(40);

    let sequential = Finder::new(
        Arc::new(SlowNameSource::new()),
        FinderConfig::default().with_workers(1),
    )
    .find(&inputs)
    .unwrap();
    let concurrent = Finder::new(
        Arc::new(SlowNameSource::new()),
        FinderConfig::default().with_workers(8),
    )
    .find(&inputs)
    .unwrap();

    let seq_paths: Vec<&PathBuf> = sequential.working_set.iter().map(|e| &e.path).collect();
    let con_paths: Vec<&PathBuf> = concurrent.working_set.iter().map(|e| &e.path).collect();
    assert_eq!(seq_paths, con_paths);
    assert_eq!(sequential.report, concurrent.report);
    assert_eq!(sequential.summary, concurrent.summary);
    assert_eq!(sequential.summary.failed, 3);
}

#[test]
fn test_each_missing_file_is_fingerprinted_once() {
    let source = Arc::new(SlowNameSource::new());
    let finder = Finder::new(source.clone(), FinderConfig::default().with_workers(6));

    let outcome = finder.find(&inputs(25)).unwrap();

    assert_eq!(source.calls.load(Ordering::SeqCst), 25);
    assert_eq!(outcome.summary.computed + outcome.summary.failed, 25);
}

#[test]
fn test_concurrent_generate_persists_in_input_order() {
    let dir = tempdir().unwrap();
    let store = Arc::new(FingerprintStore::new(dir.path().join("fp.db")));
    let inputs = inputs(30);

    let finder = Finder::new(
        Arc::new(SlowNameSource::new()),
        FinderConfig::default()
            .with_workers(5)
            .with_store(store.clone())
            .with_mode(FinderMode::GenerateOnly),
    );
    let outcome = finder.find(&inputs).unwrap();
    assert!(outcome.report.is_none());
    let written = finder.persist(&outcome).unwrap();

    let content = std::fs::read_to_string(store.path()).unwrap();
    let persisted: Vec<String> = content
        .lines()
        .map(|l| l.split('|').next().unwrap().to_string())
        .collect();
    let expected: Vec<String> = outcome
        .working_set
        .iter()
        .map(|e| e.path.display().to_string())
        .collect();
    assert_eq!(written, Some(expected.len()));
    assert_eq!(persisted, expected);

    // A second run finds everything in the cache
    let source = Arc::new(SlowNameSource::new());
    let again = Finder::new(
        source.clone(),
        FinderConfig::default().with_workers(5).with_store(store),
    )
    .find(&inputs)
    .unwrap();
    assert_eq!(again.summary.cache_hits, expected.len());
    // Only the files that failed before are attempted again
    assert_eq!(source.calls.load(Ordering::SeqCst), inputs.len() - expected.len());
}
