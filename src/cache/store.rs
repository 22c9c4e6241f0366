//! Append-only fingerprint store backed by a plain text file.

use std::collections::HashMap;
use std::ffi::OsString;
use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use thiserror::Error;

use super::entry::CacheEntry;
use crate::fingerprint::Fingerprint;

/// Errors that can occur while reading or appending to the store.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The cache file could not be read.
    #[error("Failed to read fingerprint cache {path}: {source}")]
    Read {
        /// Cache file path
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },

    /// The cache file could not be opened or written for appending.
    #[error("Failed to append to fingerprint cache {path}: {source}")]
    Append {
        /// Cache file path
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },
}

/// Result type for store operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Loaded records keyed by the exact path string.
///
/// `Path` equality ignores `.` components and repeated separators, so
/// `x/./a.png` and `x/a.png` would collide; the cache key is the raw string.
pub type FingerprintMap = HashMap<OsString, Fingerprint>;

/// Persistent path to fingerprint mapping.
///
/// Loading never fails on bad content: malformed lines are skipped. Appends
/// never rewrite existing lines and are serialized by a lock owned by the
/// store, so a single instance can be shared between threads.
#[derive(Debug)]
pub struct FingerprintStore {
    path: PathBuf,
    append_lock: Mutex<()>,
}

impl FingerprintStore {
    /// Create a store for the given cache file. Nothing is touched on disk.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            append_lock: Mutex::new(()),
        }
    }

    /// Path of the backing cache file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load every valid record from the cache file.
    ///
    /// A missing file yields an empty map. When a path occurs more than once
    /// the last valid line wins.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Read`] if the file exists but cannot be read.
    pub fn load(&self) -> CacheResult<FingerprintMap> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::debug!(
                    "Fingerprint cache {} does not exist yet",
                    self.path.display()
                );
                return Ok(FingerprintMap::new());
            }
            Err(source) => {
                return Err(CacheError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let mut reader = BufReader::new(file);
        let mut map = FingerprintMap::new();
        let mut buf = Vec::new();
        let mut line_no = 0usize;
        let mut skipped = 0usize;

        loop {
            buf.clear();
            let read = reader
                .read_until(b'\n', &mut buf)
                .map_err(|source| CacheError::Read {
                    path: self.path.clone(),
                    source,
                })?;
            if read == 0 {
                break;
            }
            line_no += 1;

            if buf.last() == Some(&b'\n') {
                buf.pop();
            }
            if buf.is_empty() {
                continue;
            }

            let parsed = std::str::from_utf8(&buf)
                .ok()
                .and_then(CacheEntry::parse_line);
            match parsed {
                Some(entry) => {
                    map.insert(entry.path.into_os_string(), entry.fingerprint);
                }
                None => {
                    skipped += 1;
                    log::debug!(
                        "Skipping malformed cache line {} in {}",
                        line_no,
                        self.path.display()
                    );
                }
            }
        }

        if skipped > 0 {
            log::info!(
                "Ignored {} malformed line(s) in {}",
                skipped,
                self.path.display()
            );
        }

        Ok(map)
    }

    /// Append entries to the cache file, one line each.
    ///
    /// The file is created if needed and never truncated. All lines of one
    /// call are written with a single write while holding the store's append
    /// lock. Entries whose path cannot be represented in the line format are
    /// skipped with a warning.
    ///
    /// Returns the number of lines written.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Append`] if the file cannot be opened or written.
    pub fn append<'a, I>(&self, entries: I) -> CacheResult<usize>
    where
        I: IntoIterator<Item = &'a CacheEntry>,
    {
        let mut payload = String::new();
        let mut written = 0usize;
        for entry in entries {
            match entry.to_line() {
                Some(line) => {
                    payload.push_str(&line);
                    payload.push('\n');
                    written += 1;
                }
                None => log::warn!(
                    "Cannot store fingerprint for {}: path is not representable in the cache file",
                    entry.path.display()
                ),
            }
        }

        if written == 0 {
            return Ok(0);
        }

        // A poisoned lock only means another writer panicked; the file itself
        // holds no partial state from us.
        let _guard = self
            .append_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let to_append_error = |source| CacheError::Append {
            path: self.path.clone(),
            source,
        };

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(to_append_error)?;
        file.write_all(payload.as_bytes()).map_err(to_append_error)?;
        file.flush().map_err(to_append_error)?;

        log::debug!("Appended {} line(s) to {}", written, self.path.display());
        Ok(written)
    }
}
