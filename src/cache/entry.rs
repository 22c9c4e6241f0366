//! Cache entry definitions and the line format they are persisted in.
//!
//! ```text
//! <file-path>|<block-count>|<block0_hex16> <block1_hex16> ...
//! ```

use std::path::{Path, PathBuf};

use crate::fingerprint::{self, Fingerprint};

/// Field separator within a cache line.
pub const FIELD_SEPARATOR: char = '|';

/// A single `(path, fingerprint)` record of the fingerprint cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    /// File path exactly as it was supplied when the fingerprint was computed.
    pub path: PathBuf,
    /// The fingerprint of that file.
    pub fingerprint: Fingerprint,
}

impl CacheEntry {
    /// Create a new cache entry.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, fingerprint: Fingerprint) -> Self {
        Self {
            path: path.into(),
            fingerprint,
        }
    }

    /// Parse a single cache line.
    ///
    /// Returns `None` for any line that is not a complete, self-consistent
    /// record: fewer than two separators, a block count that is not a
    /// non-negative integer, an undecodable fingerprint, or a block count
    /// that disagrees with the decoded fingerprint.
    #[must_use]
    pub fn parse_line(line: &str) -> Option<Self> {
        let mut fields = line.splitn(3, FIELD_SEPARATOR);
        let path = fields.next()?;
        let count = fields.next()?;
        let encoded = fields.next()?;

        let declared: usize = count.trim().parse().ok()?;
        let fingerprint = fingerprint::decode(encoded).ok()?;
        if fingerprint.len() != declared {
            return None;
        }

        Some(Self::new(path, fingerprint))
    }

    /// Render this entry as a cache line, without the trailing newline.
    ///
    /// Returns `None` when the path cannot be written back faithfully: it is
    /// not valid UTF-8 or it contains the field separator or a line break.
    #[must_use]
    pub fn to_line(&self) -> Option<String> {
        let path = encodable_path(&self.path)?;
        Some(format!(
            "{path}{sep}{count}{sep}{blocks}",
            sep = FIELD_SEPARATOR,
            count = self.fingerprint.len(),
            blocks = fingerprint::encode(&self.fingerprint),
        ))
    }
}

fn encodable_path(path: &Path) -> Option<&str> {
    let s = path.to_str()?;
    if s.is_empty() || s.contains([FIELD_SEPARATOR, '\n', '\r']) {
        return None;
    }
    Some(s)
}
