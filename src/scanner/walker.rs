//! Input path discovery.
//!
//! # Overview
//!
//! Paths reach the tool in three ways: explicitly on the command line,
//! through recursive collection under one or more directories, or as a
//! newline-separated list on standard input. This module handles the last
//! two. Recursive collection uses [`jwalk`] with per-directory sorting so the
//! resulting order, and therefore the report, is reproducible.
//!
//! # Example
//!
//! ```no_run
//! use phashdupe::scanner::collect_files;
//! use std::collections::BTreeSet;
//! use std::path::PathBuf;
//!
//! let extensions: BTreeSet<String> = ["jpg", "png"].iter().map(|s| s.to_string()).collect();
//! let files = collect_files(&[PathBuf::from("/photos")], &extensions);
//! println!("Found {} images", files.len());
//! ```

use std::collections::BTreeSet;
use std::io::BufRead;
use std::path::{Path, PathBuf};

use jwalk::WalkDir;

/// Normalise an extension filter value: drop a leading dot, lowercase.
#[must_use]
pub fn normalize_extension(ext: &str) -> String {
    ext.trim().trim_start_matches('.').to_lowercase()
}

/// Recursively collect regular files under each directory.
///
/// Files without an extension are never collected. When `extensions` is
/// non-empty only files whose lowercased extension is in the set are kept;
/// the set is expected to hold normalised values (see
/// [`normalize_extension`]). Directories that cannot be read are logged and
/// skipped.
#[must_use]
pub fn collect_files(directories: &[PathBuf], extensions: &BTreeSet<String>) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for dir in directories {
        let before = files.len();
        let walk_dir = WalkDir::new(dir)
            .skip_hidden(false)
            .process_read_dir(|_depth, _path, _read_dir_state, children| {
                // Sort children for deterministic output
                children.sort_by(|a, b| match (a, b) {
                    (Ok(a), Ok(b)) => a.file_name().cmp(b.file_name()),
                    (Ok(_), Err(_)) => std::cmp::Ordering::Less,
                    (Err(_), Ok(_)) => std::cmp::Ordering::Greater,
                    (Err(_), Err(_)) => std::cmp::Ordering::Equal,
                });
            });

        for entry in walk_dir {
            match entry {
                Ok(entry) => {
                    if !entry.file_type().is_file() {
                        continue;
                    }
                    let path = entry.path();
                    if passes_extension_filter(&path, extensions) {
                        files.push(path);
                    } else {
                        log::trace!("Skipping file due to extension filter: {}", path.display());
                    }
                }
                Err(e) => {
                    log::warn!("Could not access directory {}: {}", dir.display(), e);
                }
            }
        }

        log::debug!(
            "Collected {} file(s) under {}",
            files.len() - before,
            dir.display()
        );
    }

    files
}

fn passes_extension_filter(path: &Path, extensions: &BTreeSet<String>) -> bool {
    let Some(ext) = path.extension().and_then(|s| s.to_str()) else {
        return false;
    };
    if ext.is_empty() {
        return false;
    }
    extensions.is_empty() || extensions.contains(&ext.to_lowercase())
}

/// Read a path list, one path per line.
///
/// Surrounding whitespace is trimmed and blank lines are ignored. Reading
/// stops at the first I/O error, which is logged.
pub fn read_path_list<R: BufRead>(reader: R) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    for line in reader.lines() {
        match line {
            Ok(line) => {
                let trimmed = line.trim();
                if !trimmed.is_empty() {
                    paths.push(PathBuf::from(trimmed));
                }
            }
            Err(e) => {
                log::warn!("Stopped reading path list: {}", e);
                break;
            }
        }
    }
    paths
}
