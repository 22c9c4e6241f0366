//! Fingerprint caching module.
//!
//! Fingerprints are expensive to compute, especially for video, so they are
//! kept in a plain text file between runs.
//!
//! # Architecture
//!
//! * [`entry`]: the `(path, fingerprint)` record and its line format.
//! * [`store`]: loading the file into a map and appending new records.
//!
//! # Cache Invalidation
//!
//! There is none. The file path is the only key, and a cached fingerprint is
//! reused verbatim even if the file has since changed on disk. Keys are
//! compared as exact strings, so `x/./a.png` and `x/a.png` are different
//! records. The file is
//! append-only and duplicate paths are not collapsed on disk; when loading,
//! the last valid line for a path wins.

pub mod entry;
pub mod store;

pub use entry::CacheEntry;
pub use store::{CacheError, CacheResult, FingerprintMap, FingerprintStore};
