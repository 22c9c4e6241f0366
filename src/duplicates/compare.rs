//! All-pairs fingerprint comparison and report grouping.
//!
//! # Overview
//!
//! Every unordered pair `(i, j)` with `i < j` of the working set is compared
//! exactly once. Pairs within the threshold are grouped under the earlier
//! entry `i`. Groups are ordered by the byte order of their path, and the
//! matches inside a group by ascending distance, ties keeping the order in
//! which `j` was visited.
//!
//! Rows are computed in parallel but collected by index, so the report is a
//! pure function of the working-set order and the threshold.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::PathBuf;

use rayon::prelude::*;
use serde::Serialize;

use super::WorkingEntry;

/// One retained pair, seen from its group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Match {
    /// Fingerprint distance between the group path and `path`
    pub distance: u32,
    /// The later member of the pair
    pub path: PathBuf,
}

/// All retained pairs whose earlier member is `path`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportGroup {
    /// The earlier member of every pair in this group
    pub path: PathBuf,
    /// Matches sorted by ascending distance
    pub matches: Vec<Match>,
}

/// Grouped, sorted, threshold-filtered comparison result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Report {
    /// Groups in ascending path order
    pub groups: Vec<ReportGroup>,
}

impl Report {
    /// Total number of retained pairs.
    #[must_use]
    pub fn pair_count(&self) -> usize {
        self.groups.iter().map(|g| g.matches.len()).sum()
    }

    /// Whether no pair was retained.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Iterate `(distance, group path, other path)` in report order.
    pub fn pairs(&self) -> impl Iterator<Item = (u32, &PathBuf, &PathBuf)> + '_ {
        self.groups.iter().flat_map(|group| {
            group
                .matches
                .iter()
                .map(move |m| (m.distance, &group.path, &m.path))
        })
    }
}

/// Compare every pair of the working set.
///
/// With `threshold` set only pairs with `distance <= threshold` are kept.
#[must_use]
pub fn compare(entries: &[WorkingEntry], threshold: Option<u32>) -> Report {
    let rows: Vec<(usize, Vec<Match>)> = (0..entries.len())
        .into_par_iter()
        .map(|i| {
            let outer = &entries[i];
            let matches: Vec<Match> = entries[i + 1..]
                .iter()
                .filter_map(|inner| {
                    let distance = outer.fingerprint.distance(&inner.fingerprint);
                    threshold
                        .map_or(true, |t| distance <= t)
                        .then(|| Match {
                            distance,
                            path: inner.path.clone(),
                        })
                })
                .collect();
            (i, matches)
        })
        .collect();

    let mut grouped: BTreeMap<OsString, ReportGroup> = BTreeMap::new();
    for (i, mut matches) in rows {
        if matches.is_empty() {
            continue;
        }
        // Stable: equal distances keep their visiting order.
        matches.sort_by_key(|m| m.distance);

        let path = &entries[i].path;
        grouped
            .entry(path.as_os_str().to_os_string())
            .or_insert_with(|| ReportGroup {
                path: path.clone(),
                matches: Vec::new(),
            })
            .matches
            .extend(matches);
    }

    let report = Report {
        groups: grouped.into_values().collect(),
    };
    log::debug!(
        "Compared {} entries: {} pair(s) in {} group(s)",
        entries.len(),
        report.pair_count(),
        report.groups.len()
    );
    report
}
