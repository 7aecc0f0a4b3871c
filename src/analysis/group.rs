// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! File grouping - fans kept comparisons out by changed path

use crate::types::{Comparison, ForkSummary};
use std::collections::{HashMap, HashSet};

/// Group every file change of every comparison by path
///
/// Iteration order of the returned map is unspecified; callers rank the
/// clusters afterwards.
#[must_use]
pub fn group_by_file(comparisons: &[Comparison]) -> HashMap<String, Vec<ForkSummary>> {
    let mut files: HashMap<String, Vec<ForkSummary>> = HashMap::new();

    for comparison in comparisons {
        for delta in &comparison.files {
            files
                .entry(delta.path.clone())
                .or_default()
                .push(ForkSummary::from_delta(comparison, delta));
        }
    }

    files
}

/// Number of distinct forks in a list of summaries
#[must_use]
pub fn distinct_forks(forks: &[ForkSummary]) -> usize {
    forks.iter().map(ForkSummary::fork_key).collect::<HashSet<_>>().len()
}
