// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Cluster ranking - deterministic ordering of clusters, groups and members
//!
//! Forks arrive in whatever order the host paginates them, so every level is
//! sorted on stable keys and never on arrival order.

use crate::types::{FileCluster, ForkSummary, PatchGroup, PatchGrouping};
use std::cmp::Ordering;

/// Rank clusters in place: most convergent first, then by path
///
/// Also ranks each cluster's fork list and patch grouping.
pub fn rank_clusters(clusters: &mut [FileCluster]) {
    for cluster in clusters.iter_mut() {
        sort_forks(&mut cluster.forks);
        if let Some(grouping) = cluster.patch_groups.as_mut() {
            rank_patch_groups(grouping);
        }
    }

    clusters.sort_by(|a, b| {
        b.convergence
            .cmp(&a.convergence)
            .then_with(|| a.path.cmp(&b.path))
    });
}

/// Rank patch groups in place: largest first, then by smallest member owner
pub fn rank_patch_groups(grouping: &mut PatchGrouping) {
    for group in &mut grouping.groups {
        sort_forks(group.forks_mut());
    }
    grouping.groups.sort_by(compare_groups);
}

fn sort_forks(forks: &mut [ForkSummary]) {
    forks.sort_by(|a, b| a.fork_key().cmp(&b.fork_key()));
}

/// Members must already be sorted, so the first member holds the smallest key.
fn compare_groups(a: &PatchGroup, b: &PatchGroup) -> Ordering {
    b.len()
        .cmp(&a.len())
        .then_with(|| lead_key(a).cmp(&lead_key(b)))
        .then_with(|| a.raw().cmp(b.raw()))
}

fn lead_key(group: &PatchGroup) -> Option<(&str, &str)> {
    group.forks().first().map(ForkSummary::fork_key)
}
