// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Recommendations - the most agreed-upon patch for each convergent file

use crate::types::{AnalysisResult, FileCluster, Recommendation};

/// One recommendation per convergent cluster, in cluster rank order
///
/// A cluster qualifies when at least two forks touch the file and its top
/// patch group has two or more members sharing a non-empty diff.
#[must_use]
pub fn recommend(result: &AnalysisResult) -> Vec<Recommendation> {
    result.clusters.iter().filter_map(recommend_cluster).collect()
}

fn recommend_cluster(cluster: &FileCluster) -> Option<Recommendation> {
    if cluster.convergence < 2 {
        return None;
    }
    let top = cluster.patch_groups.as_ref()?.groups.first()?;
    if top.len() < 2 || top.raw().is_empty() {
        return None;
    }

    let commit_message = top
        .forks()
        .iter()
        .filter_map(|f| f.commit_messages.first())
        .find(|m| !m.is_empty())
        .cloned()
        .unwrap_or_default();

    Some(Recommendation {
        path: cluster.path.clone(),
        patch: top.raw().to_string(),
        convergence: cluster.convergence,
        agreed_by: top.len(),
        forks: top.owners().into_iter().map(String::from).collect(),
        commit_message,
    })
}
