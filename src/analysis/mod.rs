// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Fork analysis - classification, clustering, ranking and recommendation
//!
//! The pipeline is a pure transform over comparisons that have already been
//! fetched: noise filter, group by file, cluster by exact diff, rank.
//! Recommendations are derived from the ranked result on demand.

pub mod group;
pub mod patches;
pub mod rank;
pub mod recommend;

pub use group::group_by_file;
pub use patches::group_patches;
pub use rank::{rank_clusters, rank_patch_groups};
pub use recommend::recommend;

use crate::noise::{NoiseRules, Verdict};
use crate::types::{AnalysisResult, Comparison, FileCluster, UpstreamRepo};
use tracing::debug;

/// Run the full analysis over fetched comparisons
///
/// `analyzed_forks` is the number of forks that were compared; it may exceed
/// `comparisons.len()` when forks had no divergence or failed to fetch.
#[must_use]
pub fn analyze(
    upstream: &UpstreamRepo,
    analyzed_forks: usize,
    comparisons: Vec<Comparison>,
    rules: &NoiseRules,
) -> AnalysisResult {
    let kept: Vec<Comparison> = comparisons
        .into_iter()
        .filter(|c| match rules.classify(c) {
            Verdict::Keep => true,
            Verdict::Discard(reason) => {
                debug!("Skipping {}/{}: {}", c.fork.owner, c.fork.repo, reason);
                false
            }
        })
        .collect();

    let mut clusters = build_clusters(&kept);
    rank_clusters(&mut clusters);

    AnalysisResult {
        upstream_owner: upstream.owner.clone(),
        upstream_repo: upstream.repo.clone(),
        total_forks: upstream.fork_count,
        analyzed_forks,
        active_forks: kept.len(),
        clusters,
    }
}

/// Group kept comparisons into unranked file clusters
#[must_use]
pub fn build_clusters(kept: &[Comparison]) -> Vec<FileCluster> {
    group_by_file(kept)
        .into_iter()
        .map(|(path, forks)| {
            let convergence = group::distinct_forks(&forks);
            let patch_groups = (convergence >= 2).then(|| group_patches(&forks));
            FileCluster {
                path,
                forks,
                convergence,
                patch_groups,
            }
        })
        .collect()
}
