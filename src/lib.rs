// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//
//! Forkwatch library - discover meaningful patches hiding in forks
//!
//! This crate compares the forks of a repository against upstream, throws
//! away automated and housekeeping-only activity, groups what is left by the
//! file it touches and highlights convergence: independent forks arriving
//! at byte-identical edits.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod analysis;
pub mod commands;
pub mod config;
pub mod noise;
pub mod render;
pub mod source;

/// Core data types shared by the source, analysis and render layers
pub mod types {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Serialize};
    use sha2::{Digest, Sha256};

    // =========================================================================
    // Fork Comparisons (produced by a ForkSource)
    // =========================================================================

    /// Identity of a single fork
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct ForkIdentity {
        /// Account owning the fork
        pub owner: String,
        /// Repository name of the fork
        pub repo: String,
        /// Default branch of the fork
        pub default_branch: String,
        /// Browser URL of the fork
        #[serde(default)]
        pub html_url: String,
        /// Last push to any branch of the fork
        #[serde(default)]
        pub pushed_at: Option<DateTime<Utc>>,
    }

    /// One commit present in the fork but not upstream
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct CommitInfo {
        /// Author display name
        pub author: String,
        /// Author account login, when the commit is linked to an account
        #[serde(default)]
        pub login: Option<String>,
        /// First line of the commit message
        pub message: String,
    }

    /// One file's change within a comparison
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct FileDelta {
        /// Path relative to the repository root
        pub path: String,
        /// Added line count
        pub additions: u32,
        /// Deleted line count
        pub deletions: u32,
        /// Unified diff fragment; empty for large or binary files
        #[serde(default)]
        pub patch: String,
    }

    /// A fork's divergence from upstream
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Comparison {
        /// The fork being compared
        pub fork: ForkIdentity,
        /// Commits in the fork that upstream lacks
        pub ahead_by: u32,
        /// Those commits, oldest first
        #[serde(default)]
        pub commits: Vec<CommitInfo>,
        /// Files the fork changed
        #[serde(default)]
        pub files: Vec<FileDelta>,
    }

    impl Comparison {
        /// First-line commit messages, in commit order
        #[must_use]
        pub fn commit_messages(&self) -> Vec<String> {
            self.commits.iter().map(|c| c.message.clone()).collect()
        }
    }

    /// Upstream repository metadata
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct UpstreamRepo {
        /// Upstream owner
        pub owner: String,
        /// Upstream repository name
        pub repo: String,
        /// Branch forks are compared against
        pub default_branch: String,
        /// Total forks reported by the host
        pub fork_count: usize,
    }

    // =========================================================================
    // Analysis Output
    // =========================================================================

    /// A fork's change to one file, joined with the fork's commit metadata
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct ForkSummary {
        /// Fork owner
        pub owner: String,
        /// Fork repository name
        pub repo: String,
        /// Fork URL
        pub html_url: String,
        /// Commits ahead of upstream
        pub ahead_by: u32,
        /// First-line commit messages of the fork
        pub commit_messages: Vec<String>,
        /// Lines added to this file
        pub additions: u32,
        /// Lines deleted from this file
        pub deletions: u32,
        /// Raw diff text for this file
        pub patch: String,
    }

    impl ForkSummary {
        /// Flatten a comparison and one of its files into a summary
        #[must_use]
        pub fn from_delta(comparison: &Comparison, delta: &FileDelta) -> Self {
            Self {
                owner: comparison.fork.owner.clone(),
                repo: comparison.fork.repo.clone(),
                html_url: comparison.fork.html_url.clone(),
                ahead_by: comparison.ahead_by,
                commit_messages: comparison.commit_messages(),
                additions: delta.additions,
                deletions: delta.deletions,
                patch: delta.patch.clone(),
            }
        }

        /// Stable identity key used for ordering and distinct-fork counting
        #[must_use]
        pub fn fork_key(&self) -> (&str, &str) {
            (&self.owner, &self.repo)
        }
    }

    /// Forks sharing one exact diff for a file
    ///
    /// The raw text is what clustering compares. The display text has hunk
    /// headers removed and is only ever shown to people; two different raw
    /// diffs can share a display text.
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct PatchGroup {
        raw: String,
        display: String,
        forks: Vec<ForkSummary>,
    }

    impl PatchGroup {
        /// Build a group around a raw diff
        #[must_use]
        pub fn new(raw: String, forks: Vec<ForkSummary>) -> Self {
            let display = crate::analysis::patches::clean_diff(&raw);
            Self { raw, display, forks }
        }

        /// Diff text exactly as the source reported it
        #[must_use]
        pub fn raw(&self) -> &str {
            &self.raw
        }

        /// Diff text without `@@` hunk headers
        #[must_use]
        pub fn display(&self) -> &str {
            &self.display
        }

        /// Member forks
        #[must_use]
        pub fn forks(&self) -> &[ForkSummary] {
            &self.forks
        }

        pub(crate) fn forks_mut(&mut self) -> &mut Vec<ForkSummary> {
            &mut self.forks
        }

        /// Number of member forks
        #[must_use]
        pub fn len(&self) -> usize {
            self.forks.len()
        }

        /// True when the group has no members
        #[must_use]
        pub fn is_empty(&self) -> bool {
            self.forks.is_empty()
        }

        /// Member owners in member order
        #[must_use]
        pub fn owners(&self) -> Vec<&str> {
            self.forks.iter().map(|f| f.owner.as_str()).collect()
        }

        /// Short content id: `patch:<8 hex chars of sha256(raw)>`
        #[must_use]
        pub fn id(&self) -> String {
            let mut hasher = Sha256::new();
            hasher.update(self.raw.as_bytes());
            let hash = hex::encode(hasher.finalize());
            format!("patch:{}", &hash[..8])
        }
    }

    /// Patch groups for one file, largest first once ranked
    #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
    pub struct PatchGrouping {
        /// The groups
        pub groups: Vec<PatchGroup>,
    }

    /// Every fork change touching one path
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct FileCluster {
        /// Path shared by all members
        pub path: String,
        /// One summary per contributing fork
        pub forks: Vec<ForkSummary>,
        /// Number of distinct forks touching the path
        pub convergence: usize,
        /// Exact-diff clustering; `None` for single-fork files
        pub patch_groups: Option<PatchGrouping>,
    }

    /// Outcome of analysing one upstream repository
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct AnalysisResult {
        /// Upstream owner
        pub upstream_owner: String,
        /// Upstream repository name
        pub upstream_repo: String,
        /// Fork count reported by the host
        pub total_forks: usize,
        /// Forks that were compared against upstream
        pub analyzed_forks: usize,
        /// Compared forks that carried meaningful changes
        pub active_forks: usize,
        /// Ranked file clusters
        pub clusters: Vec<FileCluster>,
    }

    /// The best-supported patch for one file
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Recommendation {
        /// File the patch applies to
        pub path: String,
        /// Raw patch, hunk headers included
        pub patch: String,
        /// Forks touching the file
        pub convergence: usize,
        /// Forks carrying exactly this patch
        pub agreed_by: usize,
        /// Owners of the agreeing forks
        pub forks: Vec<String>,
        /// Representative first-line commit message
        pub commit_message: String,
    }
}

/// Prelude for common imports
pub mod prelude {
    pub use crate::types::*;
    pub use anyhow::{Context, Result};
}
