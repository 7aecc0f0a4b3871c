// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Fork data sources - where comparisons come from
//!
//! The analysis never talks to a host directly. It consumes comparisons
//! gathered through a [`ForkSource`], and [`fetch_comparisons`] drives one
//! over a whole fork list: per-fork failures are skipped, authentication and
//! rate-limit failures abort the batch.

pub mod github;

use crate::types::{Comparison, ForkIdentity, UpstreamRepo};
use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, info, warn};

pub use github::GitHubClient;

/// Errors raised while talking to a fork source
#[derive(Debug, Error)]
pub enum SourceError {
    /// Repository identifier is not `owner/repo`
    #[error("repository must be in owner/repo format, got '{0}'")]
    InvalidSlug(String),
    /// Credentials missing or rejected
    #[error("authentication failed: {0}")]
    Auth(String),
    /// Too few API requests left to continue
    #[error("rate limit nearly exhausted ({remaining} remaining, resets at {}), stopping to avoid 403s", .reset.format("%H:%M:%S"))]
    RateLimited {
        /// Requests left in the window
        remaining: u32,
        /// When the window resets
        reset: DateTime<Utc>,
    },
    /// Resource does not exist or has no common history
    #[error("not found: {0}")]
    NotFound(String),
    /// Any other non-success API status
    #[error("API returned {status}: {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Message reported by the API
        message: String,
    },
    /// Transport failure
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// Response body did not have the expected shape
    #[error("malformed response: {0}")]
    Decode(String),
}

impl SourceError {
    /// Fatal errors abort the whole batch instead of skipping one fork
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Auth(_) | Self::RateLimited { .. })
    }
}

/// An `owner/repo` pair
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoSlug {
    /// Owner login
    pub owner: String,
    /// Repository name
    pub repo: String,
}

impl FromStr for RepoSlug {
    type Err = SourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let path = trimmed
            .strip_prefix("https://github.com/")
            .or_else(|| trimmed.strip_prefix("github.com/"))
            .unwrap_or(trimmed)
            .trim_end_matches('/');
        let path = path.strip_suffix(".git").unwrap_or(path);

        match path.split_once('/') {
            Some((owner, repo)) if !owner.is_empty() && !repo.is_empty() && !repo.contains('/') => {
                Ok(Self {
                    owner: owner.to_string(),
                    repo: repo.to_string(),
                })
            }
            _ => Err(SourceError::InvalidSlug(s.to_string())),
        }
    }
}

impl fmt::Display for RepoSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// Provider of upstream metadata, fork lists and fork comparisons
pub trait ForkSource {
    /// Upstream metadata: default branch and total fork count
    fn repository(&self, slug: &RepoSlug) -> Result<UpstreamRepo, SourceError>;

    /// Forks sorted by most recent push, at most `limit` of them
    fn list_forks(&self, slug: &RepoSlug, limit: usize) -> Result<Vec<ForkIdentity>, SourceError>;

    /// Compare `fork`'s default branch against upstream's `base`
    ///
    /// Returns `None` when the fork is not ahead of upstream.
    fn compare(
        &self,
        slug: &RepoSlug,
        base: &str,
        fork: &ForkIdentity,
    ) -> Result<Option<Comparison>, SourceError>;
}

/// Everything fetched for one upstream repository
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    /// Upstream metadata
    pub upstream: UpstreamRepo,
    /// Forks whose comparison completed, diverged or not
    pub analyzed: usize,
    /// Forks skipped because their comparison failed
    pub failed: usize,
    /// Comparisons of forks that are ahead of upstream
    pub comparisons: Vec<Comparison>,
}

/// Fetch upstream metadata and compare up to `limit` forks against it
pub fn fetch_comparisons<S>(source: &S, slug: &RepoSlug, limit: usize) -> Result<FetchOutcome, SourceError>
where
    S: ForkSource + ?Sized,
{
    info!("Fetching forks of {}...", slug);
    let upstream = source.repository(slug)?;
    let forks = source.list_forks(slug, limit)?;

    if forks.is_empty() {
        info!("No forks found");
    } else {
        info!("Found {} forks, comparing to upstream...", forks.len());
    }

    let mut comparisons = Vec::new();
    let mut failed = 0;
    for (i, fork) in forks.iter().enumerate() {
        info!("Analyzing fork {}/{}: {}", i + 1, forks.len(), fork.owner);

        match source.compare(slug, &upstream.default_branch, fork) {
            Ok(Some(comparison)) => comparisons.push(comparison),
            Ok(None) => debug!("{}/{} has not diverged", fork.owner, fork.repo),
            Err(err) if err.is_fatal() => return Err(err),
            Err(err) => {
                warn!("Skipping {}/{}: {}", fork.owner, fork.repo, err);
                failed += 1;
            }
        }
    }

    Ok(FetchOutcome {
        upstream,
        analyzed: forks.len() - failed,
        failed,
        comparisons,
    })
}
