// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Noise classification - decides whether a fork comparison is worth keeping
//!
//! A comparison is discarded when nothing is ahead, when every commit came
//! from a dependency bot, or when every changed file is a lockfile or CI
//! configuration. A single human commit or substantive file keeps the whole
//! comparison.

use crate::config::NoiseConfig;
use crate::types::{CommitInfo, Comparison};
use std::collections::HashSet;
use std::fmt;

/// Why a comparison was dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscardReason {
    /// The fork has no commits upstream lacks
    NoCommitsAhead,
    /// The fork is ahead by fewer commits than requested
    BelowMinAhead,
    /// Every commit was authored by an automation account
    BotOnly,
    /// Every changed file is a lockfile or CI configuration
    BoringOnly,
}

impl fmt::Display for DiscardReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::NoCommitsAhead => "no commits ahead",
            Self::BelowMinAhead => "below minimum commits ahead",
            Self::BotOnly => "bot-only commits",
            Self::BoringOnly => "lockfile/CI-only changes",
        };
        f.write_str(text)
    }
}

/// Classifier verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Meaningful activity
    Keep,
    /// Noise
    Discard(DiscardReason),
}

impl Verdict {
    /// True for [`Verdict::Keep`]
    #[must_use]
    pub fn is_keep(self) -> bool {
        matches!(self, Self::Keep)
    }
}

/// Lookup tables driving classification
#[derive(Debug, Clone)]
pub struct NoiseRules {
    bot_authors: HashSet<String>,
    lockfiles: HashSet<String>,
    ci_prefixes: Vec<String>,
    min_ahead: u32,
}

impl Default for NoiseRules {
    fn default() -> Self {
        Self::from_config(&NoiseConfig::default(), 1)
    }
}

impl NoiseRules {
    /// Build rules from explicit tables
    #[must_use]
    pub fn new<B, L, C>(bot_authors: B, lockfiles: L, ci_prefixes: C) -> Self
    where
        B: IntoIterator,
        B::Item: Into<String>,
        L: IntoIterator,
        L::Item: Into<String>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        Self {
            bot_authors: bot_authors.into_iter().map(Into::into).collect(),
            lockfiles: lockfiles.into_iter().map(Into::into).collect(),
            ci_prefixes: ci_prefixes.into_iter().map(Into::into).collect(),
            min_ahead: 1,
        }
    }

    /// Build rules from the `noise` section of the configuration
    #[must_use]
    pub fn from_config(noise: &NoiseConfig, min_ahead: u32) -> Self {
        Self::new(
            noise.bot_authors.iter().cloned(),
            noise.lockfiles.iter().cloned(),
            noise.ci_prefixes.iter().cloned(),
        )
        .with_min_ahead(min_ahead)
    }

    /// Require at least `min_ahead` commits (values below 1 act as 1)
    #[must_use]
    pub fn with_min_ahead(mut self, min_ahead: u32) -> Self {
        self.min_ahead = min_ahead.max(1);
        self
    }

    /// True when the commit's author name or login is a known bot
    #[must_use]
    pub fn is_bot(&self, commit: &CommitInfo) -> bool {
        self.bot_authors.contains(&commit.author)
            || commit
                .login
                .as_ref()
                .is_some_and(|login| self.bot_authors.contains(login))
    }

    /// True for lockfiles (matched on base name) and CI configuration paths
    #[must_use]
    pub fn is_boring(&self, path: &str) -> bool {
        let base = path.rsplit('/').next().unwrap_or(path);
        self.lockfiles.contains(base) || self.is_ci(path)
    }

    fn is_ci(&self, path: &str) -> bool {
        self.ci_prefixes.iter().any(|prefix| path.starts_with(prefix.as_str()))
    }

    /// Classify one comparison
    #[must_use]
    pub fn classify(&self, comparison: &Comparison) -> Verdict {
        if comparison.ahead_by == 0 {
            return Verdict::Discard(DiscardReason::NoCommitsAhead);
        }
        if comparison.ahead_by < self.min_ahead {
            return Verdict::Discard(DiscardReason::BelowMinAhead);
        }

        let commits = &comparison.commits;
        if !commits.is_empty() && commits.iter().all(|c| self.is_bot(c)) {
            return Verdict::Discard(DiscardReason::BotOnly);
        }

        // Zero files with commits ahead is kept: there is nothing to call boring.
        let files = &comparison.files;
        if !files.is_empty() && files.iter().all(|f| self.is_boring(&f.path)) {
            return Verdict::Discard(DiscardReason::BoringOnly);
        }

        Verdict::Keep
    }
}
