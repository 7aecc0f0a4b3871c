// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Analyze command - compares forks to upstream and reports convergence

use crate::analysis::{self, recommend};
use crate::config::Config;
use crate::noise::NoiseRules;
use crate::render::json::write_json;
use crate::render::patch::write_patch;
use crate::render::table::{write_table, TableOptions};
use crate::render::OutputFormat;
use crate::source::{fetch_comparisons, ForkSource, GitHubClient, RepoSlug};
use crate::types::AnalysisResult;
use anyhow::{Context, Result};
use std::io::{self, Write};
use tracing::{info, warn};

/// Arguments for the analyze command
#[derive(Debug, Clone)]
pub struct AnalyzeArgs {
    /// Upstream repository as `owner/repo`
    pub repo: String,
    /// Override for the configured fork limit
    pub limit: Option<usize>,
    /// Override for the configured minimum commits ahead
    pub min_ahead: Option<u32>,
    /// Output format
    pub format: OutputFormat,
    /// Emit ANSI colors in table output
    pub color: bool,
}

/// Run the analyze command against GitHub
pub fn run(args: &AnalyzeArgs, config: &Config) -> Result<()> {
    // Reject bad identifiers before touching credentials or the network
    let slug: RepoSlug = args.repo.parse()?;
    let client = GitHubClient::from_config(config).context("Failed to create GitHub client")?;

    let limit = args.limit.unwrap_or(config.limit);
    let rules = NoiseRules::from_config(&config.noise, args.min_ahead.unwrap_or(config.min_ahead));
    let result = analyze_repository(&client, &slug, limit, &rules)?;

    let table = TableOptions {
        color: args.color,
        max_diff_lines: config.max_diff_lines,
    };
    let mut stdout = io::stdout().lock();
    render(&mut stdout, &result, args.format, table)
}

/// Fetch comparisons from `source` and analyze them
pub fn analyze_repository<S>(
    source: &S,
    slug: &RepoSlug,
    limit: usize,
    rules: &NoiseRules,
) -> Result<AnalysisResult>
where
    S: ForkSource + ?Sized,
{
    let outcome = fetch_comparisons(source, slug, limit)
        .with_context(|| format!("Failed to analyze forks of {slug}"))?;
    if outcome.failed > 0 {
        warn!("{} forks could not be compared and were skipped", outcome.failed);
    }

    Ok(analysis::analyze(
        &outcome.upstream,
        outcome.analyzed,
        outcome.comparisons,
        rules,
    ))
}

/// Render a result in the requested format
pub fn render<W: Write>(
    out: &mut W,
    result: &AnalysisResult,
    format: OutputFormat,
    table: TableOptions,
) -> Result<()> {
    match format {
        OutputFormat::Table => write_table(out, result, table).context("Failed to write report")?,
        OutputFormat::Json => {
            write_json(out, result, &recommend(result)).context("Failed to write JSON")?;
        }
        OutputFormat::Patch => {
            let recommendations = recommend(result);
            if recommendations.is_empty() {
                info!("No convergent patches found in {}/{}", result.upstream_owner, result.upstream_repo);
            }
            write_patch(out, &recommendations).context("Failed to write patch")?;
        }
    }
    Ok(())
}
