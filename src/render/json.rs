// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! JSON report

use crate::types::{AnalysisResult, FileCluster, ForkSummary, PatchGroup, Recommendation};
use serde::Serialize;
use std::io::Write;

#[derive(Serialize)]
struct Report<'a> {
    repository: String,
    total_forks: usize,
    analyzed_forks: usize,
    active_forks: usize,
    clusters: Vec<Cluster<'a>>,
    recommendations: &'a [Recommendation],
}

#[derive(Serialize)]
struct Cluster<'a> {
    file: &'a str,
    convergence: usize,
    forks: Vec<Fork<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    patch_groups: Vec<Group<'a>>,
}

#[derive(Serialize)]
struct Fork<'a> {
    owner: &'a str,
    url: &'a str,
    ahead_by: u32,
    commit_messages: &'a [String],
    additions: u32,
    deletions: u32,
    #[serde(skip_serializing_if = "str::is_empty")]
    patch: &'a str,
}

#[derive(Serialize)]
struct Group<'a> {
    id: String,
    patch: &'a str,
    fork_count: usize,
    forks: Vec<&'a str>,
}

impl<'a> From<&'a ForkSummary> for Fork<'a> {
    fn from(f: &'a ForkSummary) -> Self {
        Self {
            owner: &f.owner,
            url: &f.html_url,
            ahead_by: f.ahead_by,
            commit_messages: &f.commit_messages,
            additions: f.additions,
            deletions: f.deletions,
            patch: &f.patch,
        }
    }
}

impl<'a> From<&'a PatchGroup> for Group<'a> {
    fn from(g: &'a PatchGroup) -> Self {
        Self {
            id: g.id(),
            patch: g.raw(),
            fork_count: g.len(),
            forks: g.owners(),
        }
    }
}

impl<'a> From<&'a FileCluster> for Cluster<'a> {
    fn from(c: &'a FileCluster) -> Self {
        Self {
            file: &c.path,
            convergence: c.convergence,
            forks: c.forks.iter().map(Fork::from).collect(),
            patch_groups: c
                .patch_groups
                .iter()
                .flat_map(|pg| pg.groups.iter().map(Group::from))
                .collect(),
        }
    }
}

/// Write the report as pretty-printed JSON followed by a newline
pub fn write_json<W: Write>(
    out: &mut W,
    result: &AnalysisResult,
    recommendations: &[Recommendation],
) -> serde_json::Result<()> {
    let report = Report {
        repository: format!("{}/{}", result.upstream_owner, result.upstream_repo),
        total_forks: result.total_forks,
        analyzed_forks: result.analyzed_forks,
        active_forks: result.active_forks,
        clusters: result.clusters.iter().map(Cluster::from).collect(),
        recommendations,
    };
    serde_json::to_writer_pretty(&mut *out, &report)?;
    writeln!(out).map_err(serde_json::Error::io)
}
