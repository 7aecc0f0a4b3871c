// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Terminal report

use crate::analysis::patches::truncate_diff;
use crate::types::{AnalysisResult, FileCluster, ForkSummary, PatchGroup};
use owo_colors::{OwoColorize, Style};
use std::fmt::Display;
use std::io::{self, Write};

const MESSAGE_WIDTH: usize = 72;

/// Table rendering options
#[derive(Debug, Clone, Copy)]
pub struct TableOptions {
    /// Emit ANSI colors
    pub color: bool,
    /// Lines of each patch group to show
    pub max_diff_lines: usize,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            color: true,
            max_diff_lines: 20,
        }
    }
}

struct Painter {
    color: bool,
}

impl Painter {
    fn paint(&self, text: impl Display, style: Style) -> String {
        if self.color {
            text.style(style).to_string()
        } else {
            text.to_string()
        }
    }
}

/// Write the human-readable report
pub fn write_table<W: Write>(out: &mut W, result: &AnalysisResult, opts: TableOptions) -> io::Result<()> {
    let p = Painter { color: opts.color };

    writeln!(out)?;
    writeln!(
        out,
        "{}",
        p.paint(
            format!("{}/{}", result.upstream_owner, result.upstream_repo),
            Style::new().bold().cyan()
        )
    )?;
    writeln!(
        out,
        "{}",
        p.paint(
            format!(
                "Forks: {} total, {} analyzed, {} with meaningful changes",
                result.total_forks, result.analyzed_forks, result.active_forks
            ),
            Style::new().dimmed()
        )
    )?;
    writeln!(out)?;

    if result.clusters.is_empty() {
        writeln!(out, "No meaningful fork activity found.")?;
        return Ok(());
    }

    for cluster in &result.clusters {
        write_cluster(out, &p, cluster, opts.max_diff_lines)?;
        writeln!(out, "{}", "─".repeat(60))?;
    }

    Ok(())
}

fn write_cluster<W: Write>(out: &mut W, p: &Painter, cluster: &FileCluster, max_diff_lines: usize) -> io::Result<()> {
    let label = if cluster.convergence >= 2 {
        format!(
            " {}",
            p.paint(
                format!("({} forks converge here)", cluster.convergence),
                Style::new().bold().yellow()
            )
        )
    } else {
        String::new()
    };
    writeln!(out, "{}{}", p.paint(&cluster.path, Style::new().bold()), label)?;

    for fork in &cluster.forks {
        write_fork(out, p, fork)?;
    }

    if let Some(grouping) = &cluster.patch_groups {
        writeln!(out, "  {}", p.paint("patch groups:", Style::new().bold()))?;
        for group in &grouping.groups {
            write_group(out, p, group, max_diff_lines)?;
        }
    }

    Ok(())
}

fn write_fork<W: Write>(out: &mut W, p: &Painter, fork: &ForkSummary) -> io::Result<()> {
    let stats = format!(
        "{} {}",
        p.paint(format!("+{}", fork.additions), Style::new().green()),
        p.paint(format!("-{}", fork.deletions), Style::new().red())
    );
    writeln!(
        out,
        "  {} {} ({} commits ahead)",
        p.paint(format!("{:<20}", fork.owner), Style::new().cyan()),
        stats,
        fork.ahead_by
    )?;

    if let Some(msg) = fork.commit_messages.first() {
        writeln!(out, "    {}", p.paint(shorten(msg, MESSAGE_WIDTH), Style::new().dimmed()))?;
    }
    writeln!(out, "    {}", p.paint(&fork.html_url, Style::new().dimmed()))
}

fn write_group<W: Write>(out: &mut W, p: &Painter, group: &PatchGroup, max_diff_lines: usize) -> io::Result<()> {
    let count = group.len();
    let noun = if count == 1 { "fork" } else { "forks" };
    writeln!(
        out,
        "    [{} {}] {} {}",
        count,
        noun,
        p.paint(group.id(), Style::new().dimmed()),
        group.owners().join(", ")
    )?;

    if group.display().is_empty() {
        writeln!(out, "      {}", p.paint("(no diff available)", Style::new().dimmed()))?;
        return Ok(());
    }
    for line in truncate_diff(group.display(), max_diff_lines).lines() {
        let style = if line.starts_with('+') {
            Style::new().green()
        } else if line.starts_with('-') {
            Style::new().red()
        } else {
            Style::new().dimmed()
        };
        writeln!(out, "      {}", p.paint(line, style))?;
    }
    Ok(())
}

/// Cut `text` to `width` characters, marking the cut with `...`
fn shorten(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let cut: String = text.chars().take(width).collect();
    format!("{cut}...")
}
