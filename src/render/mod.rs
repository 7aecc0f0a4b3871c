// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Output renderers for analysis results

pub mod json;
pub mod patch;
pub mod table;

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Colored terminal report
    #[default]
    Table,
    /// JSON document
    Json,
    /// Combined unified diff of recommended patches
    Patch,
}
