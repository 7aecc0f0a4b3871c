// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Combined patch output suitable for `git apply`

use crate::types::Recommendation;
use std::io::{self, Write};

/// Write one `---`/`+++` section per recommendation
///
/// The raw patches already carry their `@@` hunk headers and are written
/// as-is.
pub fn write_patch<W: Write>(out: &mut W, recommendations: &[Recommendation]) -> io::Result<()> {
    for (i, rec) in recommendations.iter().enumerate() {
        if i > 0 {
            writeln!(out)?;
        }
        writeln!(out, "--- a/{}", rec.path)?;
        writeln!(out, "+++ b/{}", rec.path)?;
        writeln!(out, "{}", rec.patch.trim_end_matches('\n'))?;
    }
    Ok(())
}
