// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Config command - shows the effective configuration

use crate::config::{get_key, to_toml, Config};
use anyhow::Result;

/// Print the effective configuration, or a single dotted key
pub fn run(config: &Config, key: Option<&str>) -> Result<()> {
    match key {
        Some(key) => {
            tracing::debug!("Getting {}", key);
            println!("{}", get_key(config, key)?);
        }
        None => print!("{}", to_toml(config)?),
    }
    Ok(())
}
