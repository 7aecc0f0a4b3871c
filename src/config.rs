// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Configuration management
//!
//! Settings are layered: built-in defaults, then a TOML file, then
//! `FORKWATCH_*` environment variables (`__` separates sections, lists are
//! comma-separated). Command-line flags are applied on
//! top by the commands themselves.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the GitHub REST API
    pub api_url: String,
    /// Maximum number of forks to compare, most recently pushed first
    pub limit: usize,
    /// Minimum commits ahead for a fork to count
    pub min_ahead: u32,
    /// Abort the batch once fewer API requests than this remain
    pub rate_limit_floor: u32,
    /// Lines of each patch group shown in table output
    pub max_diff_lines: usize,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Noise classification tables
    pub noise: NoiseConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: "https://api.github.com".to_string(),
            limit: 100,
            min_ahead: 1,
            rate_limit_floor: 10,
            max_diff_lines: 20,
            log_level: "info".to_string(),
            noise: NoiseConfig::default(),
        }
    }
}

/// Allow-lists used to discard automated or housekeeping-only forks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseConfig {
    /// Commit author names or logins of dependency bots
    pub bot_authors: Vec<String>,
    /// Lockfile base names
    pub lockfiles: Vec<String>,
    /// Path prefixes of CI configuration
    pub ci_prefixes: Vec<String>,
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            bot_authors: strings(&[
                "dependabot[bot]",
                "dependabot",
                "renovate[bot]",
                "renovate",
                "greenkeeper[bot]",
                "snyk-bot",
                "depfu[bot]",
            ]),
            lockfiles: strings(&[
                "package-lock.json",
                "yarn.lock",
                "Gemfile.lock",
                "go.sum",
                "pnpm-lock.yaml",
                "Cargo.lock",
                "poetry.lock",
                "composer.lock",
            ]),
            ci_prefixes: strings(&[".github/", ".circleci/", ".travis", ".gitlab-ci"]),
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

/// Keys whose environment values are comma-separated lists
/// (`FORKWATCH_NOISE__LOCKFILES=yarn.lock,bun.lockb`)
const LIST_KEYS: [&str; 3] = ["noise.bot_authors", "noise.lockfiles", "noise.ci_prefixes"];

/// Platform config file location (`<config dir>/forkwatch/config.toml`)
#[must_use]
pub fn default_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("com", "hyperpolymath", "forkwatch")
        .map(|d| d.config_dir().join("config.toml"))
}

/// Load configuration
///
/// An explicit `path` must exist; the platform default is optional.
pub fn load(path: Option<&Path>) -> Result<Config> {
    let defaults = ::config::Config::try_from(&Config::default())
        .context("Failed to seed default configuration")?;
    let mut builder = ::config::Config::builder().add_source(defaults);

    match path {
        Some(p) => {
            builder = builder.add_source(
                ::config::File::new(&p.to_string_lossy(), ::config::FileFormat::Toml).required(true),
            );
        }
        None => {
            if let Some(p) = default_path() {
                tracing::debug!("Looking for config at {}", p.display());
                builder = builder.add_source(
                    ::config::File::new(&p.to_string_lossy(), ::config::FileFormat::Toml)
                        .required(false),
                );
            }
        }
    }

    let mut env = ::config::Environment::with_prefix("FORKWATCH")
        .prefix_separator("_")
        .separator("__")
        .list_separator(",")
        .try_parsing(true);
    for key in LIST_KEYS {
        env = env.with_list_parse_key(key);
    }
    builder = builder.add_source(env);

    let settings = builder.build().context("Failed to load configuration")?;
    settings
        .try_deserialize()
        .context("Failed to parse configuration")
}

/// Render the configuration as TOML
pub fn to_toml(config: &Config) -> Result<String> {
    toml::to_string_pretty(config).context("Failed to serialize configuration")
}

/// Look up a dotted key (`noise.lockfiles`) and render its value
pub fn get_key(config: &Config, key: &str) -> Result<String> {
    let root = toml::Value::try_from(config).context("Failed to serialize configuration")?;
    let mut value = &root;
    for part in key.split('.') {
        value = value
            .get(part)
            .ok_or_else(|| anyhow::anyhow!("Unknown configuration key: {}", key))?;
    }
    Ok(match value {
        toml::Value::String(s) => s.clone(),
        other => other.to_string(),
    })
}
