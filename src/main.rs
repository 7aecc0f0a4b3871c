// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//
//! Forkwatch CLI - discover meaningful patches hiding in forks

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use forkwatch::commands;
use forkwatch::commands::analyze::AnalyzeArgs;
use forkwatch::render::OutputFormat;
use std::io::IsTerminal;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "forkwatch")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Configuration file path
    #[arg(short, long, env = "FORKWATCH_CONFIG", global = true)]
    config: Option<std::path::PathBuf>,

    /// Disable colored output
    #[arg(long, env = "NO_COLOR", global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze the forks of a repository and cluster their changes by file
    Analyze {
        /// Repository in owner/repo format
        repo: String,

        /// Max forks to analyze (most recently pushed first)
        #[arg(long)]
        limit: Option<usize>,

        /// Minimum commits ahead to consider
        #[arg(long)]
        min_ahead: Option<u32>,

        /// Output as JSON
        #[arg(long, conflicts_with = "patch")]
        json: bool,

        /// Output a unified diff suitable for git apply
        #[arg(long)]
        patch: bool,
    },

    /// Show the effective configuration
    Config {
        /// Dotted key to print (e.g. noise.lockfiles)
        key: Option<String>,
    },

    /// Generate shell completions
    Completions {
        /// Shell type (bash, zsh, fish, powershell, elvish)
        shell: clap_complete::Shell,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = forkwatch::config::load(cli.config.as_deref())?;

    init_logging(cli.verbose, cli.quiet, &config.log_level);

    match cli.command {
        Commands::Analyze { repo, limit, min_ahead, json, patch } => {
            let format = if json {
                OutputFormat::Json
            } else if patch {
                OutputFormat::Patch
            } else {
                OutputFormat::Table
            };
            let args = AnalyzeArgs {
                repo,
                limit,
                min_ahead,
                format,
                color: !cli.no_color && std::io::stdout().is_terminal(),
            };
            commands::analyze::run(&args, &config)
        }
        Commands::Config { key } => {
            commands::config::run(&config, key.as_deref())
        }
        Commands::Completions { shell } => {
            commands::completions::run(shell, &mut Cli::command())
        }
    }
}

/// Logs go to stderr so stdout stays clean for JSON and patch output
fn init_logging(verbose: u8, quiet: bool, default_level: &str) {
    let filter = match verbose {
        0 if quiet => EnvFilter::new("error"),
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
