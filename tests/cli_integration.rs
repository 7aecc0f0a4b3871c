// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Integration tests for the forkwatch CLI commands

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Run forkwatch isolated from the caller's token and config
fn forkwatch(config_dir: &TempDir) -> Command {
    let config = config_dir.path().join("config.toml");
    if !config.exists() {
        std::fs::write(&config, "").unwrap();
    }
    let mut cmd = Command::cargo_bin("forkwatch").unwrap();
    cmd.env("FORKWATCH_CONFIG", &config)
        .env_remove("GITHUB_TOKEN")
        .env_remove("GH_TOKEN")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_help_lists_commands() {
    let dir = TempDir::new().unwrap();
    forkwatch(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("analyze"))
        .stdout(predicate::str::contains("completions"));
}

#[test]
fn test_malformed_repository_rejected() {
    let dir = TempDir::new().unwrap();
    forkwatch(&dir)
        .args(["analyze", "not-a-slug"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("owner/repo format"));
}

#[test]
fn test_json_and_patch_are_exclusive() {
    let dir = TempDir::new().unwrap();
    forkwatch(&dir)
        .args(["analyze", "acme/widget", "--json", "--patch"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn test_config_reads_file() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("config.toml"),
        "limit = 25\n\n[noise]\nbot_authors = [\"release-bot\"]\n",
    )
    .unwrap();

    forkwatch(&dir)
        .args(["config", "limit"])
        .assert()
        .success()
        .stdout("25\n");

    forkwatch(&dir)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("release-bot"))
        .stdout(predicate::str::contains("Cargo.lock"));
}

#[test]
fn test_config_lists_from_environment() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("config.toml"),
        "[noise]\nlockfiles = [\"yarn.lock\"]\n",
    )
    .unwrap();

    forkwatch(&dir)
        .env("FORKWATCH_NOISE__LOCKFILES", "bun.lockb,deno.lock")
        .env("FORKWATCH_NOISE__BOT_AUTHORS", "release-bot")
        .env("FORKWATCH_LIMIT", "7")
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""bun.lockb""#))
        .stdout(predicate::str::contains(r#""deno.lock""#))
        .stdout(predicate::str::contains(r#""release-bot""#))
        .stdout(predicate::str::contains("yarn.lock").not())
        .stdout(predicate::str::contains("limit = 7"));
}

#[test]
fn test_config_unknown_key() {
    let dir = TempDir::new().unwrap();
    forkwatch(&dir)
        .args(["config", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown configuration key"));
}

#[test]
fn test_completions() {
    let dir = TempDir::new().unwrap();
    forkwatch(&dir)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("forkwatch"));
}
