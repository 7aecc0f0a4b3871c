// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! GitHub REST API source

use super::{ForkSource, RepoSlug, SourceError};
use crate::config::Config;
use crate::types::{CommitInfo, Comparison, FileDelta, ForkIdentity, UpstreamRepo};
use chrono::{DateTime, Utc};
use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, LINK};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::process::Command;
use tracing::debug;

const PER_PAGE: usize = 100;
const FALLBACK_BRANCH: &str = "main";

/// Blocking GitHub client
pub struct GitHubClient {
    http: Client,
    api_url: String,
    rate_limit_floor: u32,
}

impl GitHubClient {
    /// Build a client against `api_url` with a bearer token
    pub fn new(api_url: &str, token: &str, rate_limit_floor: u32) -> Result<Self, SourceError> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|_| SourceError::Auth("token contains invalid characters".into()))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert("x-github-api-version", HeaderValue::from_static("2022-11-28"));
        headers.insert(AUTHORIZATION, auth);

        let http = Client::builder()
            .user_agent(concat!("forkwatch/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http,
            api_url: api_url.trim_end_matches('/').to_string(),
            rate_limit_floor,
        })
    }

    /// Build a client from configuration, resolving the token from the environment
    pub fn from_config(config: &Config) -> Result<Self, SourceError> {
        let token = resolve_token()?;
        Self::new(&config.api_url, &token, config.rate_limit_floor)
    }

    fn get(&self, url: &str) -> Result<Response, SourceError> {
        debug!("GET {}", url);
        let response = self.http.get(url).send()?;
        let status = response.status();
        let rate = RateLimit::from_headers(response.headers());

        match check_response(url, status, rate, self.rate_limit_floor) {
            Err(SourceError::Api { status, .. }) => {
                let message = response
                    .json::<ApiMessage>()
                    .map(|m| m.message)
                    .unwrap_or_default();
                Err(SourceError::Api { status, message })
            }
            checked => checked.map(|()| response),
        }
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, SourceError> {
        decode(self.get(url)?)
    }
}

impl ForkSource for GitHubClient {
    fn repository(&self, slug: &RepoSlug) -> Result<UpstreamRepo, SourceError> {
        let url = format!("{}/repos/{}/{}", self.api_url, slug.owner, slug.repo);
        let payload: RepoPayload = self.get_json(&url)?;
        Ok(UpstreamRepo {
            owner: slug.owner.clone(),
            repo: slug.repo.clone(),
            default_branch: branch_or_default(payload.default_branch),
            fork_count: payload.forks_count,
        })
    }

    fn list_forks(&self, slug: &RepoSlug, limit: usize) -> Result<Vec<ForkIdentity>, SourceError> {
        let mut url = format!(
            "{}/repos/{}/{}/forks?sort=newest&per_page={}",
            self.api_url, slug.owner, slug.repo, PER_PAGE
        );
        let mut forks: Vec<ForkIdentity> = Vec::new();

        loop {
            let response = self.get(&url)?;
            let next = response
                .headers()
                .get(LINK)
                .and_then(|v| v.to_str().ok())
                .and_then(next_page_url);
            let page: Vec<ForkPayload> = decode(response)?;
            forks.extend(page.into_iter().map(ForkPayload::into_identity));

            match next {
                Some(next) if forks.len() < limit => url = next,
                _ => break,
            }
        }

        // newest-created is not most-recently-pushed; None sorts last
        forks.sort_by(|a, b| b.pushed_at.cmp(&a.pushed_at));
        forks.truncate(limit);
        Ok(forks)
    }

    fn compare(
        &self,
        slug: &RepoSlug,
        base: &str,
        fork: &ForkIdentity,
    ) -> Result<Option<Comparison>, SourceError> {
        let url = format!(
            "{}/repos/{}/{}/compare/{}...{}:{}",
            self.api_url, slug.owner, slug.repo, base, fork.owner, fork.default_branch
        );
        let payload: ComparePayload = self.get_json(&url)?;
        Ok(payload.into_comparison(fork))
    }
}

/// Find a token: `GITHUB_TOKEN`, `GH_TOKEN`, then `gh auth token`
pub fn resolve_token() -> Result<String, SourceError> {
    for var in ["GITHUB_TOKEN", "GH_TOKEN"] {
        if let Ok(token) = std::env::var(var) {
            let token = token.trim();
            if !token.is_empty() {
                debug!("Using token from {}", var);
                return Ok(token.to_string());
            }
        }
    }

    let output = Command::new("gh")
        .args(["auth", "token"])
        .output()
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                SourceError::Auth(
                    "GITHUB_TOKEN is unset and the GitHub CLI (gh) is not installed. Install it from https://cli.github.com/".into(),
                )
            } else {
                SourceError::Auth(format!("failed to run 'gh auth token': {e}"))
            }
        })?;

    if !output.status.success() {
        return Err(SourceError::Auth(
            "failed to get GitHub token, run 'gh auth login' first".into(),
        ));
    }
    let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if token.is_empty() {
        return Err(SourceError::Auth(
            "GitHub CLI returned an empty token, run 'gh auth login' first".into(),
        ));
    }
    Ok(token)
}

/// Extract the `rel="next"` target from a `Link` header
#[must_use]
pub fn next_page_url(link: &str) -> Option<String> {
    link.split(',').find_map(|part| {
        let mut pieces = part.split(';');
        let target = pieces.next()?.trim();
        if pieces.any(|p| p.trim() == "rel=\"next\"") {
            target
                .strip_prefix('<')
                .and_then(|t| t.strip_suffix('>'))
                .map(String::from)
        } else {
            None
        }
    })
}

fn decode<T: DeserializeOwned>(response: Response) -> Result<T, SourceError> {
    response
        .json()
        .map_err(|e| SourceError::Decode(e.to_string()))
}

fn branch_or_default(branch: Option<String>) -> String {
    branch
        .filter(|b| !b.is_empty())
        .unwrap_or_else(|| FALLBACK_BRANCH.to_string())
}

/// Map a response's status and rate-limit headers to an error
///
/// A rejected token wins. Rate exhaustion is checked before any other status
/// so a failing request near the floor still stops the batch.
fn check_response(
    url: &str,
    status: StatusCode,
    rate: Option<RateLimit>,
    floor: u32,
) -> Result<(), SourceError> {
    if status == StatusCode::UNAUTHORIZED {
        return Err(SourceError::Auth(
            "GitHub rejected the token, run 'gh auth login' or set GITHUB_TOKEN".into(),
        ));
    }
    if let Some(rate) = rate {
        let throttled = matches!(status, StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS);
        if rate.remaining < floor || (throttled && rate.remaining == 0) {
            return Err(rate.into_error());
        }
    }
    if status == StatusCode::NOT_FOUND {
        return Err(SourceError::NotFound(url.to_string()));
    }
    if !status.is_success() {
        return Err(SourceError::Api {
            status: status.as_u16(),
            message: status.canonical_reason().unwrap_or_default().to_string(),
        });
    }
    Ok(())
}

#[derive(Debug, Clone, Copy)]
struct RateLimit {
    remaining: u32,
    reset: DateTime<Utc>,
}

impl RateLimit {
    fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let remaining = header_str(headers, "x-ratelimit-remaining")?.parse().ok()?;
        let reset = header_str(headers, "x-ratelimit-reset")
            .and_then(|v| v.parse::<i64>().ok())
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .unwrap_or_else(Utc::now);
        Some(Self { remaining, reset })
    }

    fn into_error(self) -> SourceError {
        SourceError::RateLimited {
            remaining: self.remaining,
            reset: self.reset,
        }
    }
}

fn header_str<'h>(headers: &'h HeaderMap, name: &str) -> Option<&'h str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

// =============================================================================
// Wire Payloads
// =============================================================================

#[derive(Debug, Deserialize)]
struct ApiMessage {
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct RepoPayload {
    #[serde(default)]
    default_branch: Option<String>,
    #[serde(default)]
    forks_count: usize,
}

#[derive(Debug, Deserialize)]
struct OwnerPayload {
    login: String,
}

#[derive(Debug, Deserialize)]
struct ForkPayload {
    name: String,
    owner: OwnerPayload,
    #[serde(default)]
    default_branch: Option<String>,
    #[serde(default)]
    html_url: String,
    #[serde(default)]
    pushed_at: Option<DateTime<Utc>>,
}

impl ForkPayload {
    fn into_identity(self) -> ForkIdentity {
        ForkIdentity {
            owner: self.owner.login,
            repo: self.name,
            default_branch: branch_or_default(self.default_branch),
            html_url: self.html_url,
            pushed_at: self.pushed_at,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ComparePayload {
    #[serde(default)]
    ahead_by: u32,
    #[serde(default)]
    commits: Vec<CommitPayload>,
    #[serde(default)]
    files: Vec<FilePayload>,
}

#[derive(Debug, Deserialize)]
struct CommitPayload {
    commit: CommitDetail,
    #[serde(default)]
    author: Option<OwnerPayload>,
}

#[derive(Debug, Deserialize)]
struct CommitDetail {
    #[serde(default)]
    author: Option<GitAuthor>,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct GitAuthor {
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct FilePayload {
    filename: String,
    #[serde(default)]
    additions: u32,
    #[serde(default)]
    deletions: u32,
    #[serde(default)]
    patch: Option<String>,
}

impl ComparePayload {
    fn into_comparison(self, fork: &ForkIdentity) -> Option<Comparison> {
        if self.ahead_by == 0 {
            return None;
        }

        let commits = self
            .commits
            .into_iter()
            .map(|c| CommitInfo {
                author: c.commit.author.map(|a| a.name).unwrap_or_default(),
                login: c.author.map(|a| a.login),
                message: c.commit.message.lines().next().unwrap_or("").to_string(),
            })
            .collect();

        let files = self
            .files
            .into_iter()
            .map(|f| FileDelta {
                path: f.filename,
                additions: f.additions,
                deletions: f.deletions,
                patch: f.patch.unwrap_or_default(),
            })
            .collect();

        Some(Comparison {
            fork: fork.clone(),
            ahead_by: self.ahead_by,
            commits,
            files,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fork() -> ForkIdentity {
        ForkIdentity {
            owner: "alice".into(),
            repo: "widget".into(),
            default_branch: "trunk".into(),
            html_url: "https://github.com/alice/widget".into(),
            pushed_at: None,
        }
    }

    #[test]
    fn test_next_page_url() {
        let link = r#"<https://api.github.com/repositories/1/forks?page=2>; rel="next", <https://api.github.com/repositories/1/forks?page=9>; rel="last""#;
        assert_eq!(
            next_page_url(link).as_deref(),
            Some("https://api.github.com/repositories/1/forks?page=2")
        );

        let last_page = r#"<https://api.github.com/repositories/1/forks?page=1>; rel="prev", <https://api.github.com/repositories/1/forks?page=1>; rel="first""#;
        assert_eq!(next_page_url(last_page), None);
    }

    #[test]
    fn test_compare_payload_conversion() {
        let json = r#"{
            "ahead_by": 2,
            "behind_by": 14,
            "commits": [
                {
                    "commit": {"author": {"name": "Alice"}, "message": "Raise timeout\n\nLonger body"},
                    "author": {"login": "alice"}
                },
                {
                    "commit": {"author": {"name": "dependabot[bot]"}, "message": "Bump lodash"},
                    "author": null
                }
            ],
            "files": [
                {"filename": "config.yaml", "additions": 1, "deletions": 1, "patch": "@@ -1 +1 @@\n-timeout: 10\n+timeout: 30"},
                {"filename": "logo.png", "additions": 0, "deletions": 0}
            ]
        }"#;

        let payload: ComparePayload = serde_json::from_str(json).unwrap();
        let comparison = payload.into_comparison(&fork()).unwrap();

        assert_eq!(comparison.ahead_by, 2);
        assert_eq!(comparison.fork.default_branch, "trunk");
        assert_eq!(comparison.commits[0].author, "Alice");
        assert_eq!(comparison.commits[0].login.as_deref(), Some("alice"));
        assert_eq!(comparison.commits[0].message, "Raise timeout");
        assert_eq!(comparison.commits[1].login, None);
        assert_eq!(comparison.files.len(), 2);
        assert_eq!(comparison.files[1].patch, "");
    }

    #[test]
    fn test_not_ahead_has_no_comparison() {
        let payload: ComparePayload =
            serde_json::from_str(r#"{"ahead_by": 0, "commits": [], "files": []}"#).unwrap();
        assert!(payload.into_comparison(&fork()).is_none());
    }

    #[test]
    fn test_fork_payload_defaults_branch() {
        let json = r#"{
            "name": "widget",
            "owner": {"login": "bob"},
            "default_branch": "",
            "html_url": "https://github.com/bob/widget",
            "pushed_at": "2025-03-01T12:00:00Z"
        }"#;
        let payload: ForkPayload = serde_json::from_str(json).unwrap();
        let identity = payload.into_identity();

        assert_eq!(identity.owner, "bob");
        assert_eq!(identity.default_branch, "main");
        assert!(identity.pushed_at.is_some());
    }

    #[test]
    fn test_rate_limit_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("x-ratelimit-remaining", HeaderValue::from_static("7"));
        headers.insert("x-ratelimit-reset", HeaderValue::from_static("1700000000"));

        let rate = RateLimit::from_headers(&headers).unwrap();
        assert_eq!(rate.remaining, 7);
        assert_eq!(rate.reset.timestamp(), 1_700_000_000);
        assert!(RateLimit::from_headers(&HeaderMap::new()).is_none());
    }

    fn rate(remaining: u32) -> Option<RateLimit> {
        Some(RateLimit {
            remaining,
            reset: Utc::now(),
        })
    }

    #[test]
    fn test_check_response_auth_wins() {
        let err = check_response("u", StatusCode::UNAUTHORIZED, rate(0), 10).unwrap_err();
        assert!(matches!(err, SourceError::Auth(_)));
    }

    #[test]
    fn test_check_response_forbidden_exhausted() {
        let err = check_response("u", StatusCode::FORBIDDEN, rate(0), 0).unwrap_err();
        assert!(matches!(err, SourceError::RateLimited { remaining: 0, .. }));

        // a plain 403 with budget left is an ordinary API error
        let err = check_response("u", StatusCode::FORBIDDEN, rate(500), 10).unwrap_err();
        assert!(matches!(err, SourceError::Api { status: 403, .. }));
    }

    #[test]
    fn test_check_response_not_found_below_floor_is_fatal() {
        let err = check_response("u", StatusCode::NOT_FOUND, rate(3), 10).unwrap_err();
        assert!(matches!(err, SourceError::RateLimited { remaining: 3, .. }));
        assert!(err.is_fatal());

        let err = check_response("u", StatusCode::NOT_FOUND, rate(11), 10).unwrap_err();
        assert!(matches!(err, SourceError::NotFound(_)));
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_check_response_server_error_below_floor_is_fatal() {
        let err = check_response("u", StatusCode::BAD_GATEWAY, rate(9), 10).unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_check_response_success() {
        let err = check_response("u", StatusCode::OK, rate(9), 10).unwrap_err();
        assert!(matches!(err, SourceError::RateLimited { remaining: 9, .. }));

        assert!(check_response("u", StatusCode::OK, rate(10), 10).is_ok());
        assert!(check_response("u", StatusCode::OK, None, 10).is_ok());
    }
}
