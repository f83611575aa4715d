// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! GitHub starred-repository source
//!
//! Pages are fetched sequentially with a fixed delay between requests to
//! stay inside the API rate limit. A failure on any page discards the pages
//! already fetched; callers never see a partial collection.

use crate::error::{Error, Result};
use crate::types::{Owner, Repository};
use chrono::{DateTime, TimeZone, Utc};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Response, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

/// Public API endpoint
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Largest page the API serves
pub const MAX_PER_PAGE: u32 = 100;

/// Media type that adds `starred_at` to each record
const STAR_MEDIA_TYPE: &str = "application/vnd.github.v3.star+json";

/// Where starred repositories come from
#[allow(async_fn_in_trait)]
pub trait StarSource {
    /// Whether `username` exists on the remote
    async fn user_exists(&self, username: &str) -> Result<bool>;

    /// Every repository `username` has starred.
    ///
    /// Unknown users are [`Error::UserNotFound`]; zero stars is `Ok(vec![])`.
    async fn fetch_all_starred(&self, username: &str) -> Result<Vec<Repository>>;
}

// =============================================================================
// Wire types
// =============================================================================

#[derive(Debug, Deserialize)]
struct RawOwner {
    login: String,
    #[serde(default)]
    avatar_url: String,
}

#[derive(Debug, Deserialize)]
struct RawRepo {
    id: u64,
    name: String,
    full_name: String,
    description: Option<String>,
    html_url: String,
    #[serde(default)]
    stargazers_count: u64,
    language: Option<String>,
    #[serde(default)]
    topics: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    pushed_at: Option<DateTime<Utc>>,
    owner: RawOwner,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StarredItem {
    Starred { starred_at: DateTime<Utc>, repo: RawRepo },
    Bare(RawRepo),
}

impl From<StarredItem> for Repository {
    fn from(item: StarredItem) -> Self {
        let (raw, starred_at) = match item {
            StarredItem::Starred { starred_at, repo } => (repo, starred_at),
            // without the star media type there is no star time; use creation
            StarredItem::Bare(repo) => {
                let at = repo.created_at;
                (repo, at)
            }
        };
        Self {
            id: raw.id,
            name: raw.name,
            full_name: raw.full_name,
            description: raw.description,
            html_url: raw.html_url,
            stargazers_count: raw.stargazers_count,
            language: raw.language,
            topics: raw.topics,
            created_at: raw.created_at,
            updated_at: raw.updated_at,
            pushed_at: raw.pushed_at,
            starred_at,
            owner: Owner {
                login: raw.owner.login,
                avatar_url: raw.owner.avatar_url,
            },
        }
    }
}

/// One page of starred repositories
#[derive(Debug, Clone)]
pub struct StarredPage {
    /// Records on this page
    pub repos: Vec<Repository>,
    /// Whether another page may follow
    pub has_more: bool,
    /// Next page number when `has_more`
    pub next_page: Option<u32>,
}

/// Parse a page body; `has_more` when the page came back full
pub fn parse_starred_page(body: &str, page: u32, per_page: u32) -> Result<StarredPage> {
    let items: Vec<StarredItem> = serde_json::from_str(body).map_err(|e| Error::Api {
        status: 200,
        message: format!("unexpected starred payload: {e}"),
    })?;
    let has_more = u32::try_from(items.len()).map_or(true, |n| n == per_page);
    Ok(StarredPage {
        repos: items.into_iter().map(Repository::from).collect(),
        has_more,
        next_page: has_more.then_some(page + 1),
    })
}

/// Core API rate limit window
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RateLimit {
    /// Requests per window
    pub limit: u32,
    /// Requests left
    pub remaining: u32,
    /// Window reset, Unix seconds
    pub reset: i64,
}

impl RateLimit {
    /// Reset time as a timestamp
    #[must_use]
    pub fn reset_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.reset, 0).single()
    }
}

#[derive(Debug, Deserialize)]
struct RateLimitResponse {
    rate: RateLimit,
}

// =============================================================================
// Client
// =============================================================================

/// GitHub REST client for starred repositories
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
    per_page: u32,
    page_delay: Duration,
}

impl GitHubClient {
    /// Client against `base_url`, authenticated when `token` is set
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.is_empty()),
            per_page: MAX_PER_PAGE,
            page_delay: Duration::from_secs(1),
        })
    }

    /// Page size, clamped to 1..=100
    #[must_use]
    pub fn with_per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page.clamp(1, MAX_PER_PAGE);
        self
    }

    /// Pause between page requests
    #[must_use]
    pub fn with_page_delay(mut self, delay: Duration) -> Self {
        self.page_delay = delay;
        self
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(concat!("starshelf/", env!("CARGO_PKG_VERSION"))));
        headers.insert(ACCEPT, HeaderValue::from_static(STAR_MEDIA_TYPE));
        if let Some(token) = &self.token {
            if let Ok(value) = HeaderValue::from_str(&format!("Bearer {token}")) {
                headers.insert(AUTHORIZATION, value);
            }
        }
        headers
    }

    async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Response> {
        let url = format!("{}{}", self.base_url, path);
        let response = self.http.get(&url).headers(self.headers()).query(query).send().await?;
        Ok(response)
    }

    /// Map a non-success response onto the error taxonomy
    async fn failure(response: Response, username: &str) -> Error {
        let status = response.status();
        let remaining = header_u64(response.headers(), "x-ratelimit-remaining");
        let reset = header_u64(response.headers(), "x-ratelimit-reset")
            .and_then(|s| i64::try_from(s).ok())
            .and_then(|s| Utc.timestamp_opt(s, 0).single());
        let message = response.text().await.unwrap_or_default();

        match status {
            StatusCode::NOT_FOUND => Error::UserNotFound(username.to_string()),
            StatusCode::TOO_MANY_REQUESTS => Error::RateLimited { reset },
            StatusCode::FORBIDDEN if remaining == Some(0) => Error::RateLimited { reset },
            _ => Error::Api {
                status: status.as_u16(),
                message,
            },
        }
    }

    /// One page of `username`'s stars, newest first
    pub async fn starred_page(&self, username: &str, page: u32) -> Result<StarredPage> {
        let path = format!("/users/{username}/starred");
        let query = [
            ("per_page", self.per_page.to_string()),
            ("page", page.to_string()),
            ("sort", "created".to_string()),
            ("direction", "desc".to_string()),
        ];
        let response = self.get(&path, &query).await?;
        if !response.status().is_success() {
            return Err(Self::failure(response, username).await);
        }
        let body = response.text().await?;
        let parsed = parse_starred_page(&body, page, self.per_page)?;
        debug!(page, count = parsed.repos.len(), "Fetched starred page");
        Ok(parsed)
    }

    /// Current core rate limit
    pub async fn rate_limit(&self) -> Result<RateLimit> {
        let response = self.get("/rate_limit", &[]).await?;
        if !response.status().is_success() {
            return Err(Self::failure(response, "").await);
        }
        Ok(response.json::<RateLimitResponse>().await?.rate)
    }
}

fn header_u64(headers: &HeaderMap, name: &str) -> Option<u64> {
    headers.get(name)?.to_str().ok()?.parse().ok()
}

impl StarSource for GitHubClient {
    async fn user_exists(&self, username: &str) -> Result<bool> {
        let response = self.get(&format!("/users/{username}"), &[]).await?;
        match response.status() {
            s if s.is_success() => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            _ => Err(Self::failure(response, username).await),
        }
    }

    async fn fetch_all_starred(&self, username: &str) -> Result<Vec<Repository>> {
        let mut all = Vec::new();
        let mut page = 1;
        loop {
            let fetched = self.starred_page(username, page).await?;
            all.extend(fetched.repos);
            match fetched.next_page {
                Some(next) => {
                    page = next;
                    tokio::time::sleep(self.page_delay).await;
                }
                None => break,
            }
        }
        info!("Fetched {} starred repositories for {}", all.len(), username);
        Ok(all)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    const STARRED: &str = r#"[
        {
            "starred_at": "2025-03-01T10:00:00Z",
            "repo": {
                "id": 1,
                "name": "tokio",
                "full_name": "tokio-rs/tokio",
                "description": "A runtime",
                "html_url": "https://github.com/tokio-rs/tokio",
                "stargazers_count": 25000,
                "language": "Rust",
                "topics": ["async"],
                "created_at": "2016-09-09T00:00:00Z",
                "updated_at": "2025-05-01T00:00:00Z",
                "pushed_at": "2025-05-02T00:00:00Z",
                "owner": {"login": "tokio-rs", "avatar_url": "https://example.com/a.png"}
            }
        }
    ]"#;

    const BARE: &str = r#"[
        {
            "id": 2,
            "name": "serde",
            "full_name": "serde-rs/serde",
            "description": null,
            "html_url": "https://github.com/serde-rs/serde",
            "stargazers_count": 9000,
            "language": null,
            "created_at": "2014-01-01T00:00:00Z",
            "updated_at": "2025-01-01T00:00:00Z",
            "pushed_at": null,
            "owner": {"login": "serde-rs"}
        }
    ]"#;

    #[test]
    fn test_parse_star_records() {
        let page = parse_starred_page(STARRED, 1, 100).unwrap();
        assert_eq!(page.repos.len(), 1);
        let repo = &page.repos[0];
        assert_eq!(repo.full_name, "tokio-rs/tokio");
        assert_eq!(repo.starred_at.to_rfc3339(), "2025-03-01T10:00:00+00:00");
        assert!(!page.has_more);
        assert!(page.next_page.is_none());
    }

    #[test]
    fn test_bare_records_fall_back_to_created_at() {
        let page = parse_starred_page(BARE, 1, 100).unwrap();
        let repo = &page.repos[0];
        assert_eq!(repo.starred_at, repo.created_at);
        assert!(repo.topics.is_empty());
        assert!(repo.pushed_at.is_none());
    }

    #[test]
    fn test_full_page_has_more() {
        let page = parse_starred_page(STARRED, 3, 1).unwrap();
        assert!(page.has_more);
        assert_eq!(page.next_page, Some(4));
    }

    #[test]
    fn test_empty_page_ends() {
        let page = parse_starred_page("[]", 1, 100).unwrap();
        assert!(page.repos.is_empty());
        assert!(!page.has_more);
    }

    #[test]
    fn test_garbage_payload_is_api_error() {
        assert!(matches!(parse_starred_page("{}", 1, 100), Err(Error::Api { .. })));
    }

    #[test]
    fn test_per_page_clamped() {
        let client = GitHubClient::new(DEFAULT_API_URL, None).unwrap().with_per_page(500);
        assert_eq!(client.per_page, 100);
        let client = client.with_per_page(0);
        assert_eq!(client.per_page, 1);
    }

    #[test]
    fn test_reset_at_converts_unix_seconds() {
        let limit = RateLimit { limit: 60, remaining: 0, reset: 1_700_000_000 };
        assert_eq!(limit.reset_at(), Utc.timestamp_opt(1_700_000_000, 0).single());
        assert_eq!(limit.reset_at().map(|t| t.to_rfc3339()), Some("2023-11-14T22:13:20+00:00".into()));
    }

    /// Answer a single request on a local port with `status`, `headers` and `body`
    async fn serve_once(status: &str, headers: &str, body: &str) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n{headers}\r\n{body}",
            body.len()
        );
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 8192];
            let read = socket.read(&mut buf).await.unwrap();
            assert!(read > 0);
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn test_rate_limit_reads_core_window() {
        let body = r#"{"resources": {}, "rate": {"limit": 60, "remaining": 59, "reset": 1700000000, "used": 1}}"#;
        let url = serve_once("200 OK", "", body).await;

        let limit = GitHubClient::new(url, None).unwrap().rate_limit().await.unwrap();

        assert_eq!(limit.limit, 60);
        assert_eq!(limit.remaining, 59);
        assert_eq!(limit.reset, 1_700_000_000);
    }

    #[tokio::test]
    async fn test_exhausted_forbidden_maps_to_rate_limited() {
        let url = serve_once(
            "403 Forbidden",
            "x-ratelimit-remaining: 0\r\nx-ratelimit-reset: 1700000000\r\n",
            r#"{"message": "API rate limit exceeded"}"#,
        )
        .await;

        let err = GitHubClient::new(url, None).unwrap().rate_limit().await.unwrap_err();

        match err {
            Error::RateLimited { reset } => {
                assert_eq!(reset, Utc.timestamp_opt(1_700_000_000, 0).single());
            }
            other => panic!("expected rate limit error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_user_is_not_found() {
        let url = serve_once("404 Not Found", "", r#"{"message": "Not Found"}"#).await;

        let exists = GitHubClient::new(url, None).unwrap().user_exists("ghost").await.unwrap();

        assert!(!exists);
    }
}
