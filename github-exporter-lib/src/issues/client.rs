//! GitHub API client
//!
//! Minimal GitHub REST client for listing a repository's issues page by page.

use super::{FetchError, Issue, IssuePage, IssueQuery, IssueSource};
use chrono::{DateTime, Utc};
use core::time::Duration;
use ohno::IntoAppError;
use reqwest::header::{HeaderMap, LINK};
use url::Url;

const LOG_TARGET: &str = "    client";

pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Largest `per_page` value GitHub honors for the issues endpoint.
pub const MAX_PAGE_SIZE: u8 = 100;

const USER_AGENT: &str = concat!("github-exporter/", env!("CARGO_PKG_VERSION"));

/// Rate limit information from response headers
#[derive(Debug, Clone, Copy)]
pub struct RateLimitInfo {
    pub remaining: usize,
    pub reset_at: DateTime<Utc>,
}

/// GitHub API client
#[derive(Debug, Clone)]
#[expect(clippy::struct_field_names, reason = "client field stores the underlying HTTP client")]
pub struct Client {
    client: reqwest::Client,
    base_url: String,
}

impl Client {
    /// Create a new GitHub API client with optional authentication token and base URL
    pub fn new(token: Option<&str>, base_url: impl Into<String>, timeout: Duration) -> crate::Result<Self> {
        use reqwest::header::{AUTHORIZATION, HeaderValue};

        let base_url = base_url.into().trim_end_matches('/').to_owned();
        let _ = Url::parse(&base_url).into_app_err_with(|| format!("parsing GitHub API URL '{base_url}'"))?;

        let mut client_builder = reqwest::Client::builder().user_agent(USER_AGENT).timeout(timeout);

        if let Some(t) = token {
            let mut auth_val = HeaderValue::from_str(&format!("token {t}"))?;
            auth_val.set_sensitive(true);

            let mut headers = HeaderMap::new();
            let _ = headers.insert(AUTHORIZATION, auth_val);

            client_builder = client_builder.default_headers(headers);
        }

        Ok(Self {
            client: client_builder.build()?,
            base_url,
        })
    }

    /// Get the base URL for this client
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn issues_url(&self, query: &IssueQuery<'_>) -> String {
        format!("{}/repos/{}/{}/issues", self.base_url, query.repo.owner(), query.repo.repo())
    }

    async fn fetch_page(&self, query: &IssueQuery<'_>) -> Result<IssuePage, FetchError> {
        let url = self.issues_url(query);

        let mut params = vec![
            ("state", "all".to_owned()),
            ("per_page", query.page_size.to_string()),
            ("page", query.page.to_string()),
        ];
        if let Some(since) = query.since {
            params.push(("since", since.to_rfc3339_opts(chrono::SecondsFormat::Secs, true)));
        }

        let resp = self
            .client
            .get(&url)
            .query(&params)
            .send()
            .await
            .map_err(|source| FetchError::Transport { url: url.clone(), source })?;

        // Extract rate limit info from response headers before checking status
        let rate_limit = extract_rate_limit_from_headers(resp.headers());
        if let Some(rl) = &rate_limit {
            log::trace!(target: LOG_TARGET, "GitHub rate limit: {} remaining, resets at {}", rl.remaining, rl.reset_at);
        }

        let status = resp.status();
        if !status.is_success() {
            let status_code = status.as_u16();

            // 429, or 403 with an exhausted quota, is a rate limit rather than a permission problem
            let exhausted = rate_limit.is_some_and(|rl| rl.remaining == 0);
            if status_code == 429 || (status_code == 403 && exhausted) {
                let reset_at = rate_limit.map_or_else(|| Utc::now() + chrono::Duration::hours(1), |rl| rl.reset_at);
                return Err(FetchError::RateLimited { reset_at });
            }

            return Err(FetchError::Status { url, status: status_code });
        }

        let next_page = resp
            .headers()
            .get(LINK)
            .and_then(|h| h.to_str().ok())
            .and_then(parse_next_page);

        let issues: Vec<Issue> = resp.json().await.map_err(|source| FetchError::Decode { url, source })?;

        Ok(IssuePage { issues, next_page })
    }
}

impl IssueSource for Client {
    fn list_issues(&self, query: &IssueQuery<'_>) -> impl Future<Output = Result<IssuePage, FetchError>> + Send {
        self.fetch_page(query)
    }
}

/// Extract rate limit information from API response headers
fn extract_rate_limit_from_headers(headers: &HeaderMap) -> Option<RateLimitInfo> {
    let remaining = headers.get("x-ratelimit-remaining")?.to_str().ok()?.parse::<usize>().ok()?;

    let reset_timestamp = headers.get("x-ratelimit-reset")?.to_str().ok()?.parse::<i64>().ok()?;

    let reset_at = DateTime::from_timestamp(reset_timestamp, 0)?;

    Some(RateLimitInfo { remaining, reset_at })
}

/// Find the `page` query parameter of the `rel="next"` entry of a `Link` header.
///
/// Returns `None` when there is no next page, which ends pagination.
fn parse_next_page(link: &str) -> Option<u32> {
    link.split(',').find_map(|entry| {
        let (target, params) = entry.split_once(';')?;
        if !params.split(';').any(|param| param.trim() == r#"rel="next""#) {
            return None;
        }

        let target = target.trim().strip_prefix('<')?.strip_suffix('>')?;
        let url = Url::parse(target).ok()?;
        url.query_pairs()
            .find(|(key, _)| key == "page")
            .and_then(|(_, value)| value.parse().ok())
    })
}
