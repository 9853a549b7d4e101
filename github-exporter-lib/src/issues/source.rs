use super::{Issue, RepoSpec};
use chrono::{DateTime, Utc};

/// Parameters for fetching one page of a repository's issues.
///
/// The state filter is always `all`: open and closed issues are both needed for the
/// state distribution.
#[derive(Debug, Clone)]
pub struct IssueQuery<'a> {
    pub repo: &'a RepoSpec,
    /// 1-based page number
    pub page: u32,
    /// Requested page size. The tracker may return fewer issues.
    pub page_size: u8,
    /// Only return issues updated at or after this time
    pub since: Option<DateTime<Utc>>,
}

/// One page of issues plus the cursor for the page after it.
#[derive(Debug, Clone, Default)]
pub struct IssuePage {
    pub issues: Vec<Issue>,
    /// `None` when this was the last page
    pub next_page: Option<u32>,
}

/// Failure to fetch a page of issues from the tracker.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("could not send request to {url}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("request to {url} failed with HTTP status {status}")]
    Status { url: String, status: u16 },

    #[error("rate limited by GitHub until {reset_at}")]
    RateLimited { reset_at: DateTime<Utc> },

    #[error("could not decode issues returned by {url}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Something that can list a repository's issues one page at a time.
pub trait IssueSource: Send + Sync {
    fn list_issues(&self, query: &IssueQuery<'_>) -> impl Future<Output = Result<IssuePage, FetchError>> + Send;
}

impl<S: IssueSource> IssueSource for std::sync::Arc<S> {
    fn list_issues(&self, query: &IssueQuery<'_>) -> impl Future<Output = Result<IssuePage, FetchError>> + Send {
        (**self).list_issues(query)
    }
}
