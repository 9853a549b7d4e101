//! Page-by-page retrieval of a repository's issues.

use super::Error;
use crate::issues::{Issue, IssueQuery, IssueSource, RepoSpec};
use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;

const LOG_TARGET: &str = " paginator";

/// Walks the pages of an [`IssueSource`] until it reports there is no next page.
///
/// There is no iteration cap: a source that never stops reporting a next page is only bounded
/// by cancellation.
#[derive(Debug)]
pub struct Paginator<'a, S> {
    source: &'a S,
    repo: &'a RepoSpec,
    page_size: u8,
    since: Option<DateTime<Utc>>,
    cancel: &'a CancellationToken,
    next: Option<u32>,
    fetches: u32,
}

impl<'a, S: IssueSource> Paginator<'a, S> {
    #[must_use]
    pub const fn new(
        source: &'a S,
        repo: &'a RepoSpec,
        page_size: u8,
        since: Option<DateTime<Utc>>,
        cancel: &'a CancellationToken,
    ) -> Self {
        Self {
            source,
            repo,
            page_size,
            since,
            cancel,
            next: Some(1),
            fetches: 0,
        }
    }

    /// Number of pages fetched so far.
    #[must_use]
    pub const fn fetches(&self) -> u32 {
        self.fetches
    }

    /// Fetch the next page, or `Ok(None)` once the source has signaled the last page.
    pub async fn next_page(&mut self) -> Result<Option<Vec<Issue>>, Error> {
        let Some(page) = self.next else {
            return Ok(None);
        };

        if self.cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let query = IssueQuery {
            repo: self.repo,
            page,
            page_size: self.page_size,
            since: self.since,
        };

        let result = tokio::select! {
            biased;
            () = self.cancel.cancelled() => return Err(Error::Cancelled),
            result = self.source.list_issues(&query) => result,
        };

        let issue_page = result.map_err(|source| Error::Fetch { page, source })?;
        self.fetches += 1;

        log::debug!(target: LOG_TARGET, "collecting {:3} issues of page {:2}", issue_page.issues.len(), page);

        self.next = issue_page.next_page;
        if self.next.is_none() {
            log::debug!(target: LOG_TARGET, "collected all issues of {} in {} page(s)", self.repo, self.fetches);
        }

        Ok(Some(issue_page.issues))
    }
}

/// Hand every page to `on_page` as it arrives.
///
/// Returns the number of pages fetched. Stops at the first fetch failure or on cancellation;
/// pages handed over before that are not taken back.
pub async fn for_each_page<S, F>(
    source: &S,
    repo: &RepoSpec,
    page_size: u8,
    since: Option<DateTime<Utc>>,
    cancel: &CancellationToken,
    mut on_page: F,
) -> Result<u32, Error>
where
    S: IssueSource,
    F: FnMut(Vec<Issue>) -> Result<(), Error>,
{
    let mut paginator = Paginator::new(source, repo, page_size, since, cancel);
    while let Some(issues) = paginator.next_page().await? {
        on_page(issues)?;
    }

    Ok(paginator.fetches())
}

/// Collect the issues of every page into one list.
pub async fn fetch_all<S: IssueSource>(
    source: &S,
    repo: &RepoSpec,
    page_size: u8,
    since: Option<DateTime<Utc>>,
    cancel: &CancellationToken,
) -> Result<Vec<Issue>, Error> {
    let mut all = Vec::new();
    let _ = for_each_page(source, repo, page_size, since, cancel, |issues| {
        all.extend(issues);
        Ok(())
    })
    .await?;

    Ok(all)
}
