//! Issue builders and scripted issue sources shared by the engine's unit tests.

use crate::issues::{FetchError, Issue, IssuePage, IssueQuery, IssueSource, IssueState, Label, PullRequestMarker};
use chrono::{DateTime, Duration, Utc};
use core::sync::atomic::{AtomicU32, Ordering};
use prometheus::core::Metric as _;
use prometheus::{HistogramOpts, proto};
use std::collections::VecDeque;
use std::sync::Mutex;
use tokio_util::sync::CancellationToken;

/// Creation time of every test issue.
pub fn t0() -> DateTime<Utc> {
    DateTime::from_timestamp(1_704_067_200, 0).unwrap()
}

/// A histogram with the given bucket bounds holding the given observations.
pub fn histogram(bounds: &[f64], observations: &[f64]) -> proto::Histogram {
    let histogram = prometheus::Histogram::with_opts(HistogramOpts::new("test_seconds", "test").buckets(bounds.to_vec())).unwrap();
    for value in observations {
        histogram.observe(*value);
    }

    histogram.metric().get_histogram().clone()
}

fn labels(names: &[&str]) -> Vec<Label> {
    names.iter().map(|name| Label { name: (*name).to_owned() }).collect()
}

pub fn open_issue(number: u64, names: &[&str]) -> Issue {
    Issue {
        number,
        state: IssueState::Open,
        created_at: t0(),
        closed_at: None,
        labels: labels(names),
        pull_request: None,
    }
}

pub fn closed_issue(number: u64, names: &[&str], seconds_open: i64) -> Issue {
    Issue {
        number,
        state: IssueState::Closed,
        created_at: t0(),
        closed_at: Some(t0() + Duration::seconds(seconds_open)),
        labels: labels(names),
        pull_request: None,
    }
}

pub fn pull_request(number: u64, names: &[&str]) -> Issue {
    Issue {
        pull_request: Some(PullRequestMarker { merged_at: None }),
        ..open_issue(number, names)
    }
}

pub fn page(issues: Vec<Issue>, next_page: Option<u32>) -> IssuePage {
    IssuePage { issues, next_page }
}

pub fn server_error(page: u32) -> FetchError {
    FetchError::Status {
        url: format!("https://api.github.com/repos/o/r/issues?page={page}"),
        status: 502,
    }
}

/// Replays a fixed sequence of page results and records the queries it saw.
#[derive(Debug, Default)]
pub struct ScriptedSource {
    pages: Mutex<VecDeque<Result<IssuePage, FetchError>>>,
    requested: Mutex<Vec<(u32, u8, Option<DateTime<Utc>>)>>,
}

impl ScriptedSource {
    pub fn new(pages: impl IntoIterator<Item = Result<IssuePage, FetchError>>) -> Self {
        Self {
            pages: Mutex::new(pages.into_iter().collect()),
            requested: Mutex::default(),
        }
    }

    pub fn fetches(&self) -> usize {
        self.requested.lock().unwrap().len()
    }

    pub fn requested_pages(&self) -> Vec<u32> {
        self.requested.lock().unwrap().iter().map(|(page, _, _)| *page).collect()
    }

    pub fn requested_since(&self) -> Vec<Option<DateTime<Utc>>> {
        self.requested.lock().unwrap().iter().map(|(_, _, since)| *since).collect()
    }

    pub fn requested_page_sizes(&self) -> Vec<u8> {
        self.requested.lock().unwrap().iter().map(|(_, size, _)| *size).collect()
    }
}

impl IssueSource for ScriptedSource {
    async fn list_issues(&self, query: &IssueQuery<'_>) -> Result<IssuePage, FetchError> {
        self.requested.lock().unwrap().push((query.page, query.page_size, query.since));
        self.pages
            .lock()
            .unwrap()
            .pop_front()
            .expect("scripted source ran out of pages")
    }
}

/// Always reports another page; cancels the token once `cancel_after` pages were served.
#[derive(Debug)]
pub struct EndlessSource {
    pub cancel: CancellationToken,
    pub cancel_after: u32,
    pub fetches: AtomicU32,
}

impl IssueSource for EndlessSource {
    async fn list_issues(&self, query: &IssueQuery<'_>) -> Result<IssuePage, FetchError> {
        let served = self.fetches.fetch_add(1, Ordering::SeqCst) + 1;
        if served >= self.cancel_after {
            self.cancel.cancel();
        }

        Ok(page(vec![open_issue(u64::from(query.page), &["bug"])], Some(query.page + 1)))
    }
}

/// A source whose page fetch never completes.
#[derive(Debug, Default)]
pub struct StalledSource;

impl IssueSource for StalledSource {
    async fn list_issues(&self, _query: &IssueQuery<'_>) -> Result<IssuePage, FetchError> {
        core::future::pending().await
    }
}
