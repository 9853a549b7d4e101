use crate::issues::{FetchError, IssueState};

/// Failures of the collection engine.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Construction inputs were rejected; the engine cannot start.
    #[error("invalid collector configuration: {0}")]
    Config(String),

    /// A page fetch failed; the scrape is aborted without emitting gauges.
    #[error("fetching page {page} of issues failed")]
    Fetch {
        page: u32,
        #[source]
        source: FetchError,
    },

    /// A closed-only computation was invoked on an issue that is not (fully) closed.
    #[error("issue #{number} is {state} or lacks a close time; time to close is undefined")]
    InvalidState { number: u64, state: IssueState },

    /// The scrape was cancelled or timed out before pagination finished.
    #[error("scrape cancelled before all issues were collected")]
    Cancelled,
}

/// Render an error and all of its sources on one line, outermost first.
#[must_use]
pub fn error_chain(error: &dyn core::error::Error) -> String {
    let mut text = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        text.push_str(": ");
        text.push_str(&cause.to_string());
        source = cause.source();
    }

    text
}
