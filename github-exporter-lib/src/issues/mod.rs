//! Issue data and the sources that produce it
//!
//! [`Issue`] is the read-only record the engine classifies. Issues are produced one page at a
//! time by an [`IssueSource`]; [`Client`] is the GitHub REST implementation, and tests plug in
//! scripted sources through the same trait.

mod client;
mod issue;
mod repo;
mod source;

pub use client::{Client, DEFAULT_API_URL, MAX_PAGE_SIZE, RateLimitInfo};
pub use issue::{Issue, IssueState, Label, PullRequestMarker};
pub use repo::RepoSpec;
pub use source::{FetchError, IssuePage, IssueQuery, IssueSource};
