use chrono::{DateTime, Utc};
use serde::Deserialize;
use strum::{Display, IntoStaticStr};

/// Minimal GitHub issue with only the fields the exporter needs.
///
/// The GitHub issues endpoint also returns pull requests; those carry a `pull_request` object.
#[derive(Debug, Clone, Deserialize)]
pub struct Issue {
    pub number: u64,
    pub state: IssueState,
    pub created_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub labels: Vec<Label>,
    pub pull_request: Option<PullRequestMarker>,
}

/// Issue state: open or closed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Display, IntoStaticStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum IssueState {
    Open,
    Closed,
}

impl IssueState {
    /// Value used for the `state` metric label.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Label {
    pub name: String,
}

/// Marker type to detect if an issue is actually a pull request.
#[derive(Debug, Clone, Deserialize)]
pub struct PullRequestMarker {
    #[serde(default)]
    pub merged_at: Option<DateTime<Utc>>,
}

impl Issue {
    #[must_use]
    pub const fn is_pull_request(&self) -> bool {
        self.pull_request.is_some()
    }

    /// Label names in the order GitHub returned them.
    pub fn label_names(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(|label| label.name.as_str())
    }

    /// Label names with duplicates removed, since labels form a set.
    #[must_use]
    pub fn distinct_label_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.label_names().collect();
        names.sort_unstable();
        names.dedup();
        names
    }

    /// Case-sensitive exact match against the issue's labels.
    #[must_use]
    pub fn has_label(&self, name: &str) -> bool {
        self.label_names().any(|label| label == name)
    }
}
