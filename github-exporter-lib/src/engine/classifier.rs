//! Per-issue classification: relevance, selector matching and time to close.
//!
//! Everything here is a pure function of the issue's fields.

use super::Error;
use crate::issues::{Issue, IssueState};
use core::fmt::{Display, Formatter};
use core::str::FromStr;

/// Separator between the label names of a selector.
pub const SELECTOR_SEPARATOR: char = ',';

/// Pull requests are listed by the issues endpoint but never counted.
#[must_use]
pub const fn is_relevant(issue: &Issue) -> bool {
    !issue.is_pull_request()
}

/// A conjunction of label names, such as `bug,urgent`.
///
/// The selector string is kept verbatim since it doubles as the `labels` metric label value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LabelSelector {
    raw: String,
    required: Vec<String>,
}

impl LabelSelector {
    pub fn parse(raw: &str) -> Result<Self, Error> {
        let required: Vec<String> = raw.split(SELECTOR_SEPARATOR).map(str::to_owned).collect();

        if raw.is_empty() || required.iter().any(String::is_empty) {
            return Err(Error::Config(format!(
                "label selector '{raw}' must name at least one label and may not contain empty label names"
            )));
        }

        Ok(Self {
            raw: raw.to_owned(),
            required,
        })
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn required_labels(&self) -> impl Iterator<Item = &str> {
        self.required.iter().map(String::as_str)
    }

    /// True iff the issue carries every label the selector names.
    #[must_use]
    pub fn matches(&self, issue: &Issue) -> bool {
        !self.required.is_empty() && self.required.iter().all(|name| issue.has_label(name))
    }
}

impl FromStr for LabelSelector {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        Self::parse(s)
    }
}

impl Display for LabelSelector {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Seconds between creation and close of a closed issue.
///
/// Negative results are possible for anomalous data and are returned unchanged.
#[expect(clippy::cast_precision_loss, reason = "acceptable for duration")]
pub fn seconds_to_close(issue: &Issue) -> Result<f64, Error> {
    match (issue.state, issue.closed_at) {
        (IssueState::Closed, Some(closed_at)) => Ok((closed_at - issue.created_at).num_seconds() as f64),
        (state, _) => Err(Error::InvalidState {
            number: issue.number,
            state,
        }),
    }
}
