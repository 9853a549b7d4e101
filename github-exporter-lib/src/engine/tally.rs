use crate::HashMap;
use crate::issues::IssueState;
use chrono::{DateTime, Utc};

/// A label name (or selector string) paired with an issue state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TallyKey {
    pub name: String,
    pub state: IssueState,
}

impl TallyKey {
    #[must_use]
    pub fn new(name: impl Into<String>, state: IssueState) -> Self {
        Self {
            name: name.into(),
            state,
        }
    }
}

/// A label name (or selector string) paired with the number of a closed issue.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimestampKey {
    pub name: String,
    pub number: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IssueTimestamps {
    pub opened: DateTime<Utc>,
    pub closed: DateTime<Utc>,
}

/// Scrape-local counters. Every scrape starts from an empty set and discards it after rendering.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tallies {
    pub label_counts: HashMap<TallyKey, f64>,
    pub selector_counts: HashMap<TallyKey, f64>,
    pub state_counts: HashMap<IssueState, f64>,
    pub label_timestamps: HashMap<TimestampKey, IssueTimestamps>,
    pub selector_timestamps: HashMap<TimestampKey, IssueTimestamps>,
}

impl Tallies {
    pub fn count_label(&mut self, label: &str, state: IssueState) {
        *self.label_counts.entry(TallyKey::new(label, state)).or_default() += 1.0;
    }

    pub fn count_selector(&mut self, selector: &str, state: IssueState) {
        *self.selector_counts.entry(TallyKey::new(selector, state)).or_default() += 1.0;
    }

    pub fn count_state(&mut self, state: IssueState) {
        *self.state_counts.entry(state).or_default() += 1.0;
    }

    #[must_use]
    pub fn label_count(&self, label: &str, state: IssueState) -> f64 {
        self.label_counts.get(&TallyKey::new(label, state)).copied().unwrap_or_default()
    }

    #[must_use]
    pub fn selector_count(&self, selector: &str, state: IssueState) -> f64 {
        self.selector_counts.get(&TallyKey::new(selector, state)).copied().unwrap_or_default()
    }

    #[must_use]
    pub fn state_count(&self, state: IssueState) -> f64 {
        self.state_counts.get(&state).copied().unwrap_or_default()
    }
}
