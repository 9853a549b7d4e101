use super::{Error, LabelSelector};
use crate::HashSet;
use crate::issues::{MAX_PAGE_SIZE, RepoSpec};
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// Which output dimensions a collector produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
#[expect(clippy::struct_excessive_bools, reason = "independent feature toggles")]
pub struct Dimensions {
    /// `label_count` gauges keyed by (label, state)
    pub label_counts: bool,

    /// `labels_count` gauges keyed by (selector, state)
    pub selector_counts: bool,

    /// Time-to-close histograms per label and per selector
    pub close_duration_histograms: bool,

    /// Raw open/close timestamp gauges for every closed issue
    pub issue_timestamps: bool,
}

impl Default for Dimensions {
    fn default() -> Self {
        Self {
            label_counts: true,
            selector_counts: true,
            close_duration_histograms: true,
            issue_timestamps: false,
        }
    }
}

/// Exponential bucket boundaries of the time-to-close histograms, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct BucketLayout {
    pub start: f64,
    pub factor: f64,
    pub count: usize,
}

impl Default for BucketLayout {
    fn default() -> Self {
        Self {
            start: 86_400.0,
            factor: 2.0,
            count: 10,
        }
    }
}

impl BucketLayout {
    /// Upper bounds of the finite buckets; `+Inf` is implied.
    pub fn bounds(&self) -> Result<Vec<f64>, Error> {
        prometheus::exponential_buckets(self.start, self.factor, self.count)
            .map_err(|e| Error::Config(format!("invalid histogram buckets: {e}")))
    }
}

/// What to do with a closed issue whose close time precedes its creation time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NegativeDurationPolicy {
    /// Observe the negative value as-is
    #[default]
    Record,

    /// Observe zero instead
    Clamp,

    /// Skip the observation
    Drop,
}

impl NegativeDurationPolicy {
    /// Apply the policy, returning the value to observe if any.
    #[must_use]
    pub fn apply(self, seconds: f64) -> Option<f64> {
        if seconds >= 0.0 {
            return Some(seconds);
        }

        match self {
            Self::Record => Some(seconds),
            Self::Clamp => Some(0.0),
            Self::Drop => None,
        }
    }
}

/// Validated, immutable inputs of an [`IssueCollector`](super::IssueCollector).
#[derive(Debug, Clone)]
pub struct CollectorSettings {
    repo: RepoSpec,
    selectors: Vec<LabelSelector>,
    dimensions: Dimensions,
    page_size: u8,
    lookback: Option<TimeDelta>,
    negative_durations: NegativeDurationPolicy,
}

impl CollectorSettings {
    pub fn new(repo: RepoSpec, selectors: Vec<LabelSelector>) -> Result<Self, Error> {
        let mut seen = HashSet::default();
        for selector in &selectors {
            if !seen.insert(selector.as_str()) {
                return Err(Error::Config(format!("label selector '{selector}' is configured more than once")));
            }
        }

        Ok(Self {
            repo,
            selectors,
            dimensions: Dimensions::default(),
            page_size: MAX_PAGE_SIZE,
            lookback: None,
            negative_durations: NegativeDurationPolicy::default(),
        })
    }

    #[must_use]
    pub const fn with_dimensions(mut self, dimensions: Dimensions) -> Self {
        self.dimensions = dimensions;
        self
    }

    pub fn with_page_size(mut self, page_size: u8) -> Result<Self, Error> {
        if page_size == 0 || page_size > MAX_PAGE_SIZE {
            return Err(Error::Config(format!("page size must be between 1 and {MAX_PAGE_SIZE}, got {page_size}")));
        }

        self.page_size = page_size;
        Ok(self)
    }

    pub fn with_lookback(mut self, lookback: Option<core::time::Duration>) -> Result<Self, Error> {
        self.lookback = lookback
            .map(|d| TimeDelta::from_std(d).map_err(|e| Error::Config(format!("issue lookback is out of range: {e}"))))
            .transpose()?;
        Ok(self)
    }

    #[must_use]
    pub const fn with_negative_durations(mut self, policy: NegativeDurationPolicy) -> Self {
        self.negative_durations = policy;
        self
    }

    #[must_use]
    pub const fn repo(&self) -> &RepoSpec {
        &self.repo
    }

    #[must_use]
    pub fn selectors(&self) -> &[LabelSelector] {
        &self.selectors
    }

    #[must_use]
    pub const fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    #[must_use]
    pub const fn page_size(&self) -> u8 {
        self.page_size
    }

    #[must_use]
    pub const fn lookback(&self) -> Option<TimeDelta> {
        self.lookback
    }

    #[must_use]
    pub const fn negative_durations(&self) -> NegativeDurationPolicy {
        self.negative_durations
    }

    /// The `since` cutoff for a scrape starting at `now`, if a lookback is configured.
    #[must_use]
    pub fn since(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.lookback.and_then(|lookback| now.checked_sub_signed(lookback))
    }
}
