use super::{CollectorSettings, Dimension, HistogramRegistry, IssueTimestamps, Tallies, TimestampKey};
use super::{classifier, is_relevant};
use crate::issues::{Issue, IssueState};

const LOG_TARGET: &str = "aggregator";

/// Folds the issues of one scrape into tallies and the shared histogram registry.
///
/// The tallies are owned by the aggregator until [`Aggregator::finish`] hands them over; the
/// histogram observations go straight to the registry and survive a failed scrape.
#[derive(Debug)]
pub struct Aggregator<'a> {
    settings: &'a CollectorSettings,
    histograms: &'a HistogramRegistry,
    tallies: Tallies,
    observed: u64,
}

/// Time to close plus the raw timestamps of a closed issue.
struct Closure {
    /// After the negative-duration policy; `None` when the policy drops it
    seconds: Option<f64>,
    /// Closed before it was created
    negative: bool,
    timestamps: IssueTimestamps,
}

impl<'a> Aggregator<'a> {
    #[must_use]
    pub fn new(settings: &'a CollectorSettings, histograms: &'a HistogramRegistry) -> Self {
        Self {
            settings,
            histograms,
            tallies: Tallies::default(),
            observed: 0,
        }
    }

    /// Number of relevant issues folded in so far.
    #[must_use]
    pub const fn observed(&self) -> u64 {
        self.observed
    }

    pub fn observe_all<'i>(&mut self, issues: impl IntoIterator<Item = &'i Issue>) {
        for issue in issues {
            self.observe(issue);
        }
    }

    pub fn observe(&mut self, issue: &Issue) {
        if !is_relevant(issue) {
            log::trace!(target: LOG_TARGET, "skipping pull request #{}", issue.number);
            return;
        }

        self.observed += 1;
        let settings = self.settings;
        let dims = settings.dimensions();
        let closure = self.closure(issue);
        let mut recorded = false;

        for label in issue.distinct_label_names() {
            if dims.label_counts {
                self.tallies.count_label(label, issue.state);
            }

            if let Some(closure) = &closure {
                recorded |= self.record_closure(Dimension::Label, label, issue.number, closure);
            }
        }

        for selector in settings.selectors() {
            if !selector.matches(issue) {
                continue;
            }

            if dims.selector_counts {
                self.tallies.count_selector(selector.as_str(), issue.state);
            }

            if let Some(closure) = &closure {
                recorded |= self.record_closure(Dimension::Selector, selector.as_str(), issue.number, closure);
            }
        }

        self.tallies.count_state(issue.state);

        if let Some(closure) = closure.filter(|closure| closure.negative) {
            let policy = settings.negative_durations();
            let seconds = (closure.timestamps.opened - closure.timestamps.closed).num_seconds();

            // repeat scrapes see the same issue again
            if recorded {
                log::warn!(
                    target: LOG_TARGET,
                    "issue #{} was closed {seconds}s before it was created, applying policy '{policy:?}'",
                    issue.number
                );
            } else {
                log::debug!(
                    target: LOG_TARGET,
                    "issue #{} was closed {seconds}s before it was created, nothing new recorded (policy '{policy:?}')",
                    issue.number
                );
            }
        }
    }

    /// Hand over the tallies of this scrape.
    #[must_use]
    pub fn finish(self) -> Tallies {
        self.tallies
    }

    fn closure(&self, issue: &Issue) -> Option<Closure> {
        if issue.state != IssueState::Closed {
            return None;
        }

        let seconds = match classifier::seconds_to_close(issue) {
            Ok(seconds) => seconds,
            Err(e) => {
                log::warn!(target: LOG_TARGET, "not recording time to close: {e}");
                return None;
            }
        };

        let negative = seconds < 0.0;
        let seconds = if negative {
            self.settings.negative_durations().apply(seconds)
        } else {
            Some(seconds)
        };

        Some(Closure {
            seconds,
            negative,
            timestamps: IssueTimestamps {
                opened: issue.created_at,
                closed: issue.closed_at?,
            },
        })
    }

    /// Returns whether the registry took a new observation.
    fn record_closure(&mut self, dimension: Dimension, name: &str, number: u64, closure: &Closure) -> bool {
        let dims = self.settings.dimensions();
        let mut recorded = false;

        if dims.close_duration_histograms
            && let Some(seconds) = closure.seconds
        {
            recorded = self.histograms.observe(dimension, name, number, seconds);
        }

        if dims.issue_timestamps {
            let key = TimestampKey {
                name: name.to_owned(),
                number,
            };
            let timestamps = match dimension {
                Dimension::Label => &mut self.tallies.label_timestamps,
                Dimension::Selector => &mut self.tallies.selector_timestamps,
            };
            let _ = timestamps.insert(key, closure.timestamps);
        }

        recorded
    }
}
