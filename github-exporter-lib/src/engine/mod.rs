//! The aggregation engine
//!
//! A scrape walks the issue pages of one repository ([`paginator`]), classifies each issue
//! ([`classifier`]), folds it into scrape-local tallies and the long-lived
//! [`HistogramRegistry`] ([`aggregator`]), and finally turns the result into metric samples
//! ([`render`]). [`IssueCollector`] ties these together behind `describe` and `collect`.

mod aggregator;
mod classifier;
mod collector;
mod error;
mod histogram;
mod paginator;
mod render;
mod settings;
mod tally;

#[cfg(test)]
pub(crate) mod test_support;

pub use aggregator::Aggregator;
pub use classifier::{LabelSelector, SELECTOR_SEPARATOR, is_relevant, seconds_to_close};
pub use collector::{IssueCollector, Scrape};
pub use error::{Error, error_chain};
pub use histogram::{Dimension, HistogramRegistry, SeriesKey};
pub use paginator::{Paginator, fetch_all, for_each_page};
pub use render::render;
pub use settings::{BucketLayout, CollectorSettings, Dimensions, NegativeDurationPolicy};
pub use tally::{IssueTimestamps, Tallies, TallyKey, TimestampKey};
