//! Long-lived time-to-close histograms
//!
//! The registry outlives individual scrapes. Each series remembers which issues it has already
//! observed so that re-reading the same issue history on the next scrape does not count a
//! closed issue twice.

use super::Error;
use crate::metrics::{LABEL_CLOSE_DURATION, LABEL_LABEL, LABEL_LABELS, LABELS_CLOSE_DURATION, MetricDef};
use crate::{HashMap, HashSet};
use prometheus::core::{Collector, Metric};
use prometheus::proto;
use prometheus::{HistogramOpts, HistogramVec};
use std::sync::{Mutex, PoisonError};
use strum::{Display, IntoStaticStr};

const LOG_TARGET: &str = " histogram";

/// Whether a histogram series belongs to a single label or to a selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum Dimension {
    Label,
    Selector,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SeriesKey {
    pub dimension: Dimension,
    pub name: String,
}

/// Time-to-close histograms keyed by dimension and label identifier.
///
/// Observations go to one `HistogramVec` per dimension; all series share the bucket bounds
/// fixed at construction. The lock around the per-series issue sets also serializes
/// observations, so an issue is never counted twice by overlapping scrapes.
#[derive(Debug)]
pub struct HistogramRegistry {
    bounds: Vec<f64>,
    labels: HistogramVec,
    selectors: HistogramVec,
    observed: Mutex<HashMap<SeriesKey, HashSet<u64>>>,
}

fn histogram_vec(def: &MetricDef, label: &str, bounds: &[f64]) -> Result<HistogramVec, Error> {
    let opts = HistogramOpts::new(def.name, def.help).buckets(bounds.to_vec());

    // bucket bounds are only checked when a series is created
    let _ = prometheus::Histogram::with_opts(opts.clone()).map_err(|e| Error::Config(format!("invalid histogram buckets: {e}")))?;

    HistogramVec::new(opts, &[label]).map_err(|e| Error::Config(format!("invalid histogram '{}': {e}", def.name)))
}

impl HistogramRegistry {
    /// `bounds` must be strictly increasing upper bounds of the finite buckets.
    pub fn new(bounds: impl Into<Vec<f64>>) -> Result<Self, Error> {
        let bounds = bounds.into();

        Ok(Self {
            labels: histogram_vec(&LABEL_CLOSE_DURATION, LABEL_LABEL, &bounds)?,
            selectors: histogram_vec(&LABELS_CLOSE_DURATION, LABEL_LABELS, &bounds)?,
            bounds,
            observed: Mutex::default(),
        })
    }

    #[must_use]
    pub fn bounds(&self) -> &[f64] {
        &self.bounds
    }

    const fn vec(&self, dimension: Dimension) -> &HistogramVec {
        match dimension {
            Dimension::Label => &self.labels,
            Dimension::Selector => &self.selectors,
        }
    }

    /// Fold one issue's time to close into a series.
    ///
    /// Returns `false` if the series already holds an observation for this issue.
    pub fn observe(&self, dimension: Dimension, name: &str, issue_number: u64, seconds: f64) -> bool {
        let mut observed = self.observed.lock().unwrap_or_else(PoisonError::into_inner);

        let key = SeriesKey {
            dimension,
            name: name.to_owned(),
        };
        if observed.get(&key).is_some_and(|issues| issues.contains(&issue_number)) {
            return false;
        }

        let histogram = match self.vec(dimension).get_metric_with_label_values(&[name]) {
            Ok(histogram) => histogram,
            Err(e) => {
                log::error!(target: LOG_TARGET, "cannot record time to close for {dimension} '{name}': {e}");
                return false;
            }
        };

        histogram.observe(seconds);
        let _ = observed.entry(key).or_default().insert(issue_number);
        true
    }

    /// Number of series with at least one observation.
    #[must_use]
    pub fn len(&self) -> usize {
        self.observed.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current state of every series, ordered by key.
    #[must_use]
    pub fn snapshot(&self) -> Vec<(SeriesKey, proto::Histogram)> {
        let _observed = self.observed.lock().unwrap_or_else(PoisonError::into_inner);

        let mut series: Vec<_> = [Dimension::Label, Dimension::Selector]
            .into_iter()
            .flat_map(|dimension| {
                self.vec(dimension)
                    .collect()
                    .into_iter()
                    .flat_map(|family| family.get_metric().to_vec())
                    .filter_map(move |metric| {
                        let name = metric.get_label().first()?.get_value().to_owned();
                        Some((SeriesKey { dimension, name }, metric.get_histogram().clone()))
                    })
            })
            .collect();

        series.sort_by(|(a, _), (b, _)| a.cmp(b));
        series
    }

    /// Current state of one series, if it has any observation.
    #[must_use]
    pub fn get(&self, dimension: Dimension, name: &str) -> Option<proto::Histogram> {
        let observed = self.observed.lock().unwrap_or_else(PoisonError::into_inner);

        let key = SeriesKey {
            dimension,
            name: name.to_owned(),
        };
        if !observed.contains_key(&key) {
            return None;
        }

        self.vec(dimension)
            .get_metric_with_label_values(&[name])
            .ok()
            .map(|histogram| histogram.metric().get_histogram().clone())
    }
}
