use super::{CollectorSettings, Dimension, SeriesKey, Tallies};
use crate::metrics::{
    CLOSED_LABEL_SECONDS, CLOSED_LABELS_SECONDS, LABEL_CLOSE_DURATION, LABEL_COUNT, LABELS_CLOSE_DURATION,
    LABELS_COUNT, MetricSample, OPEN_LABEL_SECONDS, OPEN_LABELS_SECONDS, STATES_COUNT,
};
use chrono::{DateTime, Utc};
use prometheus::proto;

/// Turn the tallies of one scrape plus the histogram registry's current series into samples.
///
/// Every sample carries the configured org and repo as its first two label values. The order
/// of the returned samples is unspecified.
#[must_use]
pub fn render(settings: &CollectorSettings, tallies: &Tallies, histograms: Vec<(SeriesKey, proto::Histogram)>) -> Vec<MetricSample> {
    let org = settings.repo().owner();
    let repo = settings.repo().repo();
    let dims = settings.dimensions();

    let with_scope = |rest: &[&str]| -> Vec<String> {
        [org, repo]
            .iter()
            .chain(rest)
            .map(|value| (*value).to_owned())
            .collect()
    };

    let mut samples = Vec::with_capacity(
        tallies.label_counts.len()
            + tallies.selector_counts.len()
            + tallies.state_counts.len()
            + 2 * (tallies.label_timestamps.len() + tallies.selector_timestamps.len())
            + histograms.len(),
    );

    if dims.label_counts {
        for (key, count) in &tallies.label_counts {
            samples.push(MetricSample::gauge(&LABEL_COUNT, with_scope(&[&key.name, key.state.as_str()]), *count));
        }
    }

    if dims.selector_counts {
        for (key, count) in &tallies.selector_counts {
            samples.push(MetricSample::gauge(&LABELS_COUNT, with_scope(&[&key.name, key.state.as_str()]), *count));
        }
    }

    for (state, count) in &tallies.state_counts {
        samples.push(MetricSample::gauge(&STATES_COUNT, with_scope(&[state.as_str()]), *count));
    }

    if dims.issue_timestamps {
        let series = [
            (&tallies.label_timestamps, &OPEN_LABEL_SECONDS, &CLOSED_LABEL_SECONDS),
            (&tallies.selector_timestamps, &OPEN_LABELS_SECONDS, &CLOSED_LABELS_SECONDS),
        ];

        for (timestamps, open_def, closed_def) in series {
            for (key, stamps) in timestamps {
                let number = key.number.to_string();
                samples.push(MetricSample::gauge(open_def, with_scope(&[&key.name, &number]), unix_seconds(stamps.opened)));
                samples.push(MetricSample::gauge(closed_def, with_scope(&[&key.name, &number]), unix_seconds(stamps.closed)));
            }
        }
    }

    if dims.close_duration_histograms {
        for (key, histogram) in histograms {
            let def = match key.dimension {
                Dimension::Label => &LABEL_CLOSE_DURATION,
                Dimension::Selector => &LABELS_CLOSE_DURATION,
            };
            samples.push(MetricSample::histogram(def, with_scope(&[&key.name]), histogram));
        }
    }

    samples
}

#[expect(clippy::cast_precision_loss, reason = "Unix seconds fit in f64")]
fn unix_seconds(time: DateTime<Utc>) -> f64 {
    time.timestamp() as f64
}
