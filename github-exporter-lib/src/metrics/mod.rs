//! Metric declarations, rendered samples and their Prometheus exposition
//!
//! Every metric the exporter can emit is statically declared as a [`MetricDef`] in
//! `metric_def.rs`: a fully qualified `github_exporter_issue_*` name, help text, kind and the
//! ordered list of label names. The engine renders a scrape into [`MetricSample`]s that point at
//! those declarations, and [`encode`] groups the samples into families and writes them in the
//! Prometheus text format.
//!
//! The declarations double as the `describe` half of the collector contract: they carry no
//! values, and every sample's label values are checked against them at encoding time.

mod exposition;
mod metric;
mod metric_def;
mod metric_kind;
mod metric_value;

pub use exposition::{CONTENT_TYPE, encode, families};
pub use metric::MetricSample;
pub use metric_def::{
    CLOSED_LABEL_SECONDS, CLOSED_LABELS_SECONDS, LABEL_CLOSE_DURATION, LABEL_COUNT, LABELS_CLOSE_DURATION, LABELS_COUNT,
    LABEL_LABEL, LABEL_LABELS, METRIC_DEFINITIONS, MetricDef, OPEN_LABEL_SECONDS, OPEN_LABELS_SECONDS, STATES_COUNT, describe,
};
pub use metric_kind::MetricKind;
pub use metric_value::SampleValue;
