use super::MetricKind;
use crate::engine::Dimensions;

pub const LABEL_ORG: &str = "org";
pub const LABEL_REPO: &str = "repo";
pub const LABEL_LABEL: &str = "label";
pub const LABEL_LABELS: &str = "labels";
pub const LABEL_STATE: &str = "state";
pub const LABEL_NUMBER: &str = "number";

/// Static declaration of a metric: its name, help text, kind and label schema.
#[derive(Debug)]
pub struct MetricDef {
    /// Fully qualified name, `<namespace>_<subsystem>_<metric>`
    pub name: &'static str,
    pub help: &'static str,
    pub kind: MetricKind,
    /// Label names in the order sample values are given
    pub labels: &'static [&'static str],
    /// Whether a collector with these dimensions produces this metric
    pub enabled: fn(&Dimensions) -> bool,
}

// Names are unique across the table, so they identify a declaration.
impl PartialEq for MetricDef {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

macro_rules! metric_def {
    ($name:literal, $help:expr, $kind:ident, [$($label:expr),*], $enabled:expr) => {
        MetricDef {
            name: concat!("github_exporter_issue_", $name),
            help: $help,
            kind: MetricKind::$kind,
            labels: &[$($label),*],
            enabled: $enabled,
        }
    };
}

pub static LABEL_COUNT: MetricDef = metric_def!(
    "label_count",
    "Github issues per label.",
    Gauge,
    [LABEL_ORG, LABEL_REPO, LABEL_LABEL, LABEL_STATE],
    |dims| dims.label_counts
);

pub static LABELS_COUNT: MetricDef = metric_def!(
    "labels_count",
    "Github issues per combined labels.",
    Gauge,
    [LABEL_ORG, LABEL_REPO, LABEL_LABELS, LABEL_STATE],
    |dims| dims.selector_counts
);

pub static STATES_COUNT: MetricDef = metric_def!(
    "states_count",
    "Github issue states.",
    Gauge,
    [LABEL_ORG, LABEL_REPO, LABEL_STATE],
    |_| true
);

pub static OPEN_LABEL_SECONDS: MetricDef = metric_def!(
    "open_label_seconds",
    "Timestamps of open issues per label.",
    Gauge,
    [LABEL_ORG, LABEL_REPO, LABEL_LABEL, LABEL_NUMBER],
    |dims| dims.issue_timestamps
);

pub static CLOSED_LABEL_SECONDS: MetricDef = metric_def!(
    "closed_label_seconds",
    "Timestamps of closed issues per label.",
    Gauge,
    [LABEL_ORG, LABEL_REPO, LABEL_LABEL, LABEL_NUMBER],
    |dims| dims.issue_timestamps
);

pub static OPEN_LABELS_SECONDS: MetricDef = metric_def!(
    "open_labels_seconds",
    "Timestamps of open issues per combined labels.",
    Gauge,
    [LABEL_ORG, LABEL_REPO, LABEL_LABELS, LABEL_NUMBER],
    |dims| dims.issue_timestamps
);

pub static CLOSED_LABELS_SECONDS: MetricDef = metric_def!(
    "closed_labels_seconds",
    "Timestamps of closed issues per combined labels.",
    Gauge,
    [LABEL_ORG, LABEL_REPO, LABEL_LABELS, LABEL_NUMBER],
    |dims| dims.issue_timestamps
);

pub static LABEL_CLOSE_DURATION: MetricDef = metric_def!(
    "label_close_duration_seconds",
    "Time from creation to close of Github issues per label.",
    Histogram,
    [LABEL_ORG, LABEL_REPO, LABEL_LABEL],
    |dims| dims.close_duration_histograms
);

pub static LABELS_CLOSE_DURATION: MetricDef = metric_def!(
    "labels_close_duration_seconds",
    "Time from creation to close of Github issues per combined labels.",
    Histogram,
    [LABEL_ORG, LABEL_REPO, LABEL_LABELS],
    |dims| dims.close_duration_histograms
);

pub static METRIC_DEFINITIONS: [&MetricDef; 9] = [
    &LABEL_COUNT,
    &LABELS_COUNT,
    &STATES_COUNT,
    &OPEN_LABEL_SECONDS,
    &CLOSED_LABEL_SECONDS,
    &OPEN_LABELS_SECONDS,
    &CLOSED_LABELS_SECONDS,
    &LABEL_CLOSE_DURATION,
    &LABELS_CLOSE_DURATION,
];

/// Declarations of every metric a collector with these dimensions may emit.
pub fn describe(dimensions: &Dimensions) -> impl Iterator<Item = &'static MetricDef> + '_ {
    METRIC_DEFINITIONS.iter().copied().filter(|def| (def.enabled)(dimensions))
}
