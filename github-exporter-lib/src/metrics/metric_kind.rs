use prometheus::proto::MetricType;
use strum::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "lowercase")]
pub enum MetricKind {
    Gauge,
    Histogram,
}

impl MetricKind {
    #[must_use]
    pub const fn proto_type(self) -> MetricType {
        match self {
            Self::Gauge => MetricType::GAUGE,
            Self::Histogram => MetricType::HISTOGRAM,
        }
    }
}
