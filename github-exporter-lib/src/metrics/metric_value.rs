use prometheus::proto;

/// Value of one sample. Histograms are taken as-is from the registry that accumulated them.
#[derive(Debug, Clone, PartialEq)]
pub enum SampleValue {
    Gauge(f64),
    Histogram(proto::Histogram),
}
