use super::{MetricDef, SampleValue};
use prometheus::proto;

/// One rendered sample: a declared metric, its label values and its value.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSample {
    pub def: &'static MetricDef,
    /// Values for `def.labels`, in the same order
    pub label_values: Vec<String>,
    pub value: SampleValue,
}

impl MetricSample {
    #[must_use]
    pub const fn gauge(def: &'static MetricDef, label_values: Vec<String>, value: f64) -> Self {
        Self {
            def,
            label_values,
            value: SampleValue::Gauge(value),
        }
    }

    #[must_use]
    pub const fn histogram(def: &'static MetricDef, label_values: Vec<String>, histogram: proto::Histogram) -> Self {
        Self {
            def,
            label_values,
            value: SampleValue::Histogram(histogram),
        }
    }

    // Convenience accessors for common fields
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.def.name
    }

    /// Value of the named label, if the metric declares it.
    #[must_use]
    pub fn label(&self, name: &str) -> Option<&str> {
        self.def
            .labels
            .iter()
            .position(|label| *label == name)
            .and_then(|i| self.label_values.get(i))
            .map(String::as_str)
    }

    #[must_use]
    pub const fn gauge_value(&self) -> Option<f64> {
        match &self.value {
            SampleValue::Gauge(value) => Some(*value),
            SampleValue::Histogram(_) => None,
        }
    }

    #[must_use]
    pub const fn histogram_value(&self) -> Option<&proto::Histogram> {
        match &self.value {
            SampleValue::Histogram(histogram) => Some(histogram),
            SampleValue::Gauge(_) => None,
        }
    }
}
