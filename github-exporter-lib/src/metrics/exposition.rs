//! Prometheus text exposition of rendered samples.

use super::{MetricKind, MetricSample, SampleValue};
use crate::HashSet;
use ohno::{IntoAppError, app_err, bail};
use prometheus::proto::{Gauge, LabelPair, Metric, MetricFamily};
use prometheus::{Encoder, TextEncoder};
use std::collections::BTreeMap;

/// Content type of the text produced by [`encode`].
pub const CONTENT_TYPE: &str = prometheus::TEXT_FORMAT;

/// Group samples into metric families, ordered by metric name.
///
/// Fails if a sample's label values don't line up with its declaration, if its value doesn't
/// match the declared kind, or if two samples share the same name and label values.
pub fn families(samples: &[MetricSample]) -> crate::Result<Vec<MetricFamily>> {
    let mut by_name: BTreeMap<&str, MetricFamily> = BTreeMap::new();
    let mut identities = HashSet::default();

    for sample in samples {
        let def = sample.def;

        if sample.label_values.len() != def.labels.len() {
            bail!(
                "sample of '{}' has {} label values but the metric declares {:?}",
                def.name,
                sample.label_values.len(),
                def.labels
            );
        }

        if !identities.insert((def.name, sample.label_values.as_slice())) {
            bail!("duplicate sample of '{}' with labels {:?}", def.name, sample.label_values);
        }

        let mut metric = Metric::default();
        for (name, value) in def.labels.iter().zip(&sample.label_values) {
            let mut pair = LabelPair::default();
            pair.set_name((*name).to_owned());
            pair.set_value(value.clone());
            metric.mut_label().push(pair);
        }

        match (&sample.value, def.kind) {
            (SampleValue::Gauge(value), MetricKind::Gauge) => {
                let mut gauge = Gauge::default();
                gauge.set_value(*value);
                metric.set_gauge(gauge);
            }
            (SampleValue::Histogram(histogram), MetricKind::Histogram) => {
                metric.set_histogram(histogram.clone());
            }
            (_, kind) => bail!("sample of '{}' does not hold a {kind} value", def.name),
        }

        let family = by_name.entry(def.name).or_insert_with(|| {
            let mut family = MetricFamily::default();
            family.set_name(def.name.to_owned());
            family.set_help(def.help.to_owned());
            family.set_field_type(def.kind.proto_type());
            family
        });
        family.mut_metric().push(metric);
    }

    Ok(by_name.into_values().collect())
}

/// Render samples in the Prometheus text format.
pub fn encode(samples: &[MetricSample]) -> crate::Result<String> {
    let families = families(samples)?;

    let mut buffer = Vec::new();
    TextEncoder::new()
        .encode(&families, &mut buffer)
        .map_err(|e| app_err!("unable to encode metrics in the Prometheus text format: {e}"))?;

    String::from_utf8(buffer).into_app_err("Prometheus text encoder produced invalid UTF-8")
}
