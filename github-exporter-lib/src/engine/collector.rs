use super::{Aggregator, CollectorSettings, Error, HistogramRegistry, for_each_page, render};
use crate::issues::IssueSource;
use crate::metrics::{MetricDef, MetricSample, describe};
use chrono::Utc;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

const LOG_TARGET: &str = " collector";

/// The outcome of one successful scrape.
#[derive(Debug, Clone)]
pub struct Scrape {
    pub samples: Vec<MetricSample>,
    /// Number of pages fetched
    pub pages: u32,
    /// Number of relevant issues aggregated, pull requests excluded
    pub issues: u64,
}

/// Collects the issue metrics of one repository on demand.
///
/// Each [`collect`](Self::collect) recomputes every gauge from a fresh pull of the repository's
/// issues. The time-to-close histograms live in a [`HistogramRegistry`] shared across scrapes.
#[derive(Debug)]
pub struct IssueCollector<S> {
    source: S,
    settings: CollectorSettings,
    histograms: Arc<HistogramRegistry>,
}

impl<S: IssueSource> IssueCollector<S> {
    #[must_use]
    pub fn new(source: S, settings: CollectorSettings, histograms: Arc<HistogramRegistry>) -> Self {
        if settings.dimensions().issue_timestamps && settings.lookback().is_some() {
            log::warn!(
                target: LOG_TARGET,
                "issue timestamps are enabled together with an issue lookback; issues closed before the lookback window will not be reported"
            );
        }

        Self {
            source,
            settings,
            histograms,
        }
    }

    #[must_use]
    pub const fn settings(&self) -> &CollectorSettings {
        &self.settings
    }

    #[must_use]
    pub const fn histograms(&self) -> &Arc<HistogramRegistry> {
        &self.histograms
    }

    /// Declarations of every metric [`collect`](Self::collect) may emit.
    #[must_use]
    pub fn describe(&self) -> Vec<&'static MetricDef> {
        describe(&self.settings.dimensions()).collect()
    }

    /// Pull every page of issues, aggregate them and render the result.
    ///
    /// On failure or cancellation no samples are produced. Histogram observations made for
    /// pages that were already folded in are kept.
    pub async fn collect(&self, cancel: &CancellationToken) -> Result<Scrape, Error> {
        let repo = self.settings.repo();
        let since = self.settings.since(Utc::now());
        let mut aggregator = Aggregator::new(&self.settings, &self.histograms);

        log::debug!(target: LOG_TARGET, "collecting issues of {repo}");

        let pages = for_each_page(&self.source, repo, self.settings.page_size(), since, cancel, |issues| {
            aggregator.observe_all(&issues);
            Ok(())
        })
        .await?;

        let issues = aggregator.observed();
        let tallies = aggregator.finish();
        let samples = render(&self.settings, &tallies, self.histograms.snapshot());

        log::debug!(target: LOG_TARGET, "rendered {} samples from {issues} issues in {pages} page(s)", samples.len());

        Ok(Scrape { samples, pages, issues })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_support::{ScriptedSource, StalledSource, closed_issue, open_issue, page, pull_request, server_error};
    use crate::engine::{Dimension, Dimensions, LabelSelector};
    use crate::issues::RepoSpec;
    use crate::metrics::{METRIC_DEFINITIONS, encode};
    use core::time::Duration;

    fn settings() -> CollectorSettings {
        CollectorSettings::new(RepoSpec::new("o", "r").unwrap(), vec![LabelSelector::parse("bug,urgent").unwrap()]).unwrap()
    }

    fn registry() -> Arc<HistogramRegistry> {
        Arc::new(HistogramRegistry::new(vec![86_400.0, 172_800.0]).unwrap())
    }

    fn gauge(scrape: &Scrape, name: &str, labels: &[(&str, &str)]) -> Option<f64> {
        scrape
            .samples
            .iter()
            .find(|s| s.name() == name && labels.iter().all(|(k, v)| s.label(k) == Some(*v)))
            .and_then(MetricSample::gauge_value)
    }

    #[tokio::test]
    async fn test_scenario() {
        let source = ScriptedSource::new([Ok(page(
            vec![
                open_issue(1, &["bug"]),
                closed_issue(2, &["bug", "urgent"], 86_400),
                pull_request(3, &["bug"]),
            ],
            None,
        ))]);
        let collector = IssueCollector::new(source, settings(), registry());

        let scrape = collector.collect(&CancellationToken::new()).await.unwrap();

        assert_eq!(scrape.pages, 1);
        assert_eq!(scrape.issues, 2);

        let label_count = "github_exporter_issue_label_count";
        assert_eq!(gauge(&scrape, label_count, &[("label", "bug"), ("state", "open")]), Some(1.0));
        assert_eq!(gauge(&scrape, label_count, &[("label", "bug"), ("state", "closed")]), Some(1.0));
        assert_eq!(gauge(&scrape, label_count, &[("label", "urgent"), ("state", "closed")]), Some(1.0));
        assert_eq!(gauge(&scrape, label_count, &[("label", "urgent"), ("state", "open")]), None);
        assert_eq!(
            gauge(&scrape, "github_exporter_issue_labels_count", &[("labels", "bug,urgent"), ("state", "closed")]),
            Some(1.0)
        );
        assert_eq!(gauge(&scrape, "github_exporter_issue_states_count", &[("state", "open")]), Some(1.0));
        assert_eq!(gauge(&scrape, "github_exporter_issue_states_count", &[("state", "closed")]), Some(1.0));

        let bug = collector.histograms().get(Dimension::Label, "bug").unwrap();
        assert_eq!(bug.get_sample_count(), 1);
        assert!((bug.get_sample_sum() - 86_400.0).abs() < f64::EPSILON);

        let text = encode(&scrape.samples).unwrap();
        assert!(text.contains(r#"github_exporter_issue_label_close_duration_seconds_bucket{org="o",repo="r",label="bug",le="86400"} 1"#));
    }

    #[tokio::test]
    async fn test_failure_on_page_two_emits_nothing_and_keeps_page_one_histograms() {
        let source = ScriptedSource::new([
            Ok(page(vec![closed_issue(1, &["bug"], 3_600)], Some(2))),
            Err(server_error(2)),
            Ok(page(vec![closed_issue(3, &["bug"], 7_200)], None)),
        ]);
        let collector = IssueCollector::new(source, settings(), registry());

        let result = collector.collect(&CancellationToken::new()).await;

        assert!(matches!(result, Err(Error::Fetch { page: 2, .. })));
        let bug = collector.histograms().get(Dimension::Label, "bug").unwrap();
        assert_eq!(bug.get_sample_count(), 1);
        assert!((bug.get_sample_sum() - 3_600.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_repeated_scrapes_are_idempotent() {
        let pages = || {
            [
                Ok(page(vec![open_issue(1, &["bug"]), closed_issue(2, &["bug"], 100)], Some(2))),
                Ok(page(vec![closed_issue(3, &["bug", "urgent"], 200)], None)),
            ]
        };
        let histograms = registry();

        let first = IssueCollector::new(ScriptedSource::new(pages()), settings(), Arc::clone(&histograms));
        let second = IssueCollector::new(ScriptedSource::new(pages()), settings(), Arc::clone(&histograms));

        let mut a = first.collect(&CancellationToken::new()).await.unwrap().samples;
        let mut b = second.collect(&CancellationToken::new()).await.unwrap().samples;

        let key = |s: &MetricSample| (s.name(), s.label_values.clone());
        a.sort_by_key(key);
        b.sort_by_key(key);
        assert_eq!(a, b);
        assert_eq!(histograms.get(Dimension::Label, "bug").unwrap().get_sample_count(), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_overlapping_scrapes_count_each_closed_issue_once() {
        let histograms = registry();
        let issues: Vec<_> = (1..=50).map(|number| closed_issue(number, &["bug"], 10)).collect();

        let scrapes: Vec<_> = (0..16)
            .map(|_| {
                let source = ScriptedSource::new([Ok(page(issues.clone(), None))]);
                let collector = IssueCollector::new(source, settings(), Arc::clone(&histograms));
                tokio::spawn(async move { collector.collect(&CancellationToken::new()).await.map(|scrape| scrape.issues) })
            })
            .collect();

        for scrape in scrapes {
            assert_eq!(scrape.await.unwrap().unwrap(), 50);
        }

        let bug = histograms.get(Dimension::Label, "bug").unwrap();
        assert_eq!(bug.get_sample_count(), 50);
        assert!((bug.get_sample_sum() - 500.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_cancelled_scrape() {
        let collector = IssueCollector::new(StalledSource, settings(), registry());
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        let _ = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            trigger.cancel();
        });

        assert!(matches!(collector.collect(&cancel).await, Err(Error::Cancelled)));
    }

    #[tokio::test]
    async fn test_lookback_sets_since() {
        let source = ScriptedSource::new([Ok(page(Vec::new(), None))]);
        let settings = settings().with_lookback(Some(Duration::from_secs(3_600))).unwrap();
        let collector = IssueCollector::new(source, settings, registry());

        let before = Utc::now();
        let _ = collector.collect(&CancellationToken::new()).await.unwrap();

        let since = collector.source.requested_since()[0].unwrap();
        assert!(since <= before - chrono::Duration::seconds(3_599));
        assert!(since >= before - chrono::Duration::seconds(3_700));
    }

    #[test]
    fn test_describe_covers_every_declared_metric_when_all_dimensions_enabled() {
        let settings = settings().with_dimensions(Dimensions {
            issue_timestamps: true,
            ..Dimensions::default()
        });
        let collector = IssueCollector::new(ScriptedSource::default(), settings, registry());

        assert_eq!(collector.describe().len(), METRIC_DEFINITIONS.len());
    }

    #[tokio::test]
    async fn test_collected_samples_are_described() {
        let source = ScriptedSource::new([Ok(page(vec![closed_issue(1, &["bug", "urgent"], 10)], None))]);
        let collector = IssueCollector::new(source, settings(), registry());
        let described = collector.describe();

        let scrape = collector.collect(&CancellationToken::new()).await.unwrap();

        for sample in &scrape.samples {
            assert!(described.iter().any(|def| core::ptr::eq(*def, sample.def)), "{}", sample.name());
        }
    }
}
