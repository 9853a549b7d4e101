//! HTTP scrape endpoint
//!
//! `GET /metrics` runs one collection under the configured scrape timeout and answers with the
//! Prometheus text exposition. The collection is cancelled when the request future is dropped,
//! which happens when the client disconnects.

use crate::Result;
use crate::engine::{Error, IssueCollector, error_chain};
use crate::issues::IssueSource;
use crate::metrics::{CONTENT_TYPE, encode};
use axum::Router;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use core::time::Duration;
use ohno::IntoAppError;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

const LOG_TARGET: &str = "    server";

#[derive(Debug)]
pub struct AppState<S> {
    collector: Arc<IssueCollector<S>>,
    scrape_timeout: Duration,
}

impl<S> AppState<S> {
    #[must_use]
    pub const fn new(collector: Arc<IssueCollector<S>>, scrape_timeout: Duration) -> Self {
        Self { collector, scrape_timeout }
    }
}

// Derived Clone would require `S: Clone`.
impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            collector: Arc::clone(&self.collector),
            scrape_timeout: self.scrape_timeout,
        }
    }
}

pub fn router<S: IssueSource + 'static>(state: AppState<S>) -> Router {
    Router::new()
        .route("/metrics", get(metrics::<S>))
        .route("/healthz", get(healthz))
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

async fn metrics<S: IssueSource + 'static>(State(state): State<AppState<S>>) -> Response {
    let started = Instant::now();
    let cancel = CancellationToken::new();
    let _cancel_on_drop = cancel.clone().drop_guard();

    let outcome = tokio::time::timeout(state.scrape_timeout, state.collector.collect(&cancel)).await;

    let scrape = match outcome {
        Ok(Ok(scrape)) => scrape,
        Ok(Err(e)) => {
            log::error!(target: LOG_TARGET, "scrape failed: {}", error_chain(&e));
            let status = match &e {
                Error::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };
            return (status, error_chain(&e)).into_response();
        }
        Err(_) => {
            cancel.cancel();
            log::error!(target: LOG_TARGET, "scrape timed out after {:?}", state.scrape_timeout);
            return (StatusCode::GATEWAY_TIMEOUT, format!("scrape timed out after {:?}", state.scrape_timeout)).into_response();
        }
    };

    match encode(&scrape.samples) {
        Ok(body) => {
            log::info!(
                target: LOG_TARGET,
                "served {} samples for {} issues from {} page(s) in {:.2?}",
                scrape.samples.len(),
                scrape.issues,
                scrape.pages,
                started.elapsed()
            );
            ([(header::CONTENT_TYPE, CONTENT_TYPE)], body).into_response()
        }
        Err(e) => {
            log::error!(target: LOG_TARGET, "could not encode metrics: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

/// Serve until `shutdown` resolves.
pub async fn serve<S, F>(listener: TcpListener, state: AppState<S>, shutdown: F) -> Result<()>
where
    S: IssueSource + 'static,
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr().into_app_err("could not determine listening address")?;
    log::info!(target: LOG_TARGET, "serving metrics on http://{addr}/metrics");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
        .into_app_err("HTTP server failed")
}

/// Resolves on Ctrl+C, or on SIGTERM on Unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::warn!(target: LOG_TARGET, "could not listen for Ctrl+C: {e}");
            core::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                let _ = signal.recv().await;
            }
            Err(e) => {
                log::warn!(target: LOG_TARGET, "could not listen for SIGTERM: {e}");
                core::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = core::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    log::info!(target: LOG_TARGET, "shutting down");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_support::{ScriptedSource, StalledSource, closed_issue, open_issue, page, server_error};
    use crate::engine::{CollectorSettings, HistogramRegistry, LabelSelector};
    use crate::issues::RepoSpec;

    fn collector<S: IssueSource>(source: S) -> Arc<IssueCollector<S>> {
        let settings =
            CollectorSettings::new(RepoSpec::new("o", "r").unwrap(), vec![LabelSelector::parse("bug,urgent").unwrap()]).unwrap();
        Arc::new(IssueCollector::new(source, settings, Arc::new(HistogramRegistry::new(vec![60.0, 3_600.0]).unwrap())))
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_metrics_success() {
        let source = ScriptedSource::new([Ok(page(vec![open_issue(1, &["bug"]), closed_issue(2, &["bug", "urgent"], 30)], None))]);
        let state = AppState::new(collector(source), Duration::from_secs(5));

        let response = metrics(State(state)).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], CONTENT_TYPE);
        let body = body_text(response).await;
        assert!(body.contains(r#"github_exporter_issue_states_count{org="o",repo="r",state="open"} 1"#));
        assert!(body.contains(r#"github_exporter_issue_labels_count{org="o",repo="r",labels="bug,urgent",state="closed"} 1"#));
    }

    #[tokio::test]
    async fn test_metrics_fetch_failure_is_500_without_metrics() {
        let source = ScriptedSource::new([Ok(page(vec![open_issue(1, &["bug"])], Some(2))), Err(server_error(2))]);
        let state = AppState::new(collector(source), Duration::from_secs(5));

        let response = metrics(State(state)).await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_text(response).await;
        assert!(body.contains("fetching page 2 of issues failed"));
        assert!(!body.contains("github_exporter_issue_"));
    }

    #[tokio::test]
    async fn test_metrics_timeout_is_504() {
        let state = AppState::new(collector(StalledSource), Duration::from_millis(20));

        let response = metrics(State(state)).await;

        assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
    }

    #[tokio::test]
    async fn test_healthz() {
        assert_eq!(healthz().await, "ok");
    }
}
