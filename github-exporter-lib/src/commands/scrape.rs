use super::Host;
use super::common::{CommonArgs, build_collector};
use crate::Result;
use crate::engine::IssueCollector;
use crate::issues::IssueSource;
use crate::metrics::encode;
use clap::Parser;
use core::time::Duration;
use ohno::{IntoAppError, app_err};
use std::io::Write;
use tokio_util::sync::CancellationToken;

const LOG_TARGET: &str = "    scrape";

#[derive(Parser, Debug)]
pub struct ScrapeArgs {
    #[command(flatten)]
    pub common: CommonArgs,
}

/// Run one collection and print the exposition text, as a scrape of `/metrics` would return it.
pub async fn scrape_once<H: Host>(host: &mut H, args: &ScrapeArgs) -> Result<()> {
    let (config, collector) = build_collector(&args.common)?;
    write_scrape(host, &collector, config.server.scrape_timeout).await
}

pub(crate) async fn write_scrape<H: Host, S: IssueSource>(host: &mut H, collector: &IssueCollector<S>, timeout: Duration) -> Result<()> {
    let cancel = CancellationToken::new();
    let scrape = tokio::time::timeout(timeout, collector.collect(&cancel))
        .await
        .map_err(|_elapsed| app_err!("scrape timed out after {timeout:?}"))?
        .into_app_err("scrape failed")?;

    log::info!(
        target: LOG_TARGET,
        "collected {} samples for {} issues from {} page(s)",
        scrape.samples.len(),
        scrape.issues,
        scrape.pages
    );

    let text = encode(&scrape.samples)?;
    host.output().write_all(text.as_bytes()).into_app_err("writing metrics")?;
    Ok(())
}
