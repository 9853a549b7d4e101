//! Setup shared by the commands that talk to GitHub.

use super::config::Config;
use crate::Result;
use crate::engine::IssueCollector;
use crate::issues::Client;
use camino::Utf8PathBuf;
use clap::{Args, ValueEnum};
use std::sync::Arc;

const LOG_TARGET: &str = "    common";

/// Log level for diagnostic output
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// No logging output
    None,

    /// Only error messages
    Error,

    /// Warning and error messages
    Warn,

    /// Info, warning, and error messages
    Info,

    /// Debug, info, warning, and error messages
    Debug,

    /// Trace, debug, info, warning, and error messages
    Trace,
}

/// Arguments shared by the `serve` and `scrape` commands
#[derive(Args, Debug)]
pub struct CommonArgs {
    /// GitHub personal access token
    #[arg(long, value_name = "TOKEN", env = "GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,

    /// Path to configuration file (default is `github-exporter.toml`)
    #[arg(long, short = 'c', value_name = "PATH")]
    pub config: Option<Utf8PathBuf>,

    /// Set the logging level for diagnostic output
    #[arg(long, value_name = "LEVEL", default_value = "info", global = true)]
    pub log_level: LogLevel,
}

/// Initialize `env_logger`; `RUST_LOG` overrides the level given on the command line.
///
/// Only the first call in a process has an effect.
pub fn init_logging(log_level: LogLevel) {
    let level = match log_level {
        LogLevel::None => return,
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
        LogLevel::Trace => "trace",
    };

    let env = env_logger::Env::default().filter_or("RUST_LOG", level);

    let _ = env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(matches!(log_level, LogLevel::Debug | LogLevel::Trace))
        .try_init();
}

/// Load the configuration and build a collector backed by the GitHub client.
pub fn build_collector(args: &CommonArgs) -> Result<(Config, IssueCollector<Client>)> {
    init_logging(args.log_level);

    let config = Config::load(args.config.as_deref())?;
    let settings = config.collector_settings()?;
    let histograms = Arc::new(config.histogram_registry()?);

    if args.github_token.is_none() {
        log::warn!(target: LOG_TARGET, "no GitHub token given, unauthenticated requests are heavily rate limited");
    }

    let client = Client::new(args.github_token.as_deref(), &config.github.api_url, config.github.request_timeout)?;

    log::debug!(
        target: LOG_TARGET,
        "exporting issues of {} from {} with {} label selector(s)",
        settings.repo(),
        client.base_url(),
        settings.selectors().len()
    );

    Ok((config, IssueCollector::new(client, settings, histograms)))
}
