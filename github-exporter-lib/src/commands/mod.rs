//! Command-line interface and orchestration for github-exporter
//!
//! This module implements the CLI commands and wires the configuration, the GitHub client, the
//! collection engine and the HTTP server together.
//!
//! # Commands
//!
//! - **serve**: Load the configuration, build the collector and serve `/metrics` until
//!   interrupted. Every scrape pulls the repository's issues afresh.
//! - **scrape**: Run a single collection and print the Prometheus text exposition
//! - **init**: Generate a default configuration file
//! - **validate**: Check a configuration file and list the metrics it enables
//!
//! The `common` module provides the shared logging setup and collector construction. The
//! GitHub token is only ever taken from the command line or the `GITHUB_TOKEN` environment
//! variable, never from the configuration file.

mod common;
mod config;
mod host;
mod init;
mod run;
mod scrape;
mod serve;
mod validate;

#[cfg(debug_assertions)]
pub use config::Config;

pub use common::{CommonArgs, LogLevel};
pub use host::Host;
pub use init::{InitArgs, init_config};
pub use run::run;
pub use scrape::{ScrapeArgs, scrape_once};
pub use serve::{ServeArgs, serve_metrics};
pub use validate::{ValidateArgs, validate_config};
