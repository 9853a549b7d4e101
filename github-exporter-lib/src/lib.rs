#![doc(hidden)]
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Core library for github-exporter
//!
//! This library consolidates all functionality for the github-exporter tool, which pulls the
//! issues of a GitHub repository on every Prometheus scrape and exposes label, state and
//! time-to-close metrics for them.
//!
//! # Module Organization
//!
//! - [`commands`]: Command-line interface and orchestration
//! - [`issues`]: Issue model and the GitHub issue source
//! - [`engine`]: Pagination, classification, aggregation and snapshot rendering
//! - [`metrics`]: Metric declarations, samples and Prometheus text exposition
//! - [`server`]: HTTP scrape endpoint

pub type Result<T, E = ohno::AppError> = core::result::Result<T, E>;

pub type HashMap<K, V> = std::collections::HashMap<K, V, rustc_hash::FxBuildHasher>;
pub type HashSet<T> = std::collections::HashSet<T, rustc_hash::FxBuildHasher>;

#[cfg(any(debug_assertions, test))]
pub mod commands;
#[cfg(not(any(debug_assertions, test)))]
mod commands;

#[cfg(any(debug_assertions, test))]
pub mod engine;
#[cfg(not(any(debug_assertions, test)))]
mod engine;

#[cfg(any(debug_assertions, test))]
pub mod issues;
#[cfg(not(any(debug_assertions, test)))]
mod issues;

#[cfg(any(debug_assertions, test))]
pub mod metrics;
#[cfg(not(any(debug_assertions, test)))]
mod metrics;

#[cfg(any(debug_assertions, test))]
pub mod server;
#[cfg(not(any(debug_assertions, test)))]
mod server;

pub use crate::commands::{Host, run};
