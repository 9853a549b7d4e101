use crate::Result;
use crate::engine::{BucketLayout, CollectorSettings, Dimensions, HistogramRegistry, LabelSelector, NegativeDurationPolicy};
use crate::issues::{DEFAULT_API_URL, MAX_PAGE_SIZE, RepoSpec};
use camino::{Utf8Path, Utf8PathBuf};
use core::net::SocketAddr;
use core::time::Duration;
use ohno::{IntoAppError, app_err};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;

/// The default configuration TOML content, embedded from `default_config.toml`
pub const DEFAULT_CONFIG_TOML: &str = include_str!("../../default_config.toml");

/// Configuration file looked up in the current directory when `--config` isn't given
pub const DEFAULT_CONFIG_FILE: &str = "github-exporter.toml";

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub github: GithubConfig,

    #[serde(default)]
    pub collector: CollectorConfig,

    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GithubConfig {
    /// Organization (or user) owning the repository
    pub organization: String,

    /// Repository whose issues are exported
    pub repository: String,

    /// Base URL of the GitHub REST API
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Issues requested per page
    #[serde(default = "default_page_size")]
    pub page_size: u8,

    /// Timeout of a single page request
    #[serde(default = "default_request_timeout", with = "humantime_serde")]
    pub request_timeout: Duration,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CollectorConfig {
    /// Combined label selectors such as `bug,urgent`
    #[serde(default)]
    pub custom_labels: Vec<String>,

    /// Only pull issues updated within this window; the full history when absent
    #[serde(default, with = "humantime_serde")]
    pub issue_lookback: Option<Duration>,

    #[serde(default)]
    pub negative_durations: NegativeDurationPolicy,

    #[serde(default)]
    pub dimensions: Dimensions,

    #[serde(default)]
    pub buckets: BucketLayout,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Address the HTTP server listens on
    #[serde(default = "default_listen")]
    pub listen: SocketAddr,

    /// Upper bound on the duration of one scrape
    #[serde(default = "default_scrape_timeout", with = "humantime_serde")]
    pub scrape_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            scrape_timeout: default_scrape_timeout(),
        }
    }
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_owned()
}

const fn default_page_size() -> u8 {
    MAX_PAGE_SIZE
}

const fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_listen() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8000))
}

const fn default_scrape_timeout() -> Duration {
    Duration::from_secs(60)
}

impl Config {
    /// Load configuration from a file or use defaults
    ///
    /// Without an explicit path, `github-exporter.toml` in the current directory is used if it
    /// exists, and the embedded defaults otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or fails validation
    pub fn load(config_path: Option<&Utf8Path>) -> Result<Self> {
        let (final_path, text) = if let Some(path) = config_path {
            let text = fs::read_to_string(path).into_app_err_with(|| format!("reading github-exporter configuration file '{path}'"))?;
            (path.to_owned(), text)
        } else {
            let path = Utf8PathBuf::from(DEFAULT_CONFIG_FILE);
            match fs::read_to_string(&path) {
                Ok(text) => (path, text),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    // No config file found, use defaults
                    return Ok(Self::default());
                }
                Err(e) => return Err(e).into_app_err_with(|| format!("reading github-exporter configuration file '{path}'")),
            }
        };

        Self::parse(&text).into_app_err_with(|| format!("loading configuration file '{final_path}'"))
    }

    /// Parse and validate configuration text
    pub fn parse(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).into_app_err("parsing configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Save the default configuration to a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written
    pub fn save_default(output_path: &Utf8Path) -> Result<()> {
        fs::write(output_path, DEFAULT_CONFIG_TOML).into_app_err_with(|| format!("writing default configuration to {output_path}"))?;
        Ok(())
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns an error if any value is out of range or a selector is malformed or repeated
    pub fn validate(&self) -> Result<()> {
        if self.github.page_size == 0 || self.github.page_size > MAX_PAGE_SIZE {
            return Err(app_err!(
                "github.page_size must be between 1 and {MAX_PAGE_SIZE}, got {}",
                self.github.page_size
            ));
        }

        if self.github.request_timeout.is_zero() {
            return Err(app_err!("github.request_timeout must be greater than zero"));
        }

        if self.server.scrape_timeout.is_zero() {
            return Err(app_err!("server.scrape_timeout must be greater than zero"));
        }

        // Repository, selectors and buckets are checked by constructing what they configure
        let _ = self.collector_settings()?;
        let _ = self.histogram_registry()?;

        Ok(())
    }

    pub fn repo(&self) -> Result<RepoSpec> {
        RepoSpec::new(&self.github.organization, &self.github.repository)
    }

    pub fn selectors(&self) -> Result<Vec<LabelSelector>> {
        self.collector
            .custom_labels
            .iter()
            .map(|raw| LabelSelector::parse(raw).into_app_err("invalid collector.custom_labels entry"))
            .collect()
    }

    pub fn collector_settings(&self) -> Result<CollectorSettings> {
        let settings = CollectorSettings::new(self.repo()?, self.selectors()?)?
            .with_dimensions(self.collector.dimensions)
            .with_page_size(self.github.page_size)?
            .with_lookback(self.collector.issue_lookback)?
            .with_negative_durations(self.collector.negative_durations);

        Ok(settings)
    }

    pub fn histogram_registry(&self) -> Result<HistogramRegistry> {
        let bounds = self.collector.buckets.bounds().into_app_err("invalid collector.buckets")?;
        HistogramRegistry::new(bounds).into_app_err("invalid collector.buckets")
    }
}

impl Default for Config {
    fn default() -> Self {
        toml::from_str(DEFAULT_CONFIG_TOML).expect("default_config.toml should be valid TOML that deserializes to Config")
    }
}
