use super::Host;
use super::config::Config;
use crate::Result;
use crate::metrics::describe;
use camino::Utf8PathBuf;
use clap::Parser;
use std::io::Write;

#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file (default is `github-exporter.toml`)
    #[arg(long, short = 'c', value_name = "PATH")]
    pub config: Option<Utf8PathBuf>,
}

/// Validates a configuration file and lists the metrics it enables
pub fn validate_config<H: Host>(host: &mut H, args: &ValidateArgs) -> Result<()> {
    let config_path = args.config.as_deref();

    match Config::load(config_path) {
        Ok(config) => {
            let _ = writeln!(host.output(), "Configuration file is valid");
            if let Some(path) = config_path {
                let _ = writeln!(host.output(), "Config file: {path}");
            } else {
                let _ = writeln!(host.output(), "Using default configuration (no config file given)");
            }

            let _ = writeln!(
                host.output(),
                "Repository: {}/{}",
                config.github.organization.trim(),
                config.github.repository.trim()
            );
            let _ = writeln!(host.output(), "Metrics:");
            for def in describe(&config.collector.dimensions) {
                let _ = writeln!(host.output(), "  {} ({})", def.name, def.kind);
            }

            Ok(())
        }
        Err(e) => {
            let _ = writeln!(host.error(), "❌ Configuration validation failed: {e}");
            host.exit(1);
            Err(e)
        }
    }
}
