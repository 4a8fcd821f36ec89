//! # Client Configuration Resolution
//!
//! Layers, lowest to highest precedence:
//!
//! 1. built-in defaults,
//! 2. `FDSS_*` environment variables,
//! 3. the `--config` file (JSON or YAML),
//! 4. command-line flags.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;

use fdss_tracking_client::{ConfigFile, TrackingConfig};

/// Flags that override the tracking client configuration.
#[derive(Args, Debug, Clone, Default)]
pub struct ClientOverrides {
    /// App-proxy origin, e.g. `https://example.myshopify.com`.
    #[arg(long)]
    pub origin: Option<String>,

    /// Retries after a 429 response.
    #[arg(long)]
    pub max_retries: Option<u32>,

    /// Delay before each 429 retry, in milliseconds.
    #[arg(long)]
    pub retry_delay_ms: Option<u64>,

    /// Request timeout in seconds.
    #[arg(long)]
    pub timeout_secs: Option<u64>,
}

impl ClientOverrides {
    fn as_config_file(&self) -> ConfigFile {
        ConfigFile {
            origin: self.origin.clone(),
            max_retries: self.max_retries,
            retry_delay_ms: self.retry_delay_ms,
            timeout_secs: self.timeout_secs,
            ..ConfigFile::default()
        }
    }
}

/// Resolve the effective tracking configuration.
pub fn resolve_config(config_path: Option<&Path>, overrides: &ClientOverrides) -> Result<TrackingConfig> {
    let mut config = TrackingConfig::from_env().context("invalid FDSS_* environment")?;

    if let Some(path) = config_path {
        let file: ConfigFile = crate::load_document(path)?;
        config = config
            .overlay(file)
            .with_context(|| format!("invalid configuration in {}", path.display()))?;
        tracing::debug!(path = %path.display(), "applied configuration file");
    }

    config
        .overlay(overrides.as_config_file())
        .context("invalid command-line configuration")
}
