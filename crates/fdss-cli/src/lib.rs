//! # fdss-cli — CLI Tool for FedEx Delivery Status Sync
//!
//! Provides the `fdss` command-line interface: builds an order reference
//! from flags or a file, runs one status-view activation against the app
//! proxy and prints the resulting banner.
//!
//! ```bash
//! fdss track --order-id gid://shopify/Order/123 --processed-at 2024-01-05T10:00:00Z
//! fdss track --order order.yaml --json
//! fdss --config fdss.yaml track --order order.json --dry-run
//! ```

pub mod config;
pub mod track;

use std::path::Path;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;

/// Read a JSON or YAML document, chosen by file extension.
///
/// `.yaml` and `.yml` are parsed as YAML; anything else as JSON.
pub fn load_document<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let is_yaml = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    );
    if is_yaml {
        serde_yaml::from_str(&content)
            .with_context(|| format!("failed to parse YAML from {}", path.display()))
    } else {
        serde_json::from_str(&content)
            .with_context(|| format!("failed to parse JSON from {}", path.display()))
    }
}
