//! Configuration for the ChainGate MCP server.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::path::Path;
use tracing::warn;

fn default_timeout_ms() -> u64 {
    30_000
}

fn default_retry_attempts() -> u32 {
    3
}

/// Configuration for the gateway layer, loaded once at startup and injected
/// into the components that need it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayConfig {
    /// Vendor API key sent as `X-API-Key` on vendor gateway requests.
    #[serde(default)]
    pub api_key: Option<String>,

    /// HTTP request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Declared retry budget. Carried for the caller's benefit; the
    /// transport itself never retries.
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,

    /// Caller-supplied gateway overrides, chain identifier to base URL.
    #[serde(default)]
    pub custom_rpc: HashMap<String, String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            timeout_ms: default_timeout_ms(),
            retry_attempts: default_retry_attempts(),
            custom_rpc: HashMap::new(),
        }
    }
}

impl GatewayConfig {
    /// Load configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();
        let content = std::fs::read_to_string(path_ref)
            .with_context(|| format!("Failed to read config file: {}", path_ref.display()))?;

        let config: GatewayConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path_ref.display()))?;

        Ok(config)
    }

    /// Load configuration from the environment, reading a `.env` file when
    /// one is present. Malformed values fall back to defaults with a
    /// warning; this path never fails.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let api_key = env::var("CHAINGATE_API_KEY")
            .ok()
            .filter(|key| !key.is_empty());

        let timeout_ms = match env::var("CHAINGATE_TIMEOUT_MS") {
            Ok(raw) => raw.parse().unwrap_or_else(|_| {
                warn!(value = %raw, "ignoring invalid CHAINGATE_TIMEOUT_MS");
                default_timeout_ms()
            }),
            Err(_) => default_timeout_ms(),
        };

        let retry_attempts = match env::var("CHAINGATE_RETRIES") {
            Ok(raw) => raw.parse().unwrap_or_else(|_| {
                warn!(value = %raw, "ignoring invalid CHAINGATE_RETRIES");
                default_retry_attempts()
            }),
            Err(_) => default_retry_attempts(),
        };

        let custom_rpc = env::var("CHAINGATE_CUSTOM_RPC")
            .map(|raw| parse_override_table(&raw))
            .unwrap_or_default();

        Self {
            api_key,
            timeout_ms,
            retry_attempts,
            custom_rpc,
        }
    }
}

/// Parse the custom RPC override table.
///
/// Accepts `chain,url;chain,url` entries, or the flat comma-delimited form
/// `chain,url,chain,url`. Malformed entries are skipped with a warning.
pub fn parse_override_table(raw: &str) -> HashMap<String, String> {
    let mut table = HashMap::new();

    let pairs: Vec<(&str, &str)> = if raw.contains(';') {
        raw.split(';')
            .filter(|entry| !entry.trim().is_empty())
            .filter_map(|entry| match entry.split_once(',') {
                Some((chain, url)) => Some((chain.trim(), url.trim())),
                None => {
                    warn!(entry = %entry, "ignoring override entry without a URL");
                    None
                }
            })
            .collect()
    } else {
        let tokens: Vec<&str> = raw
            .split(',')
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .collect();
        if tokens.len() % 2 != 0 {
            warn!("override table has an odd number of fields; dropping the last");
        }
        tokens
            .chunks_exact(2)
            .map(|pair| (pair[0], pair[1]))
            .collect()
    };

    for (chain, url) in pairs {
        if !crate::registry::is_valid_chain_id(chain) {
            warn!(chain = %chain, "ignoring override for invalid chain identifier");
            continue;
        }
        if !url.starts_with("http://") && !url.starts_with("https://") {
            warn!(chain = %chain, url = %url, "ignoring override with non-HTTP URL");
            continue;
        }
        table.insert(chain.to_string(), url.to_string());
    }

    table
}
