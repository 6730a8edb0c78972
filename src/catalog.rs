//! Vendor gateway catalog: which base URL serves each chain.
//!
//! The catalog ships embedded in the binary and is loaded once at startup.
//! Entry order follows the data file and is load-bearing: resolution scans
//! entries in file order and the first match wins.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// One vendor gateway entry. A gateway is reachable under its canonical
/// chain identifier and any of its alias names.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayEndpoint {
    pub chain: String,
    pub gateway_url: String,
    #[serde(default)]
    pub alias_names: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct GatewayFile {
    gateways: Vec<GatewayEndpoint>,
}

/// The vendor gateway catalog, read-only after construction.
#[derive(Debug, Clone)]
pub struct GatewayCatalog {
    entries: Vec<GatewayEndpoint>,
}

const GATEWAYS_JSON: &str = include_str!("../gateways.json");

impl GatewayCatalog {
    /// Load the catalog embedded at compile time.
    pub fn embedded() -> Result<Self> {
        let file: GatewayFile = serde_json::from_str(GATEWAYS_JSON)
            .context("Failed to parse embedded gateways.json")?;
        Ok(Self {
            entries: file.gateways,
        })
    }

    /// Build a catalog from explicit entries, preserving their order.
    pub fn from_entries(entries: Vec<GatewayEndpoint>) -> Self {
        Self { entries }
    }

    /// All catalog entries in file order.
    pub fn entries(&self) -> &[GatewayEndpoint] {
        &self.entries
    }

    /// Find the entry whose canonical chain or alias set contains the
    /// identifier. Scans in file order; first match wins.
    pub fn find(&self, chain: &str) -> Option<&GatewayEndpoint> {
        self.entries.iter().find(|entry| {
            entry.chain == chain || entry.alias_names.iter().any(|alias| alias == chain)
        })
    }

    /// Canonical chain identifiers of every catalog entry, in file order.
    pub fn chains(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.chain.as_str())
    }
}
