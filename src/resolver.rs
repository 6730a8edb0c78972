//! Gateway URL resolution: custom override table first, vendor catalog second.

use std::collections::HashMap;

use crate::catalog::GatewayCatalog;

/// Outcome of a successful resolution. `is_custom_override` drives the
/// credential-withholding policy in the transport layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedGateway {
    pub url: String,
    pub is_custom_override: bool,
}

/// Maps chain identifiers to gateway base URLs. Read-only after construction.
#[derive(Debug, Clone)]
pub struct GatewayUrlResolver {
    catalog: GatewayCatalog,
    overrides: HashMap<String, String>,
}

impl GatewayUrlResolver {
    pub fn new(catalog: GatewayCatalog, overrides: HashMap<String, String>) -> Self {
        Self { catalog, overrides }
    }

    /// Resolve a chain identifier to a gateway URL.
    ///
    /// The override table is consulted first with an exact identifier match
    /// (no alias resolution); the vendor catalog is scanned second, matching
    /// canonical chain or alias in catalog order. `None` is the expected
    /// outcome for identifiers nobody knows.
    pub fn resolve(&self, chain: &str) -> Option<ResolvedGateway> {
        if let Some(url) = self.overrides.get(chain) {
            return Some(ResolvedGateway {
                url: url.clone(),
                is_custom_override: true,
            });
        }

        self.catalog.find(chain).map(|entry| ResolvedGateway {
            url: entry.gateway_url.clone(),
            is_custom_override: false,
        })
    }

    /// The vendor catalog backing this resolver.
    pub fn catalog(&self) -> &GatewayCatalog {
        &self.catalog
    }

    /// Chain identifiers present only in the override table.
    pub fn override_chains(&self) -> impl Iterator<Item = &str> {
        self.overrides.keys().map(|chain| chain.as_str())
    }
}
