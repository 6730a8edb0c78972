//! Gateway facade: the three operations the tool surface exposes.
//!
//! Owns the per-URL method-catalog cache. The cache is idempotent
//! memoization of remote data; concurrent duplicate fetches are acceptable
//! and the last writer wins.

use anyhow::Result;
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::debug;

use crate::catalog::GatewayCatalog;
use crate::config::GatewayConfig;
use crate::envelope::ResponseEnvelope;
use crate::methods::{self, MethodCatalog, MethodSource};
use crate::registry;
use crate::request::{self, HttpVerb, OutboundRequest, Params, Payload};
use crate::resolver::GatewayUrlResolver;
use crate::transport::TransportExecutor;

/// Composes resolution, request construction, and transport into the
/// public gateway operations.
pub struct GatewayFacade {
    resolver: GatewayUrlResolver,
    transport: TransportExecutor,
    methods_cache: Mutex<HashMap<String, MethodCatalog>>,
}

impl GatewayFacade {
    /// Build the facade from configuration and the vendor catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: GatewayConfig, catalog: GatewayCatalog) -> Result<Self> {
        let transport = TransportExecutor::new(&config)?;
        let resolver = GatewayUrlResolver::new(catalog, config.custom_rpc);

        Ok(Self {
            resolver,
            transport,
            methods_cache: Mutex::new(HashMap::new()),
        })
    }

    /// The vendor catalog backing this facade.
    pub fn catalog(&self) -> &GatewayCatalog {
        self.resolver.catalog()
    }

    /// All chains a caller can address: the vendor catalog plus any
    /// override-only chains, sorted and deduplicated.
    pub fn list_supported_chains(&self) -> Vec<String> {
        let mut chains: Vec<String> = self
            .resolver
            .catalog()
            .chains()
            .map(str::to_string)
            .collect();
        chains.extend(self.resolver.override_chains().map(str::to_string));
        chains.sort();
        chains.dedup();
        chains
    }

    /// Advisory method catalog for a chain.
    ///
    /// Chains with configured discovery paths are fetched live and cached by
    /// resolved gateway URL (never invalidated in-process); everything else,
    /// and any fetch failure, gets the labeled static fallback. Never fails.
    pub async fn list_supported_methods(&self, chain: &str) -> MethodCatalog {
        let Some(resolved) = self.resolver.resolve(chain) else {
            return methods::static_fallback(chain);
        };

        let api_config = registry::config_of(chain);
        if api_config.default_endpoints.is_empty() {
            return methods::static_fallback(chain);
        }

        {
            let cache = self.methods_cache.lock().unwrap();
            if let Some(catalog) = cache.get(&resolved.url) {
                return catalog.clone();
            }
        }

        for path in &api_config.default_endpoints {
            let request = OutboundRequest {
                url: format!("{}{}", resolved.url, path),
                payload: Payload::Rest {
                    verb: HttpVerb::Get,
                    body: None,
                },
                with_api_key: !resolved.is_custom_override,
                error_handling: api_config.error_handling,
                response_format: api_config.response_format,
            };

            let envelope = self.transport.send(&request).await;
            if (200..300).contains(&envelope.status) && envelope.error.is_none() {
                if let Some(data) = envelope.data {
                    let catalog = MethodCatalog {
                        chain: chain.to_string(),
                        source: MethodSource::Live,
                        methods: data,
                    };
                    self.methods_cache
                        .lock()
                        .unwrap()
                        .insert(resolved.url.clone(), catalog.clone());
                    return catalog;
                }
            }
            debug!(chain = %chain, path = %path, "method discovery candidate failed");
        }

        methods::static_fallback(chain)
    }

    /// Execute a method on a chain, returning the uniform envelope for
    /// every outcome.
    pub async fn execute(&self, chain: &str, method: &str, params: &Params) -> ResponseEnvelope {
        if !registry::is_valid_chain_id(chain) {
            return ResponseEnvelope::bad_request(format!("Invalid chain identifier: {}", chain));
        }

        let Some(resolved) = self.resolver.resolve(chain) else {
            return ResponseEnvelope::not_found(format!(
                "Gateway URL not found for chain: {}",
                chain
            ));
        };

        let request = match request::build(chain, &resolved, method, params) {
            Ok(request) => request,
            Err(error) => return ResponseEnvelope::bad_request(error.to_string()),
        };

        self.transport.send(&request).await
    }
}
