//! Method catalogs advertised by `list_supported_methods`.
//!
//! Most gateways expose no discovery endpoint, so the advisory catalog
//! falls back to a static, clearly labeled EVM JSON-RPC dataset. The
//! `source` tag tells callers which kind they got.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Where a method catalog came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MethodSource {
    /// Fetched from the gateway's discovery endpoint.
    Live,
    /// The built-in placeholder dataset below.
    StaticFallback,
}

/// Advisory list of methods a chain's gateway is believed to support.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodCatalog {
    pub chain: String,
    pub source: MethodSource,
    pub methods: Value,
}

/// Placeholder dataset: common EVM JSON-RPC methods. Best-effort and
/// approximate; gateways may support more or fewer.
const FALLBACK_EVM_METHODS: &[(&str, &str)] = &[
    ("eth_blockNumber", "Returns the number of the most recent block"),
    ("eth_getBalance", "Returns the balance of an account at a block"),
    ("eth_getTransactionByHash", "Returns transaction details by hash"),
    ("eth_getTransactionReceipt", "Returns the receipt of a mined transaction"),
    ("eth_getBlockByNumber", "Returns block details by number"),
    ("eth_getBlockByHash", "Returns block details by hash"),
    ("eth_getTransactionCount", "Returns the nonce of an account"),
    ("eth_getCode", "Returns the bytecode at an address"),
    ("eth_getStorageAt", "Returns the storage value at a position"),
    ("eth_getLogs", "Returns logs matching a filter"),
    ("eth_call", "Executes a call without creating a transaction"),
    ("eth_estimateGas", "Estimates gas needed for a transaction"),
    ("eth_gasPrice", "Returns the current gas price"),
    ("eth_maxPriorityFeePerGas", "Returns the current priority fee estimate"),
    ("eth_feeHistory", "Returns historical gas fee data"),
    ("eth_sendRawTransaction", "Broadcasts a signed transaction"),
    ("eth_chainId", "Returns the chain ID"),
    ("eth_syncing", "Returns the node's sync status"),
    ("net_version", "Returns the network ID"),
    ("web3_clientVersion", "Returns the client software version"),
];

/// The static fallback catalog for a chain without a usable discovery
/// endpoint. Never fails.
pub fn static_fallback(chain: &str) -> MethodCatalog {
    let methods: Vec<Value> = FALLBACK_EVM_METHODS
        .iter()
        .map(|(name, description)| {
            json!({
                "method": name,
                "description": description,
            })
        })
        .collect();

    MethodCatalog {
        chain: chain.to_string(),
        source: MethodSource::StaticFallback,
        methods: Value::Array(methods),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Test that the fallback catalog is labeled as such
    #[test]
    fn test_fallback_is_labeled() {
        let catalog = static_fallback("ethereum-mainnet");
        assert_eq!(catalog.source, MethodSource::StaticFallback);
        assert_eq!(catalog.chain, "ethereum-mainnet");
        assert!(!catalog.methods.as_array().unwrap().is_empty());
    }

    /// Test that the source tag serializes in kebab-case
    #[test]
    fn test_source_serialization() {
        let catalog = static_fallback("base-mainnet");
        let json = serde_json::to_value(&catalog).unwrap();
        assert_eq!(json["source"], "static-fallback");
    }

    /// Test that every fallback entry names a method
    #[test]
    fn test_fallback_entries_are_well_formed() {
        let catalog = static_fallback("polygon-mainnet");
        for entry in catalog.methods.as_array().unwrap() {
            assert!(entry["method"].as_str().is_some_and(|m| !m.is_empty()));
            assert!(entry["description"].as_str().is_some());
        }
    }
}
