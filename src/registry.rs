//! Chain protocol registry: which transport a chain speaks and how its
//! gateway API is shaped.
//!
//! The registry is static data. Chain-family rules (REST path roots, network
//! segments) live in one ordered table so that adding a family is a table row,
//! not a new conditional; first matching family wins.

use once_cell::sync::Lazy;
use std::collections::HashSet;

/// Transport protocol spoken by a chain's gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    JsonRpc,
    Rest,
}

/// How strictly to treat a malformed response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorHandling {
    Strict,
    #[default]
    Lenient,
}

/// Expected response body format for a chain's gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseFormat {
    #[default]
    Json,
    Text,
    Binary,
}

/// Per-chain API configuration resolved from the family table.
#[derive(Debug, Clone, Default)]
pub struct ChainApiConfig {
    /// Path root prepended to REST methods, e.g. `/api/v0`.
    pub base_path_prefix: Option<String>,
    /// Candidate method-discovery paths, tried in order against the gateway.
    pub default_endpoints: Vec<String>,
    pub error_handling: ErrorHandling,
    pub response_format: ResponseFormat,
}

/// How a family derives its REST path root.
#[derive(Debug, Clone, Copy)]
enum PathRule {
    /// No prefix is applied.
    None,
    /// A fixed API root, e.g. `/api/v0`.
    Fixed(&'static str),
    /// The network qualifier from the chain identifier suffix becomes the
    /// root, e.g. `ton-testnet` -> `/testnet`.
    NetworkSegment,
}

struct ChainFamily {
    prefix: &'static str,
    protocol: Protocol,
    path_rule: PathRule,
    default_endpoints: &'static [&'static str],
    error_handling: ErrorHandling,
    response_format: ResponseFormat,
}

const DISCOVERY_PATHS: &[&str] = &["/supported-methods", "/methods"];

/// Ordered family table; evaluated top to bottom, first match wins.
const CHAIN_FAMILIES: &[ChainFamily] = &[
    ChainFamily {
        prefix: "ton",
        protocol: Protocol::Rest,
        path_rule: PathRule::NetworkSegment,
        default_endpoints: DISCOVERY_PATHS,
        error_handling: ErrorHandling::Lenient,
        response_format: ResponseFormat::Json,
    },
    ChainFamily {
        prefix: "cardano",
        protocol: Protocol::Rest,
        path_rule: PathRule::Fixed("/api/v0"),
        default_endpoints: DISCOVERY_PATHS,
        error_handling: ErrorHandling::Lenient,
        response_format: ResponseFormat::Json,
    },
    ChainFamily {
        prefix: "tezos",
        protocol: Protocol::Rest,
        path_rule: PathRule::Fixed("/v1"),
        default_endpoints: DISCOVERY_PATHS,
        error_handling: ErrorHandling::Lenient,
        response_format: ResponseFormat::Json,
    },
    ChainFamily {
        prefix: "tron",
        protocol: Protocol::Rest,
        path_rule: PathRule::None,
        default_endpoints: DISCOVERY_PATHS,
        error_handling: ErrorHandling::Strict,
        response_format: ResponseFormat::Json,
    },
];

/// Chain identifiers the registry knows about. Chains outside this list that
/// match a family prefix still resolve through the family table; everything
/// else is UNKNOWN and handled downstream as JSON-RPC/EVM-compatible.
const SUPPORTED_CHAINS: &[&str] = &[
    "ethereum-mainnet",
    "ethereum-sepolia",
    "ethereum-holesky",
    "polygon-mainnet",
    "polygon-amoy",
    "bsc-mainnet",
    "bsc-testnet",
    "arbitrum-one",
    "arbitrum-sepolia",
    "optimism-mainnet",
    "base-mainnet",
    "base-sepolia",
    "avalanche-c",
    "fantom-mainnet",
    "celo-mainnet",
    "gnosis-mainnet",
    "bitcoin-mainnet",
    "bitcoin-testnet",
    "litecoin-mainnet",
    "dogecoin-mainnet",
    "solana-mainnet",
    "solana-devnet",
    "cardano-mainnet",
    "cardano-preprod",
    "tezos-mainnet",
    "tezos-ghostnet",
    "ton-mainnet",
    "ton-testnet",
    "tron-mainnet",
    "ripple-mainnet",
];

static CHAIN_SET: Lazy<HashSet<&'static str>> =
    Lazy::new(|| SUPPORTED_CHAINS.iter().copied().collect());

/// Check whether `chain` matches a family prefix as a whole identifier
/// segment (`ton` matches `ton` and `ton-testnet`, not `tonic-mainnet`).
fn matches_family(chain: &str, prefix: &str) -> bool {
    match chain.strip_prefix(prefix) {
        Some("") => true,
        Some(rest) => rest.starts_with('-'),
        None => false,
    }
}

fn family_of(chain: &str) -> Option<&'static ChainFamily> {
    CHAIN_FAMILIES
        .iter()
        .find(|family| matches_family(chain, family.prefix))
}

/// Network qualifier from the chain identifier suffix (`ton-testnet` ->
/// `testnet`). Bare family names default to mainnet.
fn network_segment<'a>(chain: &'a str, prefix: &str) -> &'a str {
    chain
        .strip_prefix(prefix)
        .and_then(|rest| rest.strip_prefix('-'))
        .filter(|segment| !segment.is_empty())
        .unwrap_or("mainnet")
}

/// Transport protocol for a chain, or `None` when the chain is unknown.
pub fn protocol_of(chain: &str) -> Option<Protocol> {
    if let Some(family) = family_of(chain) {
        return Some(family.protocol);
    }
    if CHAIN_SET.contains(chain) {
        return Some(Protocol::JsonRpc);
    }
    None
}

/// API configuration for a chain. Total: unknown chains get the default
/// (lenient, JSON, no prefix).
pub fn config_of(chain: &str) -> ChainApiConfig {
    let Some(family) = family_of(chain) else {
        return ChainApiConfig::default();
    };

    let base_path_prefix = match family.path_rule {
        PathRule::None => None,
        PathRule::Fixed(root) => Some(root.to_string()),
        PathRule::NetworkSegment => {
            Some(format!("/{}", network_segment(chain, family.prefix)))
        }
    };

    ChainApiConfig {
        base_path_prefix,
        default_endpoints: family
            .default_endpoints
            .iter()
            .map(|path| path.to_string())
            .collect(),
        error_handling: family.error_handling,
        response_format: family.response_format,
    }
}

/// All chain identifiers known to the registry.
pub fn all_chains() -> &'static [&'static str] {
    SUPPORTED_CHAINS
}

/// Registered chains speaking the given protocol.
pub fn chains_by_protocol(kind: Protocol) -> Vec<&'static str> {
    SUPPORTED_CHAINS
        .iter()
        .copied()
        .filter(|chain| protocol_of(chain) == Some(kind))
        .collect()
}

/// Validate a chain identifier: lowercase alphanumeric segments joined by
/// single hyphens, 3 to 50 characters.
pub fn is_valid_chain_id(chain: &str) -> bool {
    if chain.len() < 3 || chain.len() > 50 {
        return false;
    }
    chain.split('-').all(|segment| {
        !segment.is_empty()
            && segment
                .bytes()
                .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
    })
}
