//! Outbound request construction: protocol decision, REST path
//! normalization, path templating, and query/body assembly.

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::HashSet;
use thiserror::Error;

use crate::registry::{self, ChainApiConfig, ErrorHandling, Protocol, ResponseFormat};
use crate::resolver::ResolvedGateway;

/// Characters escaped when substituting a value into a path segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'<')
    .add(b'>')
    .add(b'`')
    .add(b'#')
    .add(b'?')
    .add(b'{')
    .add(b'}')
    .add(b'/')
    .add(b'%')
    .add(b'&')
    .add(b'+');

/// Tool-supplied call parameters: either a positional sequence or a keyed
/// mapping. The tagged split keeps REST-vs-JSON-RPC branching explicit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Params {
    Sequence(Vec<Value>),
    Keyed(Map<String, Value>),
}

impl Default for Params {
    fn default() -> Self {
        Params::Sequence(Vec::new())
    }
}

impl Params {
    /// Render as a JSON-RPC `params` value: array for positional,
    /// object for named.
    pub fn to_value(&self) -> Value {
        match self {
            Params::Sequence(values) => Value::Array(values.clone()),
            Params::Keyed(map) => Value::Object(map.clone()),
        }
    }

    /// View the parameters as a keyed mapping when one is available:
    /// either `Keyed` directly, or a one-element sequence whose only
    /// element is an object.
    pub fn keyed_view(&self) -> Option<&Map<String, Value>> {
        match self {
            Params::Keyed(map) => Some(map),
            Params::Sequence(values) => match values.as_slice() {
                [Value::Object(map)] => Some(map),
                _ => None,
            },
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Params::Sequence(values) => values.is_empty(),
            Params::Keyed(map) => map.is_empty(),
        }
    }
}

/// HTTP verb of a REST request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpVerb {
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl HttpVerb {
    pub fn parse(token: &str) -> Option<Self> {
        match token.to_ascii_uppercase().as_str() {
            "GET" => Some(HttpVerb::Get),
            "POST" => Some(HttpVerb::Post),
            "PUT" => Some(HttpVerb::Put),
            "DELETE" => Some(HttpVerb::Delete),
            "PATCH" => Some(HttpVerb::Patch),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpVerb::Get => "GET",
            HttpVerb::Post => "POST",
            HttpVerb::Put => "PUT",
            HttpVerb::Delete => "DELETE",
            HttpVerb::Patch => "PATCH",
        }
    }
}

/// Wire payload of an outbound request. The enum guarantees a request is
/// either a JSON-RPC envelope or a REST call, never both.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    JsonRpc(Value),
    Rest {
        verb: HttpVerb,
        body: Option<Value>,
    },
}

/// A fully constructed request, ready for the transport layer.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundRequest {
    pub url: String,
    pub payload: Payload,
    /// False when the URL came from a custom override; the vendor API key
    /// must not leak to third-party endpoints.
    pub with_api_key: bool,
    pub error_handling: ErrorHandling,
    pub response_format: ResponseFormat,
}

/// Request-construction failures, surfaced before anything goes over
/// the wire.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BuildError {
    #[error("Missing required parameter: method")]
    EmptyMethod,
    #[error("Invalid chain identifier: {0}")]
    InvalidChain(String),
}

/// Whether a method string looks like a REST call (`"<HTTP_VERB> <path>"`).
///
/// This is a deliberate heuristic, not a general parsing rule: it is
/// consulted only for chains the registry has no protocol verdict for,
/// where the caller-supplied method shape is the only signal available.
/// Registered chains always follow the registry.
fn rest_shaped(method: &str) -> bool {
    method.contains(' ')
}

/// Build an outbound request for `method` on `chain`.
pub fn build(
    chain: &str,
    resolved: &ResolvedGateway,
    method: &str,
    params: &Params,
) -> Result<OutboundRequest, BuildError> {
    let method = method.trim();
    if method.is_empty() {
        return Err(BuildError::EmptyMethod);
    }
    if !registry::is_valid_chain_id(chain) {
        return Err(BuildError::InvalidChain(chain.to_string()));
    }

    let api_config = registry::config_of(chain);
    let protocol = registry::protocol_of(chain).unwrap_or_else(|| {
        // Unregistered chain: default to EVM-style JSON-RPC unless the
        // method shape says otherwise.
        if rest_shaped(method) {
            Protocol::Rest
        } else {
            Protocol::JsonRpc
        }
    });
    let with_api_key = !resolved.is_custom_override;

    match protocol {
        Protocol::JsonRpc => Ok(OutboundRequest {
            url: resolved.url.clone(),
            payload: Payload::JsonRpc(json!({
                "jsonrpc": "2.0",
                "id": 1,
                "method": method,
                "params": params.to_value(),
            })),
            with_api_key,
            error_handling: api_config.error_handling,
            response_format: api_config.response_format,
        }),
        Protocol::Rest => {
            Ok(build_rest(resolved, method, params, &api_config, with_api_key))
        }
    }
}

fn build_rest(
    resolved: &ResolvedGateway,
    method: &str,
    params: &Params,
    api_config: &ChainApiConfig,
    with_api_key: bool,
) -> OutboundRequest {
    let (verb, raw_path) = parse_verb_path(method);

    let mut path = format!("/{}", raw_path.trim_start_matches('/'));
    if let Some(prefix) = &api_config.base_path_prefix {
        if !path.starts_with(prefix.as_str()) {
            path = format!("{}{}", prefix, path);
        }
    }

    let (path, consumed) = substitute_placeholders(&path, params.keyed_view());

    let mut url = format!("{}{}", resolved.url, path);
    let body = match verb {
        HttpVerb::Get => {
            if let Some(query) = build_query(params.keyed_view(), &consumed) {
                url.push('?');
                url.push_str(&query);
            }
            None
        }
        _ => request_body(params, &consumed),
    };

    OutboundRequest {
        url,
        payload: Payload::Rest { verb, body },
        with_api_key,
        error_handling: api_config.error_handling,
        response_format: api_config.response_format,
    }
}

/// Split an explicit `"<VERB> <path>"` method; bare method names become
/// `GET <method>`.
fn parse_verb_path(method: &str) -> (HttpVerb, String) {
    if let Some((first, rest)) = method.split_once(' ') {
        if let Some(verb) = HttpVerb::parse(first) {
            return (verb, rest.trim().to_string());
        }
    }
    (HttpVerb::Get, method.to_string())
}

/// Substitute `{name}` tokens in the path from the keyed parameters,
/// percent-encoding each value. Returns the substituted path and the set of
/// consumed keys so no parameter is emitted twice.
fn substitute_placeholders(
    path: &str,
    keyed: Option<&Map<String, Value>>,
) -> (String, HashSet<String>) {
    let mut consumed = HashSet::new();
    let Some(map) = keyed else {
        return (path.to_string(), consumed);
    };

    let mut output = String::with_capacity(path.len());
    let mut rest = path;
    while let Some(open) = rest.find('{') {
        output.push_str(&rest[..open]);
        let after_open = &rest[open + 1..];
        let Some(close) = after_open.find('}') else {
            output.push_str(&rest[open..]);
            rest = "";
            break;
        };
        let name = &after_open[..close];
        match map.get(name).and_then(value_to_string) {
            Some(value) => {
                output.push_str(&utf8_percent_encode(&value, PATH_SEGMENT).to_string());
                consumed.insert(name.to_string());
            }
            // Unknown token: leave it verbatim
            None => output.push_str(&rest[open..open + 1 + close + 1]),
        }
        rest = &after_open[close + 1..];
    }
    output.push_str(rest);

    (output, consumed)
}

/// Flatten keyed parameters into a URL-encoded query string, skipping nulls
/// and keys already consumed by path templating.
fn build_query(
    keyed: Option<&Map<String, Value>>,
    consumed: &HashSet<String>,
) -> Option<String> {
    let map = keyed?;
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    let mut any = false;
    for (key, value) in map {
        if consumed.contains(key) {
            continue;
        }
        if let Some(text) = value_to_string(value) {
            serializer.append_pair(key, &text);
            any = true;
        }
    }
    any.then(|| serializer.finish())
}

/// JSON body for a non-GET REST request: the parameter value itself. Keys
/// consumed by path templating are dropped from keyed bodies.
fn request_body(params: &Params, consumed: &HashSet<String>) -> Option<Value> {
    let keyed_body = |map: &Map<String, Value>| {
        let filtered: Map<String, Value> = map
            .iter()
            .filter(|(key, _)| !consumed.contains(*key))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        (!filtered.is_empty()).then_some(Value::Object(filtered))
    };

    match params {
        Params::Keyed(map) => keyed_body(map),
        Params::Sequence(values) => match values.as_slice() {
            [] => None,
            [Value::Object(map)] => keyed_body(map),
            [single] => Some(single.clone()),
            many => Some(Value::Array(many.to_vec())),
        },
    }
}

/// Scalar rendering of a loosely typed value for query strings and path
/// segments. Nulls are skipped; composites fall back to compact JSON.
fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Number(number) => Some(number.to_string()),
        other => serde_json::to_string(other).ok(),
    }
}
