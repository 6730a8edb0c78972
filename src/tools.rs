//! MCP tool declarations and handlers for the gateway operations.

use rmcp::model::{CallToolResult, Content, Tool};
use rmcp::ErrorData as McpError;
use serde_json::Value;
use std::sync::Arc;

use crate::gateway::GatewayFacade;
use crate::request::Params;

/// Get the gateway MCP tools
pub fn gateway_tools() -> Vec<Tool> {
    vec![
        // execute_rpc tool
        Tool::new(
            "execute_rpc".to_string(),
            "Execute a blockchain method on a chain's gateway. JSON-RPC chains take a method name (e.g. 'eth_getBalance') with positional params; REST chains take a path (e.g. 'blocks/latest') or an explicit '<VERB> <path>' with query/body params. Returns a uniform {data, error, status, statusText} envelope.".to_string(),
            Arc::new({
                let mut props = serde_json::Map::new();
                props.insert("chain".to_string(), serde_json::json!({
                    "type": "string",
                    "description": "Chain identifier (e.g. 'ethereum-mainnet', 'cardano-mainnet') or a known alias (e.g. 'eth', 'polygon')"
                }));
                props.insert("method".to_string(), serde_json::json!({
                    "type": "string",
                    "description": "Method name (JSON-RPC), REST path, or '<HTTP_VERB> <path>'"
                }));
                props.insert("params".to_string(), serde_json::json!({
                    "type": ["array", "object"],
                    "description": "Positional parameter array (JSON-RPC) or keyed parameter object (REST query/body/path placeholders)"
                }));

                let mut schema = serde_json::Map::new();
                schema.insert("type".to_string(), Value::String("object".to_string()));
                schema.insert("properties".to_string(), Value::Object(props));
                schema.insert("required".to_string(), Value::Array(vec![
                    Value::String("chain".to_string()),
                    Value::String("method".to_string()),
                ]));
                schema
            }),
        ),
        // list_supported_chains tool
        Tool::new(
            "list_supported_chains".to_string(),
            "List every chain identifier this server can route to, including custom-override chains.".to_string(),
            Arc::new({
                let mut schema = serde_json::Map::new();
                schema.insert("type".to_string(), Value::String("object".to_string()));
                schema.insert("properties".to_string(), Value::Object(serde_json::Map::new()));
                schema
            }),
        ),
        // list_supported_methods tool
        Tool::new(
            "list_supported_methods".to_string(),
            "List the methods a chain's gateway is believed to support. Live-discovered where the gateway exposes a discovery endpoint, otherwise a labeled static fallback; advisory, not authoritative.".to_string(),
            Arc::new({
                let mut props = serde_json::Map::new();
                props.insert("chain".to_string(), serde_json::json!({
                    "type": "string",
                    "description": "Chain identifier or alias"
                }));

                let mut schema = serde_json::Map::new();
                schema.insert("type".to_string(), Value::String("object".to_string()));
                schema.insert("properties".to_string(), Value::Object(props));
                schema.insert("required".to_string(), Value::Array(vec![Value::String("chain".to_string())]));
                schema
            }),
        ),
    ]
}

/// Handle execute_rpc tool call
pub async fn handle_execute_rpc(
    facade: &GatewayFacade,
    args: &serde_json::Map<String, Value>,
) -> Result<CallToolResult, McpError> {
    let chain = args.get("chain").and_then(|v| v.as_str()).ok_or_else(|| {
        McpError::invalid_params("Missing or invalid 'chain' parameter", None)
    })?;
    let method = args.get("method").and_then(|v| v.as_str()).ok_or_else(|| {
        McpError::invalid_params("Missing or invalid 'method' parameter", None)
    })?;

    let params = match args.get("params") {
        None | Some(Value::Null) => Params::default(),
        Some(value) => serde_json::from_value(value.clone()).map_err(|_| {
            McpError::invalid_params("'params' must be an array or an object", None)
        })?,
    };

    let envelope = facade.execute(chain, method, &params).await;
    let text = serde_json::to_string_pretty(&envelope)
        .map_err(|e| McpError::internal_error(e.to_string(), None))?;

    Ok(CallToolResult::success(vec![Content::text(text)]))
}

/// Handle list_supported_chains tool call
pub async fn handle_list_supported_chains(
    facade: &GatewayFacade,
    _args: &serde_json::Map<String, Value>,
) -> Result<CallToolResult, McpError> {
    let chains = facade.list_supported_chains();
    let text = serde_json::to_string_pretty(&chains)
        .map_err(|e| McpError::internal_error(e.to_string(), None))?;

    Ok(CallToolResult::success(vec![Content::text(text)]))
}

/// Handle list_supported_methods tool call
pub async fn handle_list_supported_methods(
    facade: &GatewayFacade,
    args: &serde_json::Map<String, Value>,
) -> Result<CallToolResult, McpError> {
    let chain = args.get("chain").and_then(|v| v.as_str()).ok_or_else(|| {
        McpError::invalid_params("Missing or invalid 'chain' parameter", None)
    })?;

    let catalog = facade.list_supported_methods(chain).await;
    let text = serde_json::to_string_pretty(&catalog)
        .map_err(|e| McpError::internal_error(e.to_string(), None))?;

    Ok(CallToolResult::success(vec![Content::text(text)]))
}
