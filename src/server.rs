//! MCP server handler implementation

use rmcp::{
    model::*,
    service::{RequestContext, RoleServer},
    ErrorData as McpError, ServerHandler,
};
use std::sync::Arc;

use crate::gateway::GatewayFacade;
use crate::tools;

/// MCP server handler
#[derive(Clone)]
pub struct ChainGateHandler {
    facade: Arc<GatewayFacade>,
}

impl ChainGateHandler {
    pub fn new(facade: GatewayFacade) -> Self {
        Self {
            facade: Arc::new(facade),
        }
    }

    pub fn facade(&self) -> &GatewayFacade {
        &self.facade
    }
}

impl ServerHandler for ChainGateHandler {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::default(),
            capabilities: ServerCapabilities {
                prompts: None,
                resources: Some(ResourcesCapability {
                    subscribe: None,
                    list_changed: None,
                }),
                tools: Some(ToolsCapability {
                    list_changed: None,
                }),
                logging: None,
                completions: None,
                experimental: None,
            },
            server_info: Implementation {
                name: "chaingate-mcp-server".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                title: Some("ChainGate MCP Server".to_string()),
                icons: None,
                website_url: None,
            },
            instructions: Some("MCP server that routes blockchain calls to per-chain vendor gateways, normalizing JSON-RPC and REST transports into one {data, error, status, statusText} envelope. Use list_supported_chains to discover routable chains, list_supported_methods for an advisory method list, and execute_rpc to make calls.".into()),
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(ListToolsResult {
            tools: tools::gateway_tools(),
            next_cursor: None,
        })
    }

    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, McpError> {
        let mut gateways_resource = RawResource::new("gateways://all", "Vendor Gateway Catalog");
        gateways_resource.description = Some(
            "The embedded vendor gateway catalog: canonical chain, base URL, and alias names per entry"
                .to_string(),
        );
        gateways_resource.mime_type = Some("application/json".to_string());

        let mut chains_resource = RawResource::new("chains://supported", "Supported Chains");
        chains_resource.description = Some(
            "Every chain identifier this server can route to, including custom-override chains"
                .to_string(),
        );
        chains_resource.mime_type = Some("application/json".to_string());

        let resources = vec![
            gateways_resource.no_annotation(),
            chains_resource.no_annotation(),
        ];

        Ok(ListResourcesResult {
            resources,
            next_cursor: None,
        })
    }

    async fn read_resource(
        &self,
        request: ReadResourceRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, McpError> {
        let json = match request.uri.as_str() {
            "gateways://all" => serde_json::to_string_pretty(self.facade.catalog().entries())
                .map_err(|e| McpError::internal_error(e.to_string(), None))?,
            "chains://supported" => {
                serde_json::to_string_pretty(&self.facade.list_supported_chains())
                    .map_err(|e| McpError::internal_error(e.to_string(), None))?
            }
            _ => {
                return Err(McpError::invalid_params(
                    format!("Unknown resource URI: {}", request.uri),
                    None,
                ))
            }
        };

        Ok(ReadResourceResult {
            contents: vec![ResourceContents::TextResourceContents {
                uri: request.uri,
                mime_type: Some("application/json".to_string()),
                text: json,
                meta: None,
            }],
        })
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let empty_map = serde_json::Map::new();
        let args = request.arguments.as_ref().unwrap_or(&empty_map);

        match request.name.as_ref() {
            "execute_rpc" => tools::handle_execute_rpc(&self.facade, args).await,
            "list_supported_chains" => {
                tools::handle_list_supported_chains(&self.facade, args).await
            }
            "list_supported_methods" => {
                tools::handle_list_supported_methods(&self.facade, args).await
            }
            other => Err(McpError::invalid_params(
                format!("Unknown tool: {}", other),
                None,
            )),
        }
    }
}
