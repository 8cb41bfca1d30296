//! MCP server handler implementation.
//!
//! This module defines the main server handler that
//! routes tool calls to the appropriate implementations.
use std::sync::Arc;

use crate::tools::wiki_user::{WikiUserParams, user_impl};

use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};
use wikicard_client::{ClientConfig, UserLookup, WikiClient, WikiError};
use wikicard_core::{AppConfig, EnglishLocale, Locale, SiteRegistry};

/// Shared state behind every tool call.
pub struct AppState {
    pub client: WikiClient,
    pub locale: Arc<dyn Locale>,
    pub sites: SiteRegistry,
    pub loading_marker: String,
}

impl AppState {
    pub fn new(config: &AppConfig, sites: SiteRegistry) -> Result<Self, WikiError> {
        let client = WikiClient::new(&ClientConfig::from(config))?;
        let locale = match &config.date_format {
            Some(format) => EnglishLocale::new().with_date_format(format.clone()),
            None => EnglishLocale::new(),
        };
        Ok(Self { client, locale: Arc::new(locale), sites, loading_marker: config.loading_marker.clone() })
    }

    /// Lookup bound to the current registry snapshot.
    pub async fn lookup(&self) -> UserLookup {
        UserLookup::new(self.client.clone(), self.locale.clone(), self.sites.snapshot().await)
            .with_loading_marker(self.loading_marker.clone())
    }
}

/// The main MCP server handler for wikicard.
#[derive(Clone)]
pub struct WikiCardServer {
    tool_router: ToolRouter<Self>,
    state: Arc<AppState>,
}

/// Tool router implementation using the #[tool_router] macro.
///
/// This macro generates the routing logic that maps tool names to handler methods.
#[tool_router]
impl WikiCardServer {
    /// Create a new server handler.
    pub fn new(config: &AppConfig, sites: SiteRegistry) -> Result<Self, WikiError> {
        let state = AppState::new(config, sites)?;
        Ok(Self { tool_router: Self::tool_router(), state: Arc::new(state) })
    }

    /// Look up a wiki account, IP address or IP range.
    ///
    /// Returns the reply a chat front-end would send: message text plus embed,
    /// a fallback link, or a reaction.
    #[tool(description = "Look up a wiki user, IP address or IP range. Returns an embed or plain-text profile card.")]
    async fn wiki_user(&self, params: Parameters<WikiUserParams>) -> Result<CallToolResult, McpError> {
        user_impl(&self.state, params.0).await
    }
}

impl ServerHandler for WikiCardServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "wikicard-mcp".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}
