//! wiki_user tool implementation.
//!
//! Resolves the user page, runs the lookup and returns what a chat
//! front-end would have delivered.

use std::sync::Mutex;

use async_trait::async_trait;
use rmcp::{ErrorData as McpError, model::*};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use wikicard_client::render::Embed;
use wikicard_client::{
    FollowUp, MessageSink, Mode, PageMeta, Reaction, ReactionGuard, Reply, SentMessage, SinkError, UserRequest,
    Wiki,
};
use wikicard_core::Error;

use crate::handler::AppState;

/// Input parameters for wiki_user tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct WikiUserParams {
    /// Base URL of the wiki, e.g. "https://minecraft.fandom.com/".
    pub wiki: String,

    /// Account name, IP address or CIDR range.
    pub username: String,

    /// Presentation mode: "embed" (default) or "plain".
    #[serde(default)]
    pub mode: ModeParam,

    /// Localized user namespace prefix (default: "User:").
    #[serde(default)]
    pub namespace: Option<String>,

    /// Localized contributions prefix (default: "Special:Contributions/").
    #[serde(default)]
    pub contribs: Option<String>,

    /// Section of the user page; turns the reply into a page card.
    #[serde(default)]
    pub fragment: Option<String>,

    /// Query string appended to generated links.
    #[serde(default)]
    pub querystring: Option<String>,

    /// Offer the deferred global-block or page-parse follow-up.
    #[serde(default)]
    pub enrich: bool,
}

/// Presentation mode accepted by the tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ModeParam {
    #[default]
    Embed,
    Plain,
}

impl From<ModeParam> for Mode {
    fn from(mode: ModeParam) -> Self {
        match mode {
            ModeParam::Embed => Mode::Embed,
            ModeParam::Plain => Mode::Plain,
        }
    }
}

/// Output structure for wiki_user tool.
#[derive(Debug, Clone, Serialize)]
pub struct WikiUserOutput {
    /// "message", "fallback" or "reaction".
    pub kind: String,
    /// Message text; the bare link for fallbacks.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embed: Option<Embed>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reaction: Option<String>,
    /// Enrichment a front-end would run next.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub follow_up: Option<FollowUp>,
}

/// Sink that keeps the delivered reply instead of posting it.
#[derive(Default)]
struct CollectingSink {
    delivered: Mutex<Option<WikiUserOutput>>,
}

impl CollectingSink {
    fn deliver(&self, output: WikiUserOutput) -> Result<(), SinkError> {
        let mut delivered = self.delivered.lock().map_err(|e| SinkError::Delivery(e.to_string()))?;
        *delivered = Some(output);
        Ok(())
    }

    fn into_output(self) -> Option<WikiUserOutput> {
        self.delivered.into_inner().ok().flatten()
    }
}

#[async_trait]
impl MessageSink for CollectingSink {
    async fn send_reply(&self, text: &str, embed: Option<&Embed>) -> Result<SentMessage, SinkError> {
        self.deliver(WikiUserOutput {
            kind: "message".into(),
            text: Some(text.to_string()),
            embed: embed.cloned(),
            reaction: None,
            follow_up: None,
        })?;
        Ok(SentMessage { id: "message".into() })
    }

    async fn send_reply_error(&self, text: &str) -> Result<SentMessage, SinkError> {
        self.deliver(WikiUserOutput {
            kind: "fallback".into(),
            text: Some(text.to_string()),
            embed: None,
            reaction: None,
            follow_up: None,
        })?;
        Ok(SentMessage { id: "fallback".into() })
    }

    async fn react(&self, reaction: Reaction) -> Result<(), SinkError> {
        self.deliver(WikiUserOutput {
            kind: "reaction".into(),
            text: None,
            embed: None,
            reaction: Some(reaction.emoji().to_string()),
            follow_up: None,
        })
    }
}

/// Implementation of the wiki_user tool.
pub async fn user_impl(state: &AppState, params: WikiUserParams) -> Result<CallToolResult, McpError> {
    let username = params.username.trim();
    if username.is_empty() {
        return Err(Error::InvalidInput("username cannot be empty".into()).into());
    }

    let wiki = Wiki::parse(&params.wiki).map_err(Error::from)?;

    let mut req = UserRequest::new(wiki, username);
    req.mode = params.mode.into();
    req.enrich = params.enrich;
    if let Some(namespace) = params.namespace.filter(|n| !n.is_empty()) {
        req.namespace = namespace;
    }
    if let Some(contribs) = params.contribs.filter(|c| !c.is_empty()) {
        req.contribs = contribs;
    }
    req.fragment = params.fragment.unwrap_or_default();
    req.querystring = params.querystring.unwrap_or_default();

    let title = format!("{}{}", req.namespace, req.username);
    req.page = match state.client.page_meta(&req.wiki, &title).await {
        Ok(page) => page,
        Err(e) => {
            tracing::debug!("no page metadata for {title} on {}: {e}", req.wiki.as_str());
            PageMeta::titled(title)
        }
    };

    let sink = CollectingSink::default();
    let reply = state
        .lookup()
        .await
        .handle(&req, &sink, None, ReactionGuard::none())
        .await
        .map_err(Error::from)?;

    let mut output = sink
        .into_output()
        .ok_or_else(|| Error::Delivery("lookup delivered nothing".into()))?;
    if let Reply::Message { follow_up, .. } = reply {
        output.follow_up = follow_up;
    }

    Ok(CallToolResult::success(vec![Content::text(
        serde_json::to_string_pretty(&output).unwrap_or_default(),
    )]))
}
