//! User and IP lookup.
//!
//! A lookup issues one or two sequential API requests and ends in exactly
//! one [`Reply`]: a rendered message, a bare fallback link, or a reaction.
//! Recoverable failures never propagate; they degrade to the fallback link.

mod account;
mod address;
mod page;

use std::sync::Arc;

use serde::Serialize;
use wikicard_core::{Gender, Locale, SiteSnapshot};

use crate::extract::{DescriptionExtractor, LeadExtractor};
use crate::html::html_to_plain;
use crate::render::{DESCRIPTION_LIMIT, Mode, Pending, PresentationRecord, Rendered, render, truncate};
use crate::sink::{FollowUpHandler, MemberDirectory, MessageSink, NoMembers, Reaction, ReactionGuard, SinkError};
use crate::subject::Subject;
use crate::wiki::{PageMeta, SiteInfo, Wiki, WikiClient};

/// Marker shown in front of the pending-enrichment line by default.
pub const DEFAULT_LOADING_MARKER: &str = "<a:loading:641343250661113886>";

/// Everything the command layer resolved before the lookup.
#[derive(Debug, Clone)]
pub struct UserRequest {
    pub wiki: Wiki,
    /// User namespace prefix, e.g. `User:`.
    pub namespace: String,
    /// Contributions prefix, e.g. `Special:Contributions/`.
    pub contribs: String,
    pub username: String,
    /// Query string appended to generated links.
    pub querystring: String,
    /// Section of the user page; non-empty turns the reply into a page card.
    pub fragment: String,
    /// Metadata of the user page as already fetched by the caller.
    pub page: PageMeta,
    /// Wrapped around the message text, e.g. `||`.
    pub spoiler: String,
    pub mode: Mode,
    /// Offer the deferred global-block or page-parse enrichment.
    pub enrich: bool,
}

impl UserRequest {
    pub fn new(wiki: Wiki, username: impl Into<String>) -> Self {
        let username = username.into();
        Self {
            page: PageMeta::titled(format!("User:{username}")),
            wiki,
            namespace: "User:".to_string(),
            contribs: "Special:Contributions/".to_string(),
            username,
            querystring: String::new(),
            fragment: String::new(),
            spoiler: String::new(),
            mode: Mode::Embed,
            enrich: false,
        }
    }
}

/// Enrichment run after the reply is sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FollowUp {
    /// Parse the page and add its infobox image.
    ParsePage { title: String, thumbnail: Option<String> },
    /// Look up network-wide blocks of the subject.
    GlobalBlock { username: String, gender: Gender },
}

/// Outcome of a lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Message { record: PresentationRecord, rendered: Rendered, follow_up: Option<FollowUp> },
    /// Bare link, sent as an error reply.
    Fallback(String),
    React(Reaction),
}

/// Runs lookups against one site registry snapshot.
#[derive(Clone)]
pub struct UserLookup {
    client: WikiClient,
    locale: Arc<dyn Locale>,
    sites: SiteSnapshot,
    extractor: Arc<dyn DescriptionExtractor>,
    members: Arc<dyn MemberDirectory>,
    loading_marker: String,
}

impl UserLookup {
    pub fn new(client: WikiClient, locale: Arc<dyn Locale>, sites: SiteSnapshot) -> Self {
        Self {
            client,
            locale,
            sites,
            extractor: Arc::new(LeadExtractor),
            members: Arc::new(NoMembers),
            loading_marker: DEFAULT_LOADING_MARKER.to_string(),
        }
    }

    pub fn with_extractor(mut self, extractor: Arc<dyn DescriptionExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn with_members(mut self, members: Arc<dyn MemberDirectory>) -> Self {
        self.members = members;
        self
    }

    pub fn with_loading_marker(mut self, marker: impl Into<String>) -> Self {
        self.loading_marker = marker.into();
        self
    }

    /// Run the lookup without sending anything.
    pub async fn run(&self, req: &UserRequest) -> Reply {
        let subject = Subject::classify(req.username.trim());
        tracing::debug!(wiki = req.wiki.as_str(), subject = %subject.raw, kind = ?subject.kind, "user lookup");

        if subject.is_ip() { self.run_address(req, &subject).await } else { self.run_account(req).await }
    }

    /// Deliver a reply and start its follow-up, if any.
    pub async fn respond(
        &self, reply: Reply, sink: &dyn MessageSink, follow_ups: Option<&dyn FollowUpHandler>,
    ) -> Result<(), SinkError> {
        match reply {
            Reply::Message { record, rendered, follow_up } => {
                let sent = sink.send_reply(&rendered.text, rendered.embed.as_ref()).await?;
                if let (Some(follow_up), Some(handler)) = (follow_up, follow_ups) {
                    handler.run(sent, follow_up, record).await;
                }
            }
            Reply::Fallback(text) => {
                sink.send_reply_error(&text).await?;
            }
            Reply::React(reaction) => sink.react(reaction).await?,
        }
        Ok(())
    }

    /// Run and deliver; the pending reaction is cleared on every exit path.
    pub async fn handle(
        &self, req: &UserRequest, sink: &dyn MessageSink, follow_ups: Option<&dyn FollowUpHandler>,
        reaction: ReactionGuard,
    ) -> Result<Reply, SinkError> {
        let _reaction = reaction;
        let reply = self.run(req).await;
        self.respond(reply.clone(), sink, follow_ups).await?;
        Ok(reply)
    }

    fn fallback(&self, req: &UserRequest, title: &str, site: Option<&SiteInfo>) -> Reply {
        let link = req.wiki.to_link(title, &req.querystring, &req.fragment, site);
        Reply::Fallback(format!("{0}<{link}>{0}", req.spoiler))
    }

    /// Description from the page's own description, else its extract lead.
    fn page_description(&self, page: &PageMeta) -> Option<String> {
        if let Some(description) = page.description() {
            return Some(truncate(&html_to_plain(description), DESCRIPTION_LIMIT));
        }
        let extract = page.extract.as_deref()?;
        let lead = self.extractor.extract(extract, None).lead;
        (!lead.is_empty()).then_some(lead)
    }

    fn pending(&self) -> Pending {
        Pending { marker: self.loading_marker.clone(), text: self.locale.get("user.info.loading", &[]) }
    }

    fn message(&self, req: &UserRequest, record: PresentationRecord, follow_up: Option<FollowUp>) -> Reply {
        let rendered = render(&record, req.mode, &req.spoiler);
        Reply::Message { record, rendered, follow_up }
    }
}
