//! Chat-platform seams: message sending, reactions, members, follow-ups.

use async_trait::async_trait;

use crate::lookup::FollowUp;
use crate::render::{Embed, PresentationRecord};

/// Errors from delivering a reply.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    /// The platform rejected or dropped the message.
    #[error("delivery failed: {0}")]
    Delivery(String),

    /// Missing permission in the target channel.
    #[error("forbidden: {0}")]
    Forbidden(String),
}

impl From<SinkError> for wikicard_core::Error {
    fn from(err: SinkError) -> Self {
        wikicard_core::Error::Delivery(err.to_string())
    }
}

/// Handle of a sent message, used by follow-ups to edit it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub id: String,
}

/// Reactions the lookup can leave instead of a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reaction {
    /// The platform's custom error emoji.
    Error,
    Shrug,
}

impl Reaction {
    pub fn emoji(self) -> &'static str {
        match self {
            Reaction::Error => "error",
            Reaction::Shrug => "🤷",
        }
    }
}

/// Outgoing side of the conversation.
#[async_trait]
pub trait MessageSink: Send + Sync {
    async fn send_reply(&self, text: &str, embed: Option<&Embed>) -> Result<SentMessage, SinkError>;

    /// Send a reply that reports a failed lookup.
    async fn send_reply_error(&self, text: &str) -> Result<SentMessage, SinkError>;

    async fn react(&self, reaction: Reaction) -> Result<(), SinkError>;
}

/// A "working on it" reaction placed before the lookup started.
pub trait PendingReaction: Send {
    fn clear(self: Box<Self>);
}

/// Clears the pending reaction exactly once, when dropped.
pub struct ReactionGuard(Option<Box<dyn PendingReaction>>);

impl ReactionGuard {
    pub fn new(reaction: Box<dyn PendingReaction>) -> Self {
        Self(Some(reaction))
    }

    pub fn none() -> Self {
        Self(None)
    }
}

impl Drop for ReactionGuard {
    fn drop(&mut self) {
        if let Some(reaction) = self.0.take() {
            reaction.clear();
        }
    }
}

/// Resolves `name#1234` tags to member mentions of the current guild.
pub trait MemberDirectory: Send + Sync {
    fn mention_for(&self, tag: &str) -> Option<String>;
}

/// Directory for contexts without members, e.g. direct messages.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMembers;

impl MemberDirectory for NoMembers {
    fn mention_for(&self, _tag: &str) -> Option<String> {
        None
    }
}

/// Runs deferred enrichment after the reply is out.
#[async_trait]
pub trait FollowUpHandler: Send + Sync {
    async fn run(&self, sent: SentMessage, follow_up: FollowUp, record: PresentationRecord);
}
