//! Client code for wikicard.
//!
//! This crate provides the MediaWiki API client, subject classification,
//! the user/IP lookup and the embed / plaintext renderer shared by the
//! server and any chat front-end.

pub mod block;
pub mod extract;
pub mod facts;
pub mod html;
pub mod lookup;
pub mod profile;
pub mod render;
pub mod sink;
pub mod subject;
pub mod wiki;

pub use extract::{DescriptionExtractor, ExtractDesc, LeadExtractor};
pub use lookup::{FollowUp, Reply, UserLookup, UserRequest};
pub use render::{Embed, Mode, PresentationRecord, Rendered};
pub use sink::{
    FollowUpHandler, MemberDirectory, MessageSink, NoMembers, Reaction, ReactionGuard, SentMessage, SinkError,
};
pub use subject::{Subject, SubjectKind};
pub use wiki::{ClientConfig, PageMeta, SiteInfo, Wiki, WikiClient, WikiError, WikiFamily};
