//! IP address and range lookups.

use chrono::Utc;
use wikicard_core::Gender;

use super::{FollowUp, Reply, UserLookup, UserRequest};
use crate::block::BlockRecord;
use crate::facts::UserFacts;
use crate::html::escape_formatting;
use crate::render::{FieldValue, Inline, PresentationRecord};
use crate::sink::Reaction;
use crate::subject::Subject;
use crate::wiki::WikiError;
use crate::wiki::response::{ApiEnvelope, BlocksQuery, ContribsQuery};

impl UserLookup {
    pub(super) async fn run_address(&self, req: &UserRequest, subject: &Subject) -> Reply {
        let blocks = self
            .client
            .query::<BlocksQuery>(
                &req.wiki,
                &[
                    ("meta", "siteinfo"),
                    ("siprop", "general"),
                    ("list", "blocks"),
                    ("bkprop", "user|by|timestamp|expiry|reason"),
                    ("bkip", subject.raw.as_str()),
                ],
            )
            .await
            .and_then(|envelope| {
                envelope
                    .query
                    .filter(|q| q.blocks.is_some())
                    .ok_or(WikiError::MissingKey("query.blocks"))
            });

        let unsupported = blocks
            .as_ref()
            .err()
            .and_then(WikiError::api_code)
            .is_some_and(|code| code == "param_ip" || code == "cidrtoobroad");
        if unsupported || !req.fragment.is_empty() {
            let site = blocks.as_ref().ok().map(|q| &q.general);
            return self.page_reply(req, site, Reaction::Error);
        }

        let query = match blocks {
            Ok(query) => query,
            Err(e) => {
                tracing::warn!("error while getting blocks of {} on {}: {e}", subject.raw, req.wiki.as_str());
                let namespace = if req.page.no_redirect { &req.namespace } else { &req.contribs };
                return self.fallback(req, &format!("{namespace}{}", subject.raw), None);
            }
        };
        let site = query.general;
        let blocks: Vec<BlockRecord> = query
            .blocks
            .unwrap_or_default()
            .iter()
            .map(BlockRecord::from_list_entry)
            .collect();

        let namespace = if req.page.no_redirect && req.page.is_unavailable() { &req.namespace } else { &req.contribs };

        let (param, value) = subject.contribs_param();
        let contribs = self
            .client
            .query::<ContribsQuery>(
                &req.wiki,
                &[("list", "usercontribs"), ("ucprop", ""), ("uclimit", "50"), (param, value)],
            )
            .await
            .and_then(|envelope: ApiEnvelope<ContribsQuery>| {
                let more = envelope.continuation.is_some();
                envelope
                    .query
                    .and_then(|q| q.usercontribs)
                    .map(|contribs| (contribs.len(), more))
                    .ok_or(WikiError::MissingKey("query.usercontribs"))
            });

        let (count, more) = match contribs {
            Ok(counted) => counted,
            Err(e) if e.api_code() == Some("baduser_ucuser") => return Reply::React(Reaction::Error),
            Err(e) => {
                tracing::warn!("error while getting contributions of {} on {}: {e}", subject.raw, req.wiki.as_str());
                return self.fallback(req, &format!("{namespace}{}", subject.raw), Some(&site));
            }
        };

        let facts = UserFacts::from_address(subject, count, more, blocks, Utc::now());

        let mut record = PresentationRecord {
            author: Some(site.sitename.clone()),
            title: escape_formatting(&facts.name),
            link: req.wiki.to_link(&format!("{namespace}{}", facts.name), &req.querystring, &req.fragment, Some(&site)),
            thumbnail: req.wiki.logo_url(&site),
            description: self.page_description(&req.page),
            ..Default::default()
        };

        let contribs_link = req.wiki.to_markdown_link(&format!("{}{}", req.contribs, facts.name), "", "", Some(&site));
        record.push_field(
            self.locale.get("user.info.editcount", &[]),
            FieldValue::Line(vec![Inline::link(facts.edit_count.to_string(), contribs_link)]),
            false,
        );

        record.notices = facts
            .blocks
            .iter()
            .map(|block| block.notice(self.locale.as_ref(), Gender::Unknown, &req.wiki, Some(&site)))
            .collect();

        let mut follow_up = None;
        if req.enrich && req.wiki.family().has_global_blocks() {
            record.pending = Some(self.pending());
            follow_up = Some(FollowUp::GlobalBlock { username: facts.name.clone(), gender: Gender::Unknown });
        }

        self.message(req, record, follow_up)
    }
}
