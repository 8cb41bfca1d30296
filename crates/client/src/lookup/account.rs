//! Registered account lookups.

use chrono::Utc;

use super::{FollowUp, Reply, UserLookup, UserRequest};
use crate::facts::UserFacts;
use crate::html::escape_formatting;
use crate::profile::{fandom_profile, gamepedia_profile};
use crate::render::{FieldValue, Inline, PresentationRecord};
use crate::sink::Reaction;
use crate::wiki::response::UsersQuery;
use crate::wiki::{WikiError, WikiFamily};

const MANAGER_MESSAGE: &str = "custom-Wiki_Manager";

impl UserLookup {
    pub(super) async fn run_account(&self, req: &UserRequest) -> Reply {
        let result = self
            .client
            .query::<UsersQuery>(
                &req.wiki,
                &[
                    ("meta", "allmessages|siteinfo"),
                    ("ammessages", MANAGER_MESSAGE),
                    ("amenableparser", "true"),
                    ("siprop", "general"),
                    ("list", "users"),
                    ("usprop", "blockinfo|groups|groupmemberships|editcount|registration|gender"),
                    ("ususers", req.username.as_str()),
                ],
            )
            .await
            .and_then(|envelope| envelope.query.ok_or(WikiError::MissingKey("query")));

        let query = match result {
            Ok(query) => query,
            Err(e) => {
                tracing::warn!("error while getting user {} on {}: {e}", req.username, req.wiki.as_str());
                return self.fallback(req, &format!("{}{}", req.namespace, req.username), None);
            }
        };
        let site = &query.general;

        let Some(user) = query.users.as_ref().and_then(|users| users.first()) else {
            tracing::warn!("no users in the response for {} on {}", req.username, req.wiki.as_str());
            return self.fallback(req, &format!("{}{}", req.namespace, req.username), None);
        };
        if user.missing || user.invalid || !req.fragment.is_empty() {
            return self.page_reply(req, Some(site), Reaction::Shrug);
        }

        let manager_message = query
            .allmessages
            .iter()
            .find(|m| m.name == MANAGER_MESSAGE)
            .and_then(|m| m.content.as_deref());

        let mut facts = UserFacts::from_account(user, &site.servername, manager_message, &self.sites, Utc::now());

        let profile = match (req.wiki.family(), facts.user_id) {
            (WikiFamily::Gamepedia, _) => {
                Some(gamepedia_profile(&self.client, &req.wiki, &facts.name, &self.sites, self.members.as_ref()).await)
            }
            (WikiFamily::Fandom, Some(user_id)) => {
                Some(fandom_profile(&self.client, &req.wiki, user_id, self.members.as_ref()).await)
            }
            _ => None,
        };
        match profile {
            Some(Ok(extras)) => facts.profile = extras,
            Some(Err(e)) => {
                tracing::warn!("error while getting the profile of {} on {}: {e}", facts.name, req.wiki.as_str())
            }
            None => {}
        }

        let mut record = PresentationRecord {
            author: Some(site.sitename.clone()),
            title: escape_formatting(&facts.name),
            link: req.wiki.to_link(&format!("{}{}", req.namespace, facts.name), &req.querystring, "", Some(site)),
            thumbnail: facts.profile.avatar.clone().or_else(|| req.wiki.logo_url(site)),
            description: self.page_description(&req.page).or_else(|| facts.profile.bio.clone()),
            ..Default::default()
        };

        let contribs_link = req.wiki.to_markdown_link(&format!("{}{}", req.contribs, facts.name), "", "", Some(site));
        record.push_field(
            self.locale.get("user.info.editcount", &[]),
            FieldValue::Line(vec![Inline::link(facts.edit_count.to_string(), contribs_link)]),
            true,
        );

        let mut groups: Vec<Inline> = facts
            .groups
            .iter()
            .map(|group| {
                let label = self.locale.group(&group.name, facts.gender);
                if group.highlighted { Inline::Strong(label) } else { Inline::Text(label) }
            })
            .collect();
        if groups.is_empty() {
            groups.push(Inline::Text(self.locale.group("user", facts.gender)));
        }
        record.push_field(self.locale.get("user.info.group", &[]), FieldValue::List(groups), true);

        record.push_field(
            self.locale.get("user.info.gender", &[]),
            FieldValue::text(self.locale.get(&format!("user.gender.{}", facts.gender.as_str()), &[])),
            true,
        );

        let registration = match &facts.registration {
            Some(instant) => self.locale.format_date(instant),
            None => self.locale.get("user.info.unknown", &[]),
        };
        record.push_field(self.locale.get("user.info.registration", &[]), FieldValue::text(registration), true);

        if let Some(discord) = &facts.profile.discord {
            record.push_field(self.locale.get("user.info.discord", &[]), FieldValue::text(discord.clone()), true);
        }
        if let Some(favorite) = &facts.profile.favorite_site {
            let inline = Inline::Site {
                name: escape_formatting(&favorite.display_name),
                url: format!("https://{}/", favorite.domain),
            };
            record.push_field(self.locale.get("user.info.favwiki", &[]), FieldValue::Line(vec![inline]), true);
        }
        if let (Some(posts), Some(user_id)) = (&facts.profile.posts, facts.user_id) {
            let inline = Inline::link(posts.clone(), format!("{}f/u/{user_id}", req.wiki.as_str()));
            record.push_field(self.locale.get("user.info.postcount", &[]), FieldValue::Line(vec![inline]), true);
        }

        record.notices = facts
            .blocks
            .iter()
            .map(|block| block.notice(self.locale.as_ref(), facts.gender, &req.wiki, Some(site)))
            .collect();

        let mut follow_up = None;
        if req.enrich {
            if req.wiki.family().has_global_blocks() {
                record.pending = Some(self.pending());
            }
            follow_up = Some(FollowUp::GlobalBlock { username: facts.name.clone(), gender: facts.gender });
        }

        self.message(req, record, follow_up)
    }
}
