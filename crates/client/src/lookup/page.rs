//! Generic page card, used when the user page itself is what was asked for.

use super::{FollowUp, Reply, UserLookup, UserRequest};
use crate::html::{escape_formatting, html_to_markdown, html_to_plain};
use crate::render::{DESCRIPTION_LIMIT, FieldValue, PresentationRecord, TITLE_LIMIT, truncate};
use crate::sink::Reaction;
use crate::wiki::SiteInfo;

impl UserLookup {
    /// Card of `req.page`, or `missing` when the page cannot be shown.
    pub(super) fn page_reply(&self, req: &UserRequest, site: Option<&SiteInfo>, missing: Reaction) -> Reply {
        let page = &req.page;
        if page.is_unavailable() {
            return Reply::React(missing);
        }

        let title = match page.display_title() {
            Some(display) => truncate(&html_to_markdown(display), TITLE_LIMIT),
            None => escape_formatting(&page.title),
        };

        let mut record = PresentationRecord {
            author: site.map(|s| s.sitename.clone()),
            title,
            link: req.wiki.to_link(&page.title, &req.querystring, &req.fragment, site),
            ..Default::default()
        };

        if let Some(extract) = page.extract.as_deref() {
            let fragment = (!req.fragment.is_empty()).then_some(req.fragment.as_str());
            let desc = self.extractor.extract(extract, fragment);
            if !desc.lead.is_empty() {
                record.description = Some(desc.lead);
            }
            if let Some((heading, body)) = desc.section {
                record.push_field(heading, FieldValue::text(body), false);
            }
        }
        if let Some(description) = page.description() {
            record.description = Some(truncate(&html_to_plain(description), DESCRIPTION_LIMIT));
        }

        let logo = site.and_then(|s| req.wiki.logo_url(s));
        record.thumbnail = page.image().map(str::to_string).or_else(|| logo.clone());

        let thumbnail = if site.is_some_and(|s| s.mainpage == page.title) { None } else { logo };
        let follow_up = FollowUp::ParsePage { title: page.title.clone(), thumbnail };

        self.message(req, record, Some(follow_up))
    }
}
