//! Minimal wikitext for block reasons: internal and external links.

use std::sync::LazyLock;

use regex::Regex;

use super::Inline;
use crate::html::escape_formatting;
use crate::wiki::{SiteInfo, Wiki};

static LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[\[([^\[\]|]+)(?:\|([^\[\]]*))?\]\]|\[((?:https?:)?//[^\s\[\]]+)(?:\s+([^\]]*))?\]").unwrap()
});

/// Split `text` into escaped text runs and links.
pub fn parse(text: &str, wiki: &Wiki, site: Option<&SiteInfo>) -> Vec<Inline> {
    let mut items = Vec::new();
    let mut last = 0;

    for caps in LINK.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        push_text(&mut items, &text[last..whole.start()]);
        last = whole.end();

        if let Some(target) = caps.get(1) {
            let target = target.as_str().trim();
            let label = caps
                .get(2)
                .map(|m| m.as_str().trim())
                .filter(|label| !label.is_empty())
                .unwrap_or(target);
            let (title, fragment) = target.split_once('#').unwrap_or((target, ""));
            let href = wiki.to_markdown_link(title.trim_start_matches(':'), "", fragment, site);
            items.push(Inline::link(escape_formatting(label), href));
        } else if let Some(url) = caps.get(3) {
            let url = url.as_str();
            let href = if url.starts_with("//") { format!("https:{url}") } else { url.to_string() };
            let label = caps.get(4).map(|m| m.as_str().trim()).filter(|label| !label.is_empty()).unwrap_or(url);
            items.push(Inline::link(escape_formatting(label), href.replace('(', "%28").replace(')', "%29")));
        }
    }

    push_text(&mut items, &text[last..]);
    items
}

fn push_text(items: &mut Vec<Inline>, text: &str) {
    if !text.is_empty() {
        items.push(Inline::Text(escape_formatting(text)));
    }
}
