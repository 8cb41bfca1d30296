//! Presentation records and their embed / plaintext renderings.
//!
//! A lookup produces one [`PresentationRecord`]; [`render`] turns it into
//! the message text plus an optional embed. Both modes walk the same field
//! list, so values always appear in the same order.
//!
//! ### Embed
//! - Text is the canonical link in angle brackets, wrapped in the spoiler marker.
//! - Fields first, then block notices, then the pending marker (zero-width label).
//! - Field values are capped at [`FIELD_LIMIT`] characters.
//!
//! ### Plaintext
//! - Paragraphs: link, description, `label value` lines, each block notice,
//!   the pending marker.
//! - No markup beyond what the converters already produced.

pub mod wikitext;

use serde::{Deserialize, Serialize};
use wikicard_core::locale::substitute;

use crate::block::BlockNotice;

/// Maximum description length before truncation.
pub const DESCRIPTION_LIMIT: usize = 2000;

/// Maximum field value length before truncation.
pub const FIELD_LIMIT: usize = 2000;

/// Maximum display title length before truncation.
pub const TITLE_LIMIT: usize = 250;

/// Label of the field carrying the pending marker.
const ZERO_WIDTH: &str = "\u{200b}";

/// Keep the first `limit` characters, appending `…` if anything was cut.
pub fn truncate(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => format!("{}…", &text[..idx]),
        None => text.to_string(),
    }
}

/// Presentation mode of the reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Embed,
    Plain,
}

/// Inline content of a field value or block reason.
///
/// Text is stored already escaped; rendering only adds link and emphasis markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    Text(String),
    /// Emphasized in embeds, plain text otherwise.
    Strong(String),
    /// Markdown link in embeds, the text alone otherwise.
    Link { text: String, href: String },
    /// Named site in embeds, the bare URL otherwise.
    Site { name: String, url: String },
}

impl Inline {
    pub fn text(text: impl Into<String>) -> Self {
        Inline::Text(text.into())
    }

    pub fn link(text: impl Into<String>, href: impl Into<String>) -> Self {
        Inline::Link { text: text.into(), href: href.into() }
    }

    fn render_into(&self, mode: Mode, out: &mut String) {
        match (self, mode) {
            (Inline::Text(text), _) => out.push_str(text),
            (Inline::Strong(text), Mode::Embed) => {
                out.push_str("**");
                out.push_str(text);
                out.push_str("**");
            }
            (Inline::Strong(text), Mode::Plain) => out.push_str(text),
            (Inline::Link { text, href }, Mode::Embed) => {
                out.push('[');
                out.push_str(text);
                out.push_str("](");
                out.push_str(href);
                out.push(')');
            }
            (Inline::Link { text, .. }, Mode::Plain) => out.push_str(text),
            (Inline::Site { name, url }, Mode::Embed) => {
                out.push('[');
                out.push_str(name);
                out.push_str("](<");
                out.push_str(url);
                out.push_str(">)");
            }
            (Inline::Site { url, .. }, Mode::Plain) => {
                out.push('<');
                out.push_str(url);
                out.push('>');
            }
        }
    }
}

pub fn render_inlines(items: &[Inline], mode: Mode) -> String {
    let mut out = String::new();
    for item in items {
        item.render_into(mode, &mut out);
    }
    out
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// Inline pieces concatenated.
    Line(Vec<Inline>),
    /// One entry per item, joined by `,\n` in embeds and `, ` in plaintext.
    List(Vec<Inline>),
}

impl FieldValue {
    pub fn text(text: impl Into<String>) -> Self {
        FieldValue::Line(vec![Inline::Text(text.into())])
    }

    fn render(&self, mode: Mode) -> String {
        match self {
            FieldValue::Line(items) => render_inlines(items, mode),
            FieldValue::List(items) => {
                let separator = if mode == Mode::Embed { ",\n" } else { ", " };
                items
                    .iter()
                    .map(|item| render_inlines(std::slice::from_ref(item), mode))
                    .collect::<Vec<_>>()
                    .join(separator)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub label: String,
    pub value: FieldValue,
    pub inline: bool,
}

/// Trailing "loading" line shown while a follow-up is outstanding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pending {
    pub marker: String,
    pub text: String,
}

/// Everything a reply shows, independent of presentation mode.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PresentationRecord {
    /// Site name.
    pub author: Option<String>,
    pub title: String,
    /// Canonical link to the subject.
    pub link: String,
    pub thumbnail: Option<String>,
    /// Already truncated to [`DESCRIPTION_LIMIT`].
    pub description: Option<String>,
    pub fields: Vec<Field>,
    pub notices: Vec<BlockNotice>,
    pub pending: Option<Pending>,
}

impl PresentationRecord {
    pub fn push_field(&mut self, label: impl Into<String>, value: FieldValue, inline: bool) {
        self.fields.push(Field { label: label.into(), value, inline });
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

/// Rich embed payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Embed {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    pub title: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<EmbedField>,
}

/// Message ready to send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rendered {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embed: Option<Embed>,
}

/// Fill a block notice template for `mode`.
fn notice_text(notice: &BlockNotice, mode: Mode) -> String {
    substitute(&notice.template, |n| match n {
        3 => Some(render_inlines(std::slice::from_ref(&notice.by), mode)),
        4 => notice.reason.as_ref().map(|reason| render_inlines(reason, mode)),
        _ => None,
    })
}

pub fn render(record: &PresentationRecord, mode: Mode, spoiler: &str) -> Rendered {
    match mode {
        Mode::Embed => render_embed(record, spoiler),
        Mode::Plain => render_plain(record, spoiler),
    }
}

fn render_embed(record: &PresentationRecord, spoiler: &str) -> Rendered {
    let mut fields: Vec<EmbedField> = record
        .fields
        .iter()
        .map(|field| EmbedField {
            name: field.label.clone(),
            value: truncate(&field.value.render(Mode::Embed), FIELD_LIMIT),
            inline: field.inline,
        })
        .collect();

    fields.extend(record.notices.iter().map(|notice| EmbedField {
        name: notice.header.clone(),
        value: truncate(&notice_text(notice, Mode::Embed), FIELD_LIMIT),
        inline: false,
    }));

    if let Some(pending) = &record.pending {
        fields.push(EmbedField {
            name: ZERO_WIDTH.to_string(),
            value: format!("{} **{}**", pending.marker, pending.text),
            inline: false,
        });
    }

    let embed = Embed {
        author: record.author.clone(),
        title: record.title.clone(),
        url: record.link.clone(),
        description: record.description.clone(),
        thumbnail: record.thumbnail.clone(),
        fields,
    };

    Rendered { text: format!("{spoiler}<{}>{spoiler}", record.link), embed: Some(embed) }
}

fn render_plain(record: &PresentationRecord, spoiler: &str) -> Rendered {
    let mut paragraphs = vec![format!("<{}>", record.link)];

    if let Some(description) = &record.description {
        paragraphs.push(description.clone());
    }

    if !record.fields.is_empty() {
        let lines: Vec<String> = record
            .fields
            .iter()
            .map(|field| format!("{} {}", field.label, field.value.render(Mode::Plain)))
            .collect();
        paragraphs.push(lines.join("\n"));
    }

    for notice in &record.notices {
        paragraphs.push(format!("{}\n{}", notice.header, notice_text(notice, Mode::Plain)));
    }

    if let Some(pending) = &record.pending {
        paragraphs.push(format!("{} {}", pending.marker, pending.text));
    }

    Rendered { text: format!("{spoiler}{}{spoiler}", paragraphs.join("\n\n")), embed: None }
}
