//! HTML fragment to chat text conversion.
//!
//! Wiki display titles and page descriptions arrive as HTML fragments. They
//! are parsed with the tolerant html5ever tree builder behind `scraper`, so
//! unclosed or stray tags never fail, and walked once in document order:
//!
//! - every tag is removed, its text kept
//! - in markdown mode `<b>`, `<i>`, `<s>` and `<u>` become `**`, `*`, `~~`
//!   and `__` around their content
//! - entities are decoded by the parser
//! - every text node is escaped with [`escape_formatting`]

use scraper::{ElementRef, Html, Node};

/// Output flavour of [`convert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextMode {
    Plain,
    Markdown,
}

/// Backslash-escape characters the chat platform treats as formatting.
pub fn escape_formatting(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(ch, '\\' | '*' | '_' | '~' | '`' | '|' | '<' | '>' | '@') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

pub fn convert(html: &str, mode: TextMode) -> String {
    let fragment = Html::parse_fragment(html);
    let mut out = String::new();
    walk(fragment.root_element(), mode, &mut out);
    out
}

pub fn html_to_markdown(html: &str) -> String {
    convert(html, TextMode::Markdown)
}

pub fn html_to_plain(html: &str) -> String {
    convert(html, TextMode::Plain)
}

fn walk(element: ElementRef<'_>, mode: TextMode, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(&escape_formatting(text)),
            Node::Element(_) => {
                let Some(el) = ElementRef::wrap(child) else { continue };
                if el.value().name() == "br" {
                    out.push('\n');
                    continue;
                }

                match delimiter(el.value().name(), mode) {
                    Some(marker) => {
                        out.push_str(marker);
                        walk(el, mode, out);
                        out.push_str(marker);
                    }
                    None => walk(el, mode, out),
                }
            }
            _ => {}
        }
    }
}

fn delimiter(tag: &str, mode: TextMode) -> Option<&'static str> {
    if mode == TextMode::Plain {
        return None;
    }
    match tag {
        "b" => Some("**"),
        "i" => Some("*"),
        "s" => Some("~~"),
        "u" => Some("__"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markdown_delimiters() {
        assert_eq!(html_to_markdown("<b>bold</b> and <i>it</i>"), "**bold** and *it*");
        assert_eq!(html_to_markdown("<s>gone</s><u>under</u>"), "~~gone~~__under__");
    }

    #[test]
    fn test_plain_drops_delimiters() {
        assert_eq!(html_to_plain("<b>bold</b> and <i>it</i>"), "bold and it");
    }

    #[test]
    fn test_unsupported_tags_keep_text() {
        assert_eq!(html_to_markdown("<span class=\"x\">Main <a href=\"/y\">Page</a></span>"), "Main Page");
    }

    #[test]
    fn test_text_is_escaped() {
        assert_eq!(html_to_markdown("<b>a_b</b> *c*"), "**a\\_b** \\*c\\*");
        assert_eq!(html_to_plain("@everyone"), "\\@everyone");
    }

    #[test]
    fn test_entities_decoded_then_escaped() {
        assert_eq!(html_to_plain("Tom &amp; Jerry &lt;3"), "Tom & Jerry \\<3");
    }

    #[test]
    fn test_malformed_input_never_fails() {
        assert_eq!(html_to_markdown("<b>open"), "**open**");
        assert_eq!(html_to_markdown("close</i> me"), "close me");
    }

    #[test]
    fn test_escape_formatting_all_characters() {
        assert_eq!(escape_formatting("\\*_~`|<>@"), "\\\\\\*\\_\\~\\`\\|\\<\\>\\@");
    }
}
