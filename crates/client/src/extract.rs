//! Description extraction from plain-text page extracts.
//!
//! Extracts come from `prop=extracts&explaintext&exsectionformat=wiki`, so
//! section headings are lines of the form `== Heading ==`.

use crate::html::escape_formatting;
use crate::render::truncate;

/// Maximum length of the lead and of a section body.
pub const EXTRACT_LIMIT: usize = 1000;

/// Summary of a page extract.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractDesc {
    /// Text before the first heading, escaped and truncated.
    pub lead: String,
    /// Heading and body of the section named by the link fragment.
    pub section: Option<(String, String)>,
}

/// Stable extractor trait so the lookup does not depend on one strategy.
pub trait DescriptionExtractor: Send + Sync {
    fn extract(&self, extract: &str, fragment: Option<&str>) -> ExtractDesc;
}

/// Lead paragraph plus an optional section matched by fragment.
#[derive(Debug, Clone, Copy, Default)]
pub struct LeadExtractor;

impl DescriptionExtractor for LeadExtractor {
    fn extract(&self, extract: &str, fragment: Option<&str>) -> ExtractDesc {
        let headings = headings(extract);

        let lead_end = headings.first().map(|h| h.start).unwrap_or(extract.len());
        let lead = truncate(&escape_formatting(extract[..lead_end].trim()), EXTRACT_LIMIT);

        let section = fragment.and_then(|fragment| {
            let wanted = fragment.replace('_', " ");
            let index = headings.iter().position(|h| h.title.eq_ignore_ascii_case(wanted.trim()))?;
            let heading = &headings[index];
            let end = headings[index + 1..]
                .iter()
                .find(|next| next.level <= heading.level)
                .map(|next| next.start)
                .unwrap_or(extract.len());
            let body = extract[heading.end..end].trim();
            if body.is_empty() {
                return None;
            }
            Some((
                truncate(&escape_formatting(heading.title), EXTRACT_LIMIT),
                truncate(&escape_formatting(body), EXTRACT_LIMIT),
            ))
        });

        ExtractDesc { lead, section }
    }
}

struct Heading<'a> {
    title: &'a str,
    level: usize,
    /// Byte offset of the heading line.
    start: usize,
    /// Byte offset just past the heading line.
    end: usize,
}

fn headings(text: &str) -> Vec<Heading<'_>> {
    let mut found = Vec::new();
    let mut offset = 0;

    for line in text.split_inclusive('\n') {
        let start = offset;
        offset += line.len();

        let trimmed = line.trim();
        let level = trimmed.chars().take_while(|&c| c == '=').count();
        if level < 2 || !trimmed.ends_with(&"=".repeat(level)) || trimmed.len() <= level * 2 {
            continue;
        }

        let title = trimmed[level..trimmed.len() - level].trim();
        if !title.is_empty() {
            found.push(Heading { title, level, start, end: offset });
        }
    }

    found
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXTRACT: &str = "Alice is an editor.\nShe likes *stars*.\n\n\
        == Projects ==\nMaintains the mod list.\n\n\
        === Old ===\nRetired work.\n\n\
        == Contact ==\nUse the talk page.";

    #[test]
    fn test_lead_only() {
        let desc = LeadExtractor.extract(EXTRACT, None);
        assert_eq!(desc.lead, "Alice is an editor.\nShe likes \\*stars\\*.");
        assert!(desc.section.is_none());
    }

    #[test]
    fn test_section_by_fragment() {
        let desc = LeadExtractor.extract(EXTRACT, Some("projects"));
        let (title, body) = desc.section.unwrap();
        assert_eq!(title, "Projects");
        assert_eq!(body, "Maintains the mod list.\n\n=== Old ===\nRetired work.");
    }

    #[test]
    fn test_section_fragment_with_underscores() {
        let text = "Lead.\n== Talk page ==\nBody.";
        let desc = LeadExtractor.extract(text, Some("Talk_page"));
        assert_eq!(desc.section, Some(("Talk page".to_string(), "Body.".to_string())));
    }

    #[test]
    fn test_unknown_fragment() {
        let desc = LeadExtractor.extract(EXTRACT, Some("Nope"));
        assert!(desc.section.is_none());
    }

    #[test]
    fn test_no_headings() {
        let desc = LeadExtractor.extract("Just a lead.", Some("x"));
        assert_eq!(desc.lead, "Just a lead.");
        assert!(desc.section.is_none());
    }

    #[test]
    fn test_lead_truncated() {
        let long = "a".repeat(1500);
        let desc = LeadExtractor.extract(&long, None);
        assert_eq!(desc.lead.chars().count(), EXTRACT_LIMIT + 1);
        assert!(desc.lead.ends_with('…'));
    }
}
