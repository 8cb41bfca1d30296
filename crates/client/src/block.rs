//! Block status normalization.
//!
//! `list=blocks` entries and the block fields embedded in `list=users`
//! describe the same thing in two shapes; both become a [`BlockRecord`].
//! Activity is derived from the expiry on every call and never stored.

use chrono::{DateTime, NaiveDateTime, Utc};
use wikicard_core::{Gender, Locale};

use crate::html::escape_formatting;
use crate::render::{Inline, wikitext};
use crate::wiki::response::{BlockEntry, UserEntry};
use crate::wiki::{SiteInfo, Wiki};

/// When a block ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiry {
    Indefinite,
    At(DateTime<Utc>),
}

impl Expiry {
    /// Parse `infinity`/`infinite`, ISO 8601, or the compact `YYYYMMDDHHMMSS` form.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw == "infinity" || raw == "infinite" {
            return Some(Expiry::Indefinite);
        }
        parse_instant(raw).map(Expiry::At)
    }
}

fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
        return Some(instant.with_timezone(&Utc));
    }

    let digits = raw.get(..14).filter(|d| d.bytes().all(|b| b.is_ascii_digit()))?;
    NaiveDateTime::parse_from_str(digits, "%Y%m%d%H%M%S").ok().map(|naive| naive.and_utc())
}

/// A block affecting the looked-up subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockRecord {
    /// Blocked user, address or range.
    pub target: String,
    /// Blocking administrator.
    pub by: String,
    pub timestamp: Option<DateTime<Utc>>,
    pub expiry: Option<Expiry>,
    /// Raw wikitext reason; empty reasons are `None`.
    pub reason: Option<String>,
}

impl BlockRecord {
    pub fn from_list_entry(entry: &BlockEntry) -> Self {
        Self {
            target: entry.user.clone(),
            by: entry.by.clone(),
            timestamp: entry.timestamp.as_deref().and_then(parse_instant),
            expiry: entry.expiry.as_deref().and_then(Expiry::parse),
            reason: non_empty(entry.reason.as_deref()),
        }
    }

    /// Block embedded in a `list=users` entry, if the user has one.
    pub fn from_user(user: &UserEntry) -> Option<Self> {
        if user.blockedby.is_none() && user.blockexpiry.is_none() {
            return None;
        }
        Some(Self {
            target: user.name.clone(),
            by: user.blockedby.clone().unwrap_or_default(),
            timestamp: user.blockedtimestamp.as_deref().and_then(parse_instant),
            expiry: user.blockexpiry.as_deref().and_then(Expiry::parse),
            reason: non_empty(user.blockreason.as_deref()),
        })
    }

    /// Indefinite blocks are always active; a block without a readable expiry never is.
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        match self.expiry {
            Some(Expiry::Indefinite) => true,
            Some(Expiry::At(expiry)) => expiry > now,
            None => false,
        }
    }

    /// Localized notice. `$3` (actor) and `$4` (reason) stay in the template
    /// and are filled per presentation mode.
    pub fn notice(&self, locale: &dyn Locale, gender: Gender, wiki: &Wiki, site: Option<&SiteInfo>) -> BlockNotice {
        let header = escape_formatting(&locale.get("user.block.header", &[self.target.as_str(), gender.as_str()]));

        let timestamp = match &self.timestamp {
            Some(instant) => locale.format_date(instant),
            None => locale.get("user.info.unknown", &[]),
        };
        let expiry = match &self.expiry {
            Some(Expiry::Indefinite) => locale.get("user.block.until_infinity", &[]),
            Some(Expiry::At(instant)) => locale.format_date(instant),
            None => locale.get("user.info.unknown", &[]),
        };

        let key = if self.reason.is_some() { "user.block.text" } else { "user.block.noreason" };
        let template = locale.get(key, &[timestamp.as_str(), expiry.as_str()]);

        let by = if self.by.is_empty() {
            Inline::text(locale.get("user.info.unknown", &[]))
        } else {
            Inline::link(
                escape_formatting(&self.by),
                wiki.to_markdown_link(&format!("User:{}", self.by), "", "", site),
            )
        };

        let reason = self.reason.as_deref().map(|reason| wikitext::parse(reason, wiki, site));

        BlockNotice { header, template, by, reason }
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}

/// A block as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockNotice {
    pub header: String,
    /// Localized text with `$3`/`$4` still to be substituted.
    pub template: String,
    pub by: Inline,
    pub reason: Option<Vec<Inline>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use wikicard_core::EnglishLocale;

    fn wiki() -> Wiki {
        Wiki::parse("https://minecraft.gamepedia.com/").unwrap()
    }

    fn entry(expiry: &str, reason: Option<&str>) -> BlockEntry {
        BlockEntry {
            user: "10.0.0.5".into(),
            by: "Bob".into(),
            timestamp: Some("2021-03-04T17:05:00Z".into()),
            expiry: Some(expiry.into()),
            reason: reason.map(str::to_string),
        }
    }

    #[test]
    fn test_expiry_forms() {
        assert_eq!(Expiry::parse("infinity"), Some(Expiry::Indefinite));
        assert_eq!(Expiry::parse("infinite"), Some(Expiry::Indefinite));
        let at = Utc.with_ymd_and_hms(2030, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(Expiry::parse("2030-01-02T03:04:05Z"), Some(Expiry::At(at)));
        assert_eq!(Expiry::parse("20300102030405"), Some(Expiry::At(at)));
        assert_eq!(Expiry::parse("soon"), None);
    }

    #[test]
    fn test_indefinite_always_active() {
        let block = BlockRecord::from_list_entry(&entry("infinity", None));
        let far_future = Utc::now() + Duration::days(365 * 100);
        assert!(block.is_active(Utc::now()));
        assert!(block.is_active(far_future));
    }

    #[test]
    fn test_past_expiry_inactive() {
        let block = BlockRecord::from_list_entry(&entry("2001-01-01T00:00:00Z", None));
        assert!(!block.is_active(Utc::now()));
    }

    #[test]
    fn test_activity_recomputed_per_call() {
        let block = BlockRecord::from_list_entry(&entry("2030-01-01T00:00:00Z", None));
        let before = Utc.with_ymd_and_hms(2029, 12, 31, 0, 0, 0).unwrap();
        let after = Utc.with_ymd_and_hms(2030, 1, 2, 0, 0, 0).unwrap();
        assert!(block.is_active(before));
        assert!(!block.is_active(after));
    }

    #[test]
    fn test_from_user_compact_expiry() {
        let user = UserEntry {
            name: "Alice".into(),
            blockedby: Some("Bob".into()),
            blockedtimestamp: Some("2021-03-04T17:05:00Z".into()),
            blockexpiry: Some("20300102030405".into()),
            blockreason: Some("".into()),
            ..Default::default()
        };
        let block = BlockRecord::from_user(&user).unwrap();
        assert_eq!(block.target, "Alice");
        assert!(block.reason.is_none());
        assert!(matches!(block.expiry, Some(Expiry::At(_))));
    }

    #[test]
    fn test_from_user_not_blocked() {
        assert!(BlockRecord::from_user(&UserEntry { name: "Alice".into(), ..Default::default() }).is_none());
    }

    #[test]
    fn test_notice_without_reason_uses_noreason_template() {
        let locale = EnglishLocale::new();
        let block = BlockRecord::from_list_entry(&entry("infinity", None));
        let notice = block.notice(&locale, Gender::Unknown, &wiki(), None);
        assert_eq!(notice.header, "10.0.0.5 is blocked");
        assert_eq!(notice.template, "Blocked on March 4, 2021, 17:05 UTC until the end of time by $3.");
        assert!(notice.reason.is_none());
        assert_eq!(notice.by, Inline::link("Bob", "https://minecraft.gamepedia.com/index.php?title=User:Bob"));
    }

    #[test]
    fn test_notice_with_reason() {
        let locale = EnglishLocale::new();
        let block = BlockRecord::from_list_entry(&entry("infinity", Some("Spam [[Project:Rules|rules]]")));
        let notice = block.notice(&locale, Gender::Male, &wiki(), None);
        assert!(notice.template.ends_with("by $3 with the reason: $4"));
        assert_eq!(notice.reason.unwrap().len(), 2);
    }

    #[test]
    fn test_header_is_escaped() {
        let locale = EnglishLocale::new();
        let mut block = BlockRecord::from_list_entry(&entry("infinity", None));
        block.target = "Under_score".into();
        let notice = block.notice(&locale, Gender::Unknown, &wiki(), None);
        assert_eq!(notice.header, "Under\\_score is blocked");
    }
}
