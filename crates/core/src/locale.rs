//! Locale provider.
//!
//! The bot's full translation tables live elsewhere; this module defines the
//! narrow interface the lookup pipeline needs and ships the English table it
//! falls back to.

use std::collections::HashMap;
use std::fmt::Write;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default display format for instants, e.g. `March 4, 2021, 17:05 UTC`.
pub const DEFAULT_DATE_FORMAT: &str = "%B %-d, %Y, %H:%M UTC";

/// Grammatical gender of a wiki account as reported by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    #[default]
    #[serde(other)]
    Unknown,
}

impl Gender {
    /// Parse the `gender` field of `list=users`; anything unexpected is unknown.
    pub fn from_api(value: Option<&str>) -> Self {
        match value {
            Some("male") => Gender::Male,
            Some("female") => Gender::Female,
            _ => Gender::Unknown,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Unknown => "unknown",
        }
    }
}

/// Localized message lookup.
pub trait Locale: Send + Sync {
    /// Look up `key` and substitute `$1`, `$2`, ... with `args`.
    ///
    /// Placeholders without a matching argument are left in place so later
    /// stages can fill them.
    fn get(&self, key: &str, args: &[&str]) -> String;

    /// chrono format string used for instants.
    fn date_format(&self) -> &str;

    /// Format an instant with [`Locale::date_format`].
    fn format_date(&self, instant: &DateTime<Utc>) -> String {
        let mut out = String::new();
        if write!(out, "{}", instant.format(self.date_format())).is_err() {
            return instant.to_rfc3339();
        }
        out
    }

    /// Display label of a user group, inflected for `gender`.
    fn group(&self, name: &str, gender: Gender) -> String {
        self.get(&format!("user.groups.{name}"), &[gender.as_str()])
    }
}

/// Replace `$N` placeholders using `arg(N)`.
///
/// `arg` returning `None` keeps the placeholder verbatim.
pub fn substitute(template: &str, mut arg: impl FnMut(usize) -> Option<String>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.char_indices().peekable();

    while let Some((idx, ch)) = chars.next() {
        if ch != '$' {
            out.push(ch);
            continue;
        }

        let start = idx + 1;
        let mut end = start;
        while let Some(&(pos, digit)) = chars.peek() {
            if !digit.is_ascii_digit() {
                break;
            }
            end = pos + digit.len_utf8();
            chars.next();
        }

        let replacement = template[start..end].parse::<usize>().ok().and_then(&mut arg);
        match replacement {
            Some(value) => out.push_str(&value),
            None => out.push_str(&template[idx..end]),
        }
    }

    out
}

const MESSAGES: &[(&str, &str)] = &[
    ("user.info.editcount", "Edit count:"),
    ("user.info.group", "Group:"),
    ("user.info.gender", "Gender:"),
    ("user.info.registration", "Registration date:"),
    ("user.info.discord", "Discord:"),
    ("user.info.favwiki", "Favorite wiki:"),
    ("user.info.postcount", "Posts:"),
    ("user.info.loading", "Loading further information…"),
    ("user.info.unknown", "Unknown"),
    ("user.gender.male", "Male"),
    ("user.gender.female", "Female"),
    ("user.gender.unknown", "Unknown"),
    ("user.block.header", "$1 is blocked"),
    ("user.block.text", "Blocked on $1 until $2 by $3 with the reason: $4"),
    ("user.block.noreason", "Blocked on $1 until $2 by $3."),
    ("user.block.until_infinity", "the end of time"),
    ("user.groups.hydra_staff", "Staff"),
    ("user.groups.staff", "Staff"),
    ("user.groups.sysadmin", "System administrator"),
    ("user.groups.wiki-manager", "Wiki manager"),
    ("user.groups.wiki_manager", "Wiki manager"),
    ("user.groups.helper", "Helper"),
    ("user.groups.wiki_guardian", "Wiki guardian"),
    ("user.groups.soap", "SOAP"),
    ("user.groups.vstf", "VSTF"),
    ("user.groups.global_bureaucrat", "Global bureaucrat"),
    ("user.groups.bureaucrat", "Bureaucrat"),
    ("user.groups.global_sysop", "Global administrator"),
    ("user.groups.sysop", "Administrator"),
    ("user.groups.content-moderator", "Content moderator"),
    ("user.groups.threadmoderator", "Discussions moderator"),
    ("user.groups.chatmoderator", "Chat moderator"),
    ("user.groups.interface-admin", "Interface administrator"),
    ("user.groups.hydra_admin", "Hydra administrator"),
    ("user.groups.global_bot", "Global bot"),
    ("user.groups.bot", "Bot"),
    ("user.groups.global_rollback", "Global rollback"),
    ("user.groups.rollback", "Rollback"),
    ("user.groups.autoconfirmed", "Autoconfirmed user"),
    ("user.groups.user", "User"),
];

/// Built-in English message table.
#[derive(Debug, Clone)]
pub struct EnglishLocale {
    messages: HashMap<&'static str, &'static str>,
    date_format: String,
}

impl EnglishLocale {
    pub fn new() -> Self {
        Self { messages: MESSAGES.iter().copied().collect(), date_format: DEFAULT_DATE_FORMAT.to_string() }
    }

    /// Use a different chrono format for instants.
    pub fn with_date_format(mut self, format: impl Into<String>) -> Self {
        self.date_format = format.into();
        self
    }
}

impl Default for EnglishLocale {
    fn default() -> Self {
        Self::new()
    }
}

impl Locale for EnglishLocale {
    fn get(&self, key: &str, args: &[&str]) -> String {
        let Some(template) = self.messages.get(key) else {
            tracing::debug!(key, "missing locale message");
            return key.to_string();
        };
        substitute(template, |n| n.checked_sub(1).and_then(|i| args.get(i)).map(|s| (*s).to_string()))
    }

    fn date_format(&self) -> &str {
        &self.date_format
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_get_substitutes_arguments() {
        let locale = EnglishLocale::new();
        assert_eq!(locale.get("user.block.header", &["Alice", "female"]), "Alice is blocked");
    }

    #[test]
    fn test_get_keeps_unfilled_placeholders() {
        let locale = EnglishLocale::new();
        let text = locale.get("user.block.text", &["yesterday", "tomorrow"]);
        assert_eq!(text, "Blocked on yesterday until tomorrow by $3 with the reason: $4");
    }

    #[test]
    fn test_get_missing_key_returns_key() {
        let locale = EnglishLocale::new();
        assert_eq!(locale.get("user.groups.nonexistent", &[]), "user.groups.nonexistent");
    }

    #[test]
    fn test_group_label() {
        let locale = EnglishLocale::new();
        assert_eq!(locale.group("sysop", Gender::Female), "Administrator");
    }

    #[test]
    fn test_substitute_multi_digit_and_lone_dollar() {
        let text = substitute("$10 costs $ and $2", |n| (n == 10).then(|| "ten".to_string()));
        assert_eq!(text, "ten costs $ and $2");
    }

    #[test]
    fn test_substitute_does_not_rescan_values() {
        let text = substitute("$1 $2", |n| Some(if n == 1 { "$2".to_string() } else { "x".to_string() }));
        assert_eq!(text, "$2 x");
    }

    #[test]
    fn test_format_date_default() {
        let locale = EnglishLocale::new();
        let instant = Utc.with_ymd_and_hms(2021, 3, 4, 17, 5, 0).unwrap();
        assert_eq!(locale.format_date(&instant), "March 4, 2021, 17:05 UTC");
    }

    #[test]
    fn test_format_date_custom() {
        let locale = EnglishLocale::new().with_date_format("%Y-%m-%d");
        let instant = Utc.with_ymd_and_hms(2021, 3, 4, 17, 5, 0).unwrap();
        assert_eq!(locale.format_date(&instant), "2021-03-04");
    }

    #[test]
    fn test_format_date_invalid_format_falls_back() {
        let locale = EnglishLocale::new().with_date_format("%Q");
        let instant = Utc.with_ymd_and_hms(2021, 3, 4, 17, 5, 0).unwrap();
        assert_eq!(locale.format_date(&instant), "2021-03-04T17:05:00+00:00");
    }

    #[test]
    fn test_gender_from_api() {
        assert_eq!(Gender::from_api(Some("male")), Gender::Male);
        assert_eq!(Gender::from_api(Some("female")), Gender::Female);
        assert_eq!(Gender::from_api(Some("unknown")), Gender::Unknown);
        assert_eq!(Gender::from_api(None), Gender::Unknown);
    }
}
