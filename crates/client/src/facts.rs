//! Normalized facts about the looked-up subject.

use std::fmt;

use chrono::{DateTime, Utc};
use wikicard_core::{Gender, SiteSnapshot};

use crate::block::BlockRecord;
use crate::profile::ProfileExtras;
use crate::subject::Subject;
use crate::wiki::response::UserEntry;

/// Groups worth showing, highest precedence first.
pub const USER_GROUPS: &[&str] = &[
    "hydra_staff",
    "staff",
    "sysadmin",
    "wiki-manager",
    "wiki_manager",
    "helper",
    "wiki_guardian",
    "soap",
    "vstf",
    "global_bureaucrat",
    "bureaucrat",
    "global_sysop",
    "sysop",
    "content-moderator",
    "threadmoderator",
    "chatmoderator",
    "interface-admin",
    "hydra_admin",
    "global_bot",
    "bot",
    "global_rollback",
    "rollback",
    "autoconfirmed",
    "user",
];

/// Groups every account holds; shown only when nothing better is.
pub const BASELINE_GROUPS: &[&str] = &["autoconfirmed", "user"];

/// Contribution count, `~N` when over-counted and `N+` when truncated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EditCount {
    pub count: u64,
    pub approximate: bool,
    pub more: bool,
}

impl EditCount {
    pub fn exact(count: u64) -> Self {
        Self { count, approximate: false, more: false }
    }
}

impl fmt::Display for EditCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.approximate {
            f.write_str("~")?;
        }
        write!(f, "{}", self.count)?;
        if self.more {
            f.write_str("+")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayGroup {
    pub name: String,
    /// Confirmed wiki manager of this wiki.
    pub highlighted: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserFacts {
    pub name: String,
    pub user_id: Option<u64>,
    pub gender: Gender,
    pub registration: Option<DateTime<Utc>>,
    pub edit_count: EditCount,
    pub groups: Vec<DisplayGroup>,
    /// Active blocks only.
    pub blocks: Vec<BlockRecord>,
    pub profile: ProfileExtras,
}

impl UserFacts {
    /// Facts of a registered account.
    ///
    /// `manager_message` is the parsed `custom-Wiki_Manager` message of the wiki.
    pub fn from_account(
        user: &UserEntry, servername: &str, manager_message: Option<&str>, sites: &SiteSnapshot, now: DateTime<Utc>,
    ) -> Self {
        let registration = user
            .registration
            .as_deref()
            .and_then(|r| DateTime::parse_from_rfc3339(r).ok())
            .map(|r| r.with_timezone(&Utc));

        let blocks = BlockRecord::from_user(user)
            .filter(|block| block.is_active(now))
            .into_iter()
            .collect();

        Self {
            name: user.name.clone(),
            user_id: user.userid,
            gender: Gender::from_api(user.gender.as_deref()),
            registration,
            edit_count: EditCount::exact(user.editcount.unwrap_or_default()),
            groups: display_groups(user, servername, manager_message, sites),
            blocks,
            profile: ProfileExtras::default(),
        }
    }

    /// Facts of an address or range, from its contributions and blocks.
    pub fn from_address(
        subject: &Subject, contribs: usize, more: bool, blocks: Vec<BlockRecord>, now: DateTime<Utc>,
    ) -> Self {
        Self {
            name: subject.raw.clone(),
            edit_count: EditCount { count: contribs as u64, approximate: subject.approximate(), more },
            blocks: blocks.into_iter().filter(|block| block.is_active(now)).collect(),
            ..Default::default()
        }
    }
}

/// Apply the group display rule to the account's groups.
pub fn display_groups(
    user: &UserEntry, servername: &str, manager_message: Option<&str>, sites: &SiteSnapshot,
) -> Vec<DisplayGroup> {
    let holds = |group: &str| user.groups.iter().any(|g| g == group);
    let mut shown: Vec<DisplayGroup> = Vec::new();

    for &group in USER_GROUPS {
        if !holds(group) || (!shown.is_empty() && BASELINE_GROUPS.contains(&group)) {
            continue;
        }

        if group == "wiki_manager" && sites.is_manager(servername, &user.name) {
            shown.push(DisplayGroup { name: group.to_string(), highlighted: true });
        } else if group == "wiki-manager" && manager_message == Some(user.name.as_str()) {
            shown.push(DisplayGroup { name: group.to_string(), highlighted: true });
        } else if !holds(&format!("global_{group}")) || user.groupmemberships.iter().any(|m| m.group == group) {
            shown.push(DisplayGroup { name: group.to_string(), highlighted: false });
        }
    }

    shown
}
