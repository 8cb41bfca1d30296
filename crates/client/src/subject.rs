//! Classification of lookup targets into accounts, addresses and ranges.
//!
//! Contribution queries for ranges go through `ucuserprefix`, which matches
//! on a textual prefix. The prefix is cut at the widest group boundary the
//! range covers, so results for unaligned ranges over-count (`~N`).

use std::sync::LazyLock;

use regex::Regex;

static IPV4: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[0-9]{1,3}\.){3}[0-9]{1,3}(?:/([0-9]{2}))?$").unwrap());
static IPV6: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^([0-9a-fA-F:]+)(?:/([0-9]{2,3}))?$").unwrap());

/// Minimum range length and number of leading groups kept.
const IPV6_BUCKETS: &[(u16, usize)] = &[(112, 7), (96, 6), (80, 5), (64, 4), (48, 3), (32, 2), (19, 1)];
const IPV4_BUCKETS: &[(u16, usize)] = &[(24, 3), (16, 2)];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubjectKind {
    Ipv4,
    Ipv6,
    Account,
}

/// The account or address being looked up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subject {
    /// Identifier as the user typed it; used for display and links.
    pub raw: String,
    pub kind: SubjectKind,
    /// CIDR suffix, if any.
    pub range: Option<u16>,
    /// Identifier without the CIDR suffix.
    pub address: String,
    /// Text prefix for `ucuserprefix`; `None` queries `address` exactly.
    pub prefix: Option<String>,
}

impl Subject {
    pub fn classify(raw: &str) -> Self {
        if let Some(caps) = IPV4.captures(raw) {
            let range = caps.get(1).and_then(|m| m.as_str().parse().ok());
            return Self::ip(raw, SubjectKind::Ipv4, range);
        }

        if let Some(caps) = IPV6.captures(raw)
            && is_ipv6_literal(&caps[1])
        {
            let range = caps.get(2).and_then(|m| m.as_str().parse().ok());
            return Self::ip(raw, SubjectKind::Ipv6, range);
        }

        Self { raw: raw.to_string(), kind: SubjectKind::Account, range: None, address: raw.to_string(), prefix: None }
    }

    fn ip(raw: &str, kind: SubjectKind, range: Option<u16>) -> Self {
        let address = raw.split('/').next().unwrap_or(raw).to_string();
        let (full, buckets, separator) = match kind {
            SubjectKind::Ipv6 => (128, IPV6_BUCKETS, ':'),
            _ => (32, IPV4_BUCKETS, '.'),
        };

        let prefix = match range {
            None => None,
            Some(len) if len == full => None,
            Some(len) => {
                let groups = buckets.iter().find(|(min, _)| len >= *min).map(|(_, groups)| *groups);
                let prefix = groups.map(|n| leading_groups(&address, separator, n)).unwrap_or_default();
                Some(if prefix.is_empty() { raw.to_string() } else { prefix })
            }
        };

        Self { raw: raw.to_string(), kind, range, address, prefix }
    }

    pub fn is_ip(&self) -> bool {
        self.kind != SubjectKind::Account
    }

    /// Whether a prefix query over-counts the range.
    pub fn approximate(&self) -> bool {
        let Some(len) = self.range else { return false };
        if self.prefix.is_none() {
            return false;
        }
        match self.kind {
            SubjectKind::Ipv6 => len % 16 != 0,
            SubjectKind::Ipv4 => len % 8 != 0,
            SubjectKind::Account => false,
        }
    }

    /// Parameter name and value selecting this subject's contributions.
    pub fn contribs_param(&self) -> (&'static str, &str) {
        match &self.prefix {
            Some(prefix) => ("ucuserprefix", prefix.as_str()),
            None => ("ucuser", self.address.as_str()),
        }
    }
}

/// Keep the first `groups` groups of `address`, each with its trailing
/// separator, stopping early at a `::` compression.
fn leading_groups(address: &str, separator: char, groups: usize) -> String {
    let mut out = String::new();
    let mut seen = 0;
    let mut after_separator = false;

    for ch in address.chars() {
        if ch != separator {
            out.push(ch);
            after_separator = false;
            continue;
        }
        if after_separator || out.is_empty() {
            break;
        }
        out.push(ch);
        seen += 1;
        if seen == groups {
            break;
        }
        after_separator = true;
    }

    if after_separator || seen == groups { out } else { String::new() }
}

fn is_ipv6_literal(address: &str) -> bool {
    fn groups(part: &str) -> Option<usize> {
        if part.is_empty() {
            return Some(0);
        }
        let mut count = 0;
        for group in part.split(':') {
            if !(1..=4).contains(&group.len()) || !group.chars().all(|c| c.is_ascii_hexdigit()) {
                return None;
            }
            count += 1;
        }
        Some(count)
    }

    match address.split_once("::") {
        None => groups(address) == Some(8),
        Some((head, tail)) => {
            if tail.contains("::") {
                return false;
            }
            match (groups(head), groups(tail)) {
                (Some(h), Some(t)) => h + t <= 7,
                _ => false,
            }
        }
    }
}
