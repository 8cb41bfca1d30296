//! MediaWiki API response types (`format=json&formatversion=2`).

use serde::Deserialize;
use serde_json::Value;

/// Top-level shape shared by every `action=query` response.
#[derive(Debug, Deserialize)]
pub struct ApiEnvelope<Q> {
    #[serde(default)]
    pub batchcomplete: bool,
    /// Present when more results are available.
    #[serde(default, rename = "continue")]
    pub continuation: Option<Value>,
    #[serde(default = "Option::default")]
    pub query: Option<Q>,
    #[serde(default)]
    pub warnings: Option<Value>,
    #[serde(default)]
    pub error: Option<ApiErrorBody>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    pub code: String,
    #[serde(default)]
    pub info: String,
}

/// `meta=siteinfo&siprop=general`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SiteInfo {
    pub sitename: String,
    /// Server URL, possibly protocol-relative (`//example.fandom.com`).
    pub server: String,
    pub servername: String,
    pub mainpage: String,
    pub logo: String,
    /// Article path pattern with a `$1` placeholder, e.g. `/wiki/$1`.
    pub articlepath: String,
}

/// `list=blocks`.
#[derive(Debug, Deserialize)]
pub struct BlocksQuery {
    pub general: SiteInfo,
    pub blocks: Option<Vec<BlockEntry>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BlockEntry {
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub by: String,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub expiry: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
}

/// `list=usercontribs`; entries are only counted.
#[derive(Debug, Deserialize)]
pub struct ContribsQuery {
    pub usercontribs: Option<Vec<Value>>,
}

/// `list=users` plus `meta=allmessages|siteinfo`.
#[derive(Debug, Deserialize)]
pub struct UsersQuery {
    pub general: SiteInfo,
    pub users: Option<Vec<UserEntry>>,
    #[serde(default)]
    pub allmessages: Vec<AllMessage>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UserEntry {
    pub userid: Option<u64>,
    pub name: String,
    pub missing: bool,
    pub invalid: bool,
    pub editcount: Option<u64>,
    pub registration: Option<String>,
    pub groups: Vec<String>,
    pub groupmemberships: Vec<GroupMembership>,
    pub gender: Option<String>,
    pub blockedby: Option<String>,
    pub blockedtimestamp: Option<String>,
    pub blockexpiry: Option<String>,
    pub blockreason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GroupMembership {
    pub group: String,
    #[serde(default)]
    pub expiry: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AllMessage {
    pub name: String,
    #[serde(default)]
    pub content: Option<String>,
}

/// `titles=<page>&prop=pageprops|pageimages|extracts`.
#[derive(Debug, Deserialize)]
pub struct PagesQuery {
    #[serde(default)]
    pub pages: Vec<PageMeta>,
}

/// Metadata of the generic page the lookup was aimed at.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PageMeta {
    pub title: String,
    pub ns: i64,
    pub missing: bool,
    /// Set by the caller when redirects were not followed to reach this page.
    #[serde(skip)]
    pub no_redirect: bool,
    pub pageprops: Option<PageProps>,
    pub extract: Option<String>,
    pub pageimage: Option<String>,
    pub original: Option<PageImage>,
}

impl PageMeta {
    /// Placeholder for a page whose metadata could not be loaded.
    pub fn titled(title: impl Into<String>) -> Self {
        Self { title: title.into(), ..Default::default() }
    }

    /// Missing pages and special pages cannot be shown as a page card.
    pub fn is_unavailable(&self) -> bool {
        self.missing || self.ns == -1
    }

    pub fn display_title(&self) -> Option<&str> {
        self.pageprops.as_ref().and_then(|p| p.displaytitle.as_deref())
    }

    pub fn description(&self) -> Option<&str> {
        self.pageprops.as_ref().and_then(|p| p.description.as_deref())
    }

    /// Original-size page image, when the page has one.
    pub fn image(&self) -> Option<&str> {
        self.pageimage.as_ref()?;
        self.original.as_ref().map(|o| o.source.as_str())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PageProps {
    pub displaytitle: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PageImage {
    pub source: String,
}
