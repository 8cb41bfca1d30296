//! MediaWiki API access and link building.
//!
//! ### Requests
//! - Every `action=query` request is sent with `format=json&formatversion=2`.
//! - A response carrying an `error` object is an API error regardless of
//!   its HTTP status; otherwise non-2xx is an HTTP error.
//! - Responses without `batchcomplete` are treated as incomplete.
//! - `warnings` are logged and otherwise ignored.
//!
//! ### Links
//! - Titles use underscores for spaces and are percent-encoded, keeping the
//!   characters MediaWiki leaves readable in paths.
//! - With site info, links follow the site's article path on an `https`
//!   server; without, they fall back to `index.php?title=`.

pub mod client;
pub mod error;
pub mod response;

pub use client::{ClientConfig, WikiClient};
pub use error::WikiError;
pub use response::{PageMeta, SiteInfo};

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use url::Url;

/// Hosting family of a wiki, which decides the profile extension in use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WikiFamily {
    Gamepedia,
    Fandom,
    Other,
}

impl WikiFamily {
    fn detect(url: &Url) -> Self {
        let host = url.host_str().unwrap_or_default();
        if host.ends_with(".gamepedia.com") {
            WikiFamily::Gamepedia
        } else if host.ends_with(".fandom.com") || host.ends_with(".wikia.org") {
            WikiFamily::Fandom
        } else {
            WikiFamily::Other
        }
    }

    /// Whether the wiki supports the deferred global-block lookup.
    pub fn has_global_blocks(self) -> bool {
        self != WikiFamily::Other
    }
}

/// Base URL of a wiki, always ending in `/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Wiki {
    base: Url,
    family: WikiFamily,
}

impl Wiki {
    pub fn parse(base: &str) -> Result<Self, WikiError> {
        let mut url = Url::parse(base.trim()).map_err(|e| WikiError::InvalidUrl(format!("{base}: {e}")))?;
        if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
            return Err(WikiError::InvalidUrl(format!("{base}: not an http(s) URL")));
        }
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        url.set_query(None);
        url.set_fragment(None);

        let family = WikiFamily::detect(&url);
        Ok(Self { base: url, family })
    }

    /// Override the detected family, e.g. for wikis on custom domains.
    pub fn with_family(mut self, family: WikiFamily) -> Self {
        self.family = family;
        self
    }

    pub fn family(&self) -> WikiFamily {
        self.family
    }

    pub fn as_str(&self) -> &str {
        self.base.as_str()
    }

    pub fn api_url(&self) -> Result<Url, WikiError> {
        self.base.join("api.php").map_err(|e| WikiError::InvalidUrl(e.to_string()))
    }

    /// Entry point of the Fandom "Nirvana" controllers.
    pub fn nirvana_url(&self) -> Result<Url, WikiError> {
        self.base.join("wikia.php").map_err(|e| WikiError::InvalidUrl(e.to_string()))
    }

    /// Link to `title` with an optional query string and section.
    pub fn to_link(&self, title: &str, query: &str, fragment: &str, site: Option<&SiteInfo>) -> String {
        let title = encode_title(title);

        let mut link = match site.filter(|s| !s.server.is_empty() && s.articlepath.contains("$1")) {
            Some(site) => {
                let mut link = format!("{}{}", https_server(&site.server), site.articlepath.replace("$1", &title));
                if !query.is_empty() {
                    link.push(if link.contains('?') { '&' } else { '?' });
                    link.push_str(query);
                }
                link
            }
            None => {
                let mut link = format!("{}index.php?title={title}", self.base);
                if !query.is_empty() {
                    link.push('&');
                    link.push_str(query);
                }
                link
            }
        };

        if !fragment.is_empty() {
            link.push('#');
            link.push_str(&encode_title(fragment));
        }
        link
    }

    /// [`Wiki::to_link`] safe to use as a markdown link target.
    pub fn to_markdown_link(&self, title: &str, query: &str, fragment: &str, site: Option<&SiteInfo>) -> String {
        self.to_link(title, query, fragment, site).replace('(', "%28").replace(')', "%29")
    }

    /// Absolute URL of the site logo.
    pub fn logo_url(&self, site: &SiteInfo) -> Option<String> {
        let logo = site.logo.trim();
        if logo.is_empty() {
            return None;
        }
        if logo.starts_with("//") {
            return Some(format!("https:{logo}"));
        }
        if logo.starts_with('/') && !site.server.is_empty() {
            return Some(format!("{}{logo}", https_server(&site.server)));
        }
        match self.base.join(logo) {
            Ok(url) => Some(url.to_string()),
            Err(e) => {
                tracing::debug!("unusable logo URL {logo}: {e}");
                None
            }
        }
    }
}

fn https_server(server: &str) -> String {
    if let Some(rest) = server.strip_prefix("//") {
        format!("https://{rest}")
    } else if let Some(rest) = server.strip_prefix("http://") {
        format!("https://{rest}")
    } else {
        server.to_string()
    }
}

/// Characters MediaWiki leaves readable in article paths.
const TITLE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~')
    .remove(b';')
    .remove(b':')
    .remove(b'@')
    .remove(b'$')
    .remove(b'!')
    .remove(b'*')
    .remove(b'(')
    .remove(b')')
    .remove(b',')
    .remove(b'/');

/// Percent-encode a title the way MediaWiki renders it in article paths.
fn encode_title(title: &str) -> String {
    utf8_percent_encode(&title.trim().replace(' ', "_"), TITLE).to_string()
}
