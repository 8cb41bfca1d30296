//! Read-only registry of known wiki sites.
//!
//! The registry is refreshed out-of-band; lookups only ever see an immutable
//! [`SiteSnapshot`] taken at the start of a request.

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::Error;

/// A wiki known to the bot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Site {
    /// Server name without scheme, e.g. `minecraft.gamepedia.com`.
    pub domain: String,
    pub display_name: String,
    /// Account names of the wiki managers assigned to this site.
    #[serde(default)]
    pub managers: Vec<String>,
    /// Hash key the profile extension uses for favorite wikis.
    #[serde(default)]
    pub key: Option<String>,
}

/// Immutable view of the registry.
#[derive(Debug, Clone)]
pub struct SiteSnapshot(Arc<[Site]>);

impl SiteSnapshot {
    pub fn new(sites: Vec<Site>) -> Self {
        Self(sites.into())
    }

    pub fn by_domain(&self, domain: &str) -> Option<&Site> {
        self.0.iter().find(|site| site.domain.eq_ignore_ascii_case(domain))
    }

    pub fn by_key(&self, key: &str) -> Option<&Site> {
        self.0.iter().find(|site| site.key.as_deref() == Some(key))
    }

    /// Whether `user` is listed as a manager of the site served at `domain`.
    pub fn is_manager(&self, domain: &str, user: &str) -> bool {
        self.by_domain(domain)
            .is_some_and(|site| site.managers.iter().any(|manager| manager == user))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for SiteSnapshot {
    fn default() -> Self {
        Self(Arc::from(Vec::new()))
    }
}

/// Shared, replaceable site registry.
#[derive(Debug, Default)]
pub struct SiteRegistry {
    current: RwLock<SiteSnapshot>,
}

impl SiteRegistry {
    pub fn new(snapshot: SiteSnapshot) -> Self {
        Self { current: RwLock::new(snapshot) }
    }

    /// Parse a JSON array of sites.
    ///
    /// # Errors
    ///
    /// Returns `Error::Registry` if the document is not a list of sites.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let sites: Vec<Site> =
            serde_json::from_str(json).map_err(|e| Error::Registry(format!("invalid sites document: {e}")))?;
        Ok(Self::new(SiteSnapshot::new(sites)))
    }

    /// Load the registry seed file.
    ///
    /// # Errors
    ///
    /// Returns `Error::Registry` if the file cannot be read or parsed.
    pub async fn load_json(path: &Path) -> Result<Self, Error> {
        let json = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| Error::Registry(format!("cannot read {}: {e}", path.display())))?;
        let registry = Self::from_json(&json)?;
        tracing::debug!(path = %path.display(), "loaded site registry");
        Ok(registry)
    }

    pub async fn snapshot(&self) -> SiteSnapshot {
        self.current.read().await.clone()
    }

    /// Swap in a fresh snapshot; snapshots already handed out are unaffected.
    pub async fn replace(&self, snapshot: SiteSnapshot) {
        *self.current.write().await = snapshot;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SITES: &str = r#"[
        {"domain": "minecraft.gamepedia.com", "display_name": "Minecraft Wiki", "managers": ["Alice"], "key": "0a1b2c"},
        {"domain": "terraria.fandom.com", "display_name": "Terraria Wiki"}
    ]"#;

    #[tokio::test]
    async fn test_from_json_and_lookup() {
        let registry = SiteRegistry::from_json(SITES).unwrap();
        let snapshot = registry.snapshot().await;
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.by_key("0a1b2c").unwrap().display_name, "Minecraft Wiki");
        assert!(snapshot.by_domain("Terraria.Fandom.com").is_some());
        assert!(snapshot.by_key("ffff").is_none());
    }

    #[test]
    fn test_is_manager() {
        let sites = vec![Site {
            domain: "minecraft.gamepedia.com".into(),
            display_name: "Minecraft Wiki".into(),
            managers: vec!["Alice".into()],
            key: None,
        }];
        let snapshot = SiteSnapshot::new(sites);
        assert!(snapshot.is_manager("minecraft.gamepedia.com", "Alice"));
        assert!(!snapshot.is_manager("minecraft.gamepedia.com", "Bob"));
        assert!(!snapshot.is_manager("other.gamepedia.com", "Alice"));
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        let result = SiteRegistry::from_json("{\"not\": \"a list\"}");
        assert!(matches!(result, Err(Error::Registry(_))));
    }

    #[tokio::test]
    async fn test_replace_keeps_old_snapshots() {
        let registry = SiteRegistry::from_json(SITES).unwrap();
        let before = registry.snapshot().await;
        registry.replace(SiteSnapshot::default()).await;
        assert_eq!(before.len(), 2);
        assert!(registry.snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn test_load_json_missing_file() {
        let result = SiteRegistry::load_json(Path::new("/nonexistent/sites.json")).await;
        assert!(matches!(result, Err(Error::Registry(_))));
    }
}
