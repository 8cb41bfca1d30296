//! Profile extension clients for Gamepedia and Fandom wikis.
//!
//! Both endpoints are best-effort: callers log failures and carry on with
//! the facts they already have.

use std::sync::LazyLock;

use chrono::Utc;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use wikicard_core::{Site, SiteSnapshot};

use crate::html::escape_formatting;
use crate::render::{DESCRIPTION_LIMIT, truncate};
use crate::sink::MemberDirectory;
use crate::wiki::{Wiki, WikiClient, WikiError};

static DISCORD_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([^@#:]{2,32}?)\s*#(\d{4,6})\s*$").unwrap());

/// Maximum shown length of a Discord handle.
pub const DISCORD_LIMIT: usize = 50;

const AVATAR_THUMBNAIL: &str = "/thumbnail/width/400/height/400";

/// Extra profile data from the wiki family's profile extension.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileExtras {
    /// Escaped handle or a member mention.
    pub discord: Option<String>,
    pub favorite_site: Option<Site>,
    pub posts: Option<String>,
    pub avatar: Option<String>,
    /// Escaped and truncated.
    pub bio: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GamepediaResponse {
    #[serde(default)]
    profile: Option<GamepediaProfile>,
    #[serde(default)]
    error: Option<Value>,
    #[serde(default)]
    errormsg: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GamepediaProfile {
    #[serde(default, rename = "link-discord")]
    link_discord: Option<String>,
    #[serde(default)]
    favwiki: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FandomResponse {
    #[serde(default, rename = "userData")]
    user_data: Option<FandomUser>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FandomUser {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    posts: Option<Value>,
    #[serde(default)]
    discord_handle: Option<String>,
    #[serde(default)]
    avatar: Option<String>,
    #[serde(default)]
    bio: Option<String>,
}

/// `name  #1234` style input to the canonical `name#1234` tag.
pub fn normalize_discord(handle: &str) -> String {
    DISCORD_TAG.replace(handle, "$1#$2").into_owned()
}

fn cache_buster() -> String {
    Utc::now().timestamp_millis().to_string()
}

/// Gamepedia `action=profile&do=getPublicProfile`.
pub async fn gamepedia_profile(
    client: &WikiClient, wiki: &Wiki, username: &str, sites: &SiteSnapshot, members: &dyn MemberDirectory,
) -> Result<ProfileExtras, WikiError> {
    let cache = cache_buster();
    let response: GamepediaResponse = client
        .get_json(
            wiki.api_url()?,
            &[
                ("action", "profile"),
                ("do", "getPublicProfile"),
                ("user_name", username),
                ("format", "json"),
                ("cache", cache.as_str()),
            ],
        )
        .await?;

    if let Some(error) = response.error {
        let code = error.get("code").and_then(Value::as_str).unwrap_or("profile").to_string();
        let info = error.get("info").and_then(Value::as_str).unwrap_or_default().to_string();
        return Err(WikiError::Api { code, info });
    }
    if let Some(info) = response.errormsg {
        return Err(WikiError::Api { code: "profile".to_string(), info });
    }
    let profile = response.profile.ok_or(WikiError::MissingKey("profile"))?;

    let discord = profile.link_discord.filter(|h| !h.trim().is_empty()).map(|handle| {
        let handle = truncate(&handle, DISCORD_LIMIT);
        members.mention_for(&normalize_discord(&handle)).unwrap_or_else(|| escape_formatting(&handle))
    });

    let favorite_site = profile.favwiki.as_deref().and_then(|key| sites.by_key(key)).cloned();

    Ok(ProfileExtras { discord, favorite_site, ..Default::default() })
}

/// Fandom `wikia.php?controller=UserProfile&method=getUserData`.
pub async fn fandom_profile(
    client: &WikiClient, wiki: &Wiki, user_id: u64, members: &dyn MemberDirectory,
) -> Result<ProfileExtras, WikiError> {
    let cache = cache_buster();
    let user_id = user_id.to_string();
    let response: FandomResponse = client
        .get_json(
            wiki.nirvana_url()?,
            &[
                ("controller", "UserProfile"),
                ("method", "getUserData"),
                ("userId", user_id.as_str()),
                ("format", "json"),
                ("cache", cache.as_str()),
            ],
        )
        .await?;

    let user = response
        .user_data
        .filter(|u| u.id.as_ref().is_some_and(|id| !id.is_null()))
        .ok_or(WikiError::MissingKey("userData.id"))?;

    let posts = user.posts.as_ref().and_then(post_count);

    let discord = user.discord_handle.filter(|h| !h.trim().is_empty()).map(|handle| {
        let tag = truncate(&normalize_discord(&handle), DISCORD_LIMIT);
        members.mention_for(&tag).unwrap_or_else(|| escape_formatting(&tag))
    });

    let avatar = user
        .avatar
        .filter(|a| !a.is_empty())
        .map(|a| a.replace(AVATAR_THUMBNAIL, ""));

    let bio = user
        .bio
        .filter(|b| !b.trim().is_empty())
        .map(|b| truncate(&escape_formatting(&b), DESCRIPTION_LIMIT));

    Ok(ProfileExtras { discord, favorite_site: None, posts, avatar, bio })
}

/// Post counts arrive as numbers or strings; zero means none.
fn post_count(value: &Value) -> Option<String> {
    let count = match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_string(),
        _ => return None,
    };
    if count.is_empty() || count == "0" { None } else { Some(count) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::NoMembers;
    use crate::wiki::ClientConfig;
    use wiremock::matchers::{path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct OneMember;

    impl MemberDirectory for OneMember {
        fn mention_for(&self, tag: &str) -> Option<String> {
            (tag == "alice#1234").then(|| "<@1001>".to_string())
        }
    }

    fn client() -> WikiClient {
        WikiClient::new(&ClientConfig::default()).unwrap()
    }

    fn sites() -> SiteSnapshot {
        SiteSnapshot::new(vec![Site {
            domain: "terraria.gamepedia.com".into(),
            display_name: "Terraria Wiki".into(),
            managers: Vec::new(),
            key: Some("5f2b".into()),
        }])
    }

    #[test]
    fn test_normalize_discord() {
        assert_eq!(normalize_discord("  alice  #1234 "), "alice#1234");
        assert_eq!(normalize_discord("no tag here"), "no tag here");
        assert_eq!(normalize_discord("@bad#1234"), "@bad#1234");
    }

    #[test]
    fn test_post_count() {
        assert_eq!(post_count(&serde_json::json!(12)), Some("12".to_string()));
        assert_eq!(post_count(&serde_json::json!("7")), Some("7".to_string()));
        assert_eq!(post_count(&serde_json::json!(0)), None);
        assert_eq!(post_count(&serde_json::json!("")), None);
        assert_eq!(post_count(&serde_json::json!(null)), None);
    }

    #[tokio::test]
    async fn test_gamepedia_profile() {
        let server = MockServer::start().await;
        Mock::given(path("/api.php"))
            .and(query_param("action", "profile"))
            .and(query_param("do", "getPublicProfile"))
            .and(query_param("user_name", "Alice"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"profile": {"link-discord": "alice #1234", "favwiki": "5f2b"}}"#,
            ))
            .mount(&server)
            .await;

        let wiki = Wiki::parse(&server.uri()).unwrap();
        let extras = gamepedia_profile(&client(), &wiki, "Alice", &sites(), &OneMember).await.unwrap();
        assert_eq!(extras.discord.as_deref(), Some("<@1001>"));
        assert_eq!(extras.favorite_site.unwrap().display_name, "Terraria Wiki");
    }

    #[tokio::test]
    async fn test_gamepedia_profile_escapes_unknown_member() {
        let server = MockServer::start().await;
        Mock::given(path("/api.php"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"profile": {"link-discord": "some_one#42"}}"#))
            .mount(&server)
            .await;

        let wiki = Wiki::parse(&server.uri()).unwrap();
        let extras = gamepedia_profile(&client(), &wiki, "Alice", &sites(), &NoMembers).await.unwrap();
        assert_eq!(extras.discord.as_deref(), Some("some\\_one#42"));
        assert!(extras.favorite_site.is_none());
    }

    #[tokio::test]
    async fn test_gamepedia_profile_errormsg() {
        let server = MockServer::start().await;
        Mock::given(path("/api.php"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"errormsg": "no such user"}"#))
            .mount(&server)
            .await;

        let wiki = Wiki::parse(&server.uri()).unwrap();
        let result = gamepedia_profile(&client(), &wiki, "Alice", &sites(), &NoMembers).await;
        assert!(matches!(result, Err(WikiError::Api { info, .. }) if info == "no such user"));
    }

    #[tokio::test]
    async fn test_fandom_profile() {
        let server = MockServer::start().await;
        Mock::given(path("/wikia.php"))
            .and(query_param("controller", "UserProfile"))
            .and(query_param("method", "getUserData"))
            .and(query_param("userId", "7"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"userData": {
                    "id": 7, "posts": 12, "discordHandle": "alice #1234",
                    "avatar": "https://img/a.png/thumbnail/width/400/height/400", "bio": "I *love* wikis"
                }}"#,
            ))
            .mount(&server)
            .await;

        let wiki = Wiki::parse(&server.uri()).unwrap();
        let extras = fandom_profile(&client(), &wiki, 7, &OneMember).await.unwrap();
        assert_eq!(extras.posts.as_deref(), Some("12"));
        assert_eq!(extras.discord.as_deref(), Some("<@1001>"));
        assert_eq!(extras.avatar.as_deref(), Some("https://img/a.png"));
        assert_eq!(extras.bio.as_deref(), Some("I \\*love\\* wikis"));
    }

    #[tokio::test]
    async fn test_fandom_profile_without_id() {
        let server = MockServer::start().await;
        Mock::given(path("/wikia.php"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"userData": {"posts": 3}}"#))
            .mount(&server)
            .await;

        let wiki = Wiki::parse(&server.uri()).unwrap();
        let result = fandom_profile(&client(), &wiki, 7, &NoMembers).await;
        assert!(matches!(result, Err(WikiError::MissingKey("userData.id"))));
    }
}
