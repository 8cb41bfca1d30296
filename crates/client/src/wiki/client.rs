//! HTTP client for MediaWiki `api.php` and the profile endpoints.

use std::time::{Duration, Instant};

use reqwest::{Client, header};
use serde::de::DeserializeOwned;
use url::Url;
use wikicard_core::AppConfig;

use super::response::{ApiEnvelope, PageMeta, PagesQuery};
use super::{Wiki, WikiError};

/// Configuration for the wiki client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// User agent string (default: "wikicard/0.1")
    pub user_agent: String,

    /// Request timeout (default: 20s)
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self { user_agent: "wikicard/0.1".to_string(), timeout: Duration::from_millis(20000) }
    }
}

impl From<&AppConfig> for ClientConfig {
    fn from(config: &AppConfig) -> Self {
        Self { user_agent: config.user_agent.clone(), timeout: config.timeout() }
    }
}

/// MediaWiki API client.
#[derive(Debug, Clone)]
pub struct WikiClient {
    http: Client,
}

impl WikiClient {
    /// Create a new wiki client with the given configuration.
    pub fn new(config: &ClientConfig) -> Result<Self, WikiError> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()?;

        Ok(Self { http })
    }

    /// Run an `action=query` request against `wiki`.
    ///
    /// The returned envelope is complete and error-free; `query` may still be
    /// absent and is checked by the caller.
    pub async fn query<Q: DeserializeOwned>(
        &self, wiki: &Wiki, params: &[(&str, &str)],
    ) -> Result<ApiEnvelope<Q>, WikiError> {
        let start = Instant::now();
        let url = wiki.api_url()?;

        let response = self
            .http
            .get(url.as_str())
            .header(header::ACCEPT, "application/json")
            .query(&[("action", "query"), ("format", "json"), ("formatversion", "2")])
            .query(params)
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("query {} -> {} in {:?}", response.url(), status, start.elapsed());

        let bytes = response.bytes().await?;
        let mut envelope: ApiEnvelope<Q> = match serde_json::from_slice(&bytes) {
            Ok(envelope) => envelope,
            Err(_) if !status.is_success() => return Err(WikiError::HttpError { status: status.as_u16() }),
            Err(e) => return Err(WikiError::Parse(e.to_string())),
        };

        if let Some(error) = envelope.error.take() {
            return Err(WikiError::Api { code: error.code, info: error.info });
        }

        if !status.is_success() {
            return Err(WikiError::HttpError { status: status.as_u16() });
        }

        if let Some(warnings) = &envelope.warnings {
            tracing::warn!("API warnings from {}: {}", wiki.as_str(), warnings);
        }

        if !envelope.batchcomplete {
            return Err(WikiError::Incomplete);
        }

        Ok(envelope)
    }

    /// GET a JSON document from a non-standard endpoint.
    pub async fn get_json<T: DeserializeOwned>(&self, url: Url, params: &[(&str, &str)]) -> Result<T, WikiError> {
        let response = self
            .http
            .get(url)
            .header(header::ACCEPT, "application/json")
            .query(params)
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("GET {} -> {}", response.url(), status);

        if !status.is_success() {
            return Err(WikiError::HttpError { status: status.as_u16() });
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| WikiError::Parse(e.to_string()))
    }

    /// Load page properties, the page image and a plain-text extract of `title`.
    pub async fn page_meta(&self, wiki: &Wiki, title: &str) -> Result<PageMeta, WikiError> {
        let envelope: ApiEnvelope<PagesQuery> = self
            .query(
                wiki,
                &[
                    ("prop", "pageprops|pageimages|extracts"),
                    ("ppprop", "description|displaytitle"),
                    ("piprop", "original"),
                    ("explaintext", "true"),
                    ("exsectionformat", "wiki"),
                    ("exlimit", "1"),
                    ("titles", title),
                ],
            )
            .await?;

        envelope
            .query
            .and_then(|q| q.pages.into_iter().next())
            .ok_or(WikiError::MissingKey("query.pages"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wiki::response::UsersQuery;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client() -> WikiClient {
        WikiClient::new(&ClientConfig::default()).unwrap()
    }

    #[test]
    fn test_client_config_default() {
        let config = ClientConfig::default();
        assert_eq!(config.user_agent, "wikicard/0.1");
        assert_eq!(config.timeout, Duration::from_millis(20000));
    }

    #[test]
    fn test_client_config_from_app_config() {
        let app = AppConfig { user_agent: "custom/2".into(), timeout_ms: 1500, ..Default::default() };
        let config = ClientConfig::from(&app);
        assert_eq!(config.user_agent, "custom/2");
        assert_eq!(config.timeout, Duration::from_millis(1500));
    }

    #[tokio::test]
    async fn test_query_sends_standard_params() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api.php"))
            .and(query_param("action", "query"))
            .and(query_param("format", "json"))
            .and(query_param("formatversion", "2"))
            .and(query_param("ususers", "Alice"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"batchcomplete": true, "query": {"general": {"sitename": "Test"}, "users": [{"name": "Alice"}]}}"#,
            ))
            .mount(&server)
            .await;

        let wiki = Wiki::parse(&server.uri()).unwrap();
        let envelope: ApiEnvelope<UsersQuery> = client().query(&wiki, &[("ususers", "Alice")]).await.unwrap();
        assert_eq!(envelope.query.unwrap().users.unwrap()[0].name, "Alice");
    }

    #[tokio::test]
    async fn test_query_api_error_wins_over_status() {
        let server = MockServer::start().await;
        Mock::given(path("/api.php"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_string(r#"{"error": {"code": "cidrtoobroad", "info": "Too broad."}}"#),
            )
            .mount(&server)
            .await;

        let wiki = Wiki::parse(&server.uri()).unwrap();
        let result = client().query::<UsersQuery>(&wiki, &[]).await;
        assert!(matches!(result, Err(WikiError::Api { code, .. }) if code == "cidrtoobroad"));
    }

    #[tokio::test]
    async fn test_query_http_error() {
        let server = MockServer::start().await;
        Mock::given(path("/api.php"))
            .respond_with(ResponseTemplate::new(500).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let wiki = Wiki::parse(&server.uri()).unwrap();
        let result = client().query::<UsersQuery>(&wiki, &[]).await;
        assert!(matches!(result, Err(WikiError::HttpError { status: 500 })));
    }

    #[tokio::test]
    async fn test_query_incomplete() {
        let server = MockServer::start().await;
        Mock::given(path("/api.php"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"query": {"general": {}, "users": []}}"#))
            .mount(&server)
            .await;

        let wiki = Wiki::parse(&server.uri()).unwrap();
        let result = client().query::<UsersQuery>(&wiki, &[]).await;
        assert!(matches!(result, Err(WikiError::Incomplete)));
    }

    #[tokio::test]
    async fn test_page_meta() {
        let server = MockServer::start().await;
        Mock::given(path("/api.php"))
            .and(query_param("titles", "User:Alice"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"batchcomplete": true, "query": {
                    "pages": [{"title": "User:Alice", "ns": 2, "extract": "Hello."}]
                }}"#,
            ))
            .mount(&server)
            .await;

        let wiki = Wiki::parse(&server.uri()).unwrap();
        let page = client().page_meta(&wiki, "User:Alice").await.unwrap();
        assert_eq!(page.ns, 2);
        assert_eq!(page.extract.as_deref(), Some("Hello."));
    }

    #[tokio::test]
    async fn test_get_json_http_error() {
        let server = MockServer::start().await;
        Mock::given(path("/wikia.php"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let wiki = Wiki::parse(&server.uri()).unwrap();
        let result = client().get_json::<serde_json::Value>(wiki.nirvana_url().unwrap(), &[]).await;
        assert!(matches!(result, Err(WikiError::HttpError { status: 503 })));
    }
}
