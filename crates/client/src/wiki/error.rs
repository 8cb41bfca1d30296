//! Wiki API client error types.

use std::sync::Arc;

use wikicard_core::Error;

/// Errors from the MediaWiki API client.
#[derive(Debug, thiserror::Error)]
pub enum WikiError {
    /// Non-2xx response without an API error body.
    #[error("HTTP error: {status}")]
    HttpError { status: u16 },

    /// The API answered with an `error` object.
    #[error("API error {code}: {info}")]
    Api { code: String, info: String },

    /// The response lacks `batchcomplete`.
    #[error("incomplete response: batchcomplete missing")]
    Incomplete,

    /// A key the caller relies on is absent.
    #[error("missing key in response: {0}")]
    MissingKey(&'static str),

    /// Request timeout.
    #[error("request timeout")]
    Timeout,

    /// Network error.
    #[error("network error: {0}")]
    Network(Arc<reqwest::Error>),

    /// Response body is not the expected JSON.
    #[error("parse error: {0}")]
    Parse(String),

    /// Wiki base URL cannot be used.
    #[error("invalid wiki URL: {0}")]
    InvalidUrl(String),
}

impl WikiError {
    /// The API error code, if the wiki reported one.
    pub fn api_code(&self) -> Option<&str> {
        match self {
            WikiError::Api { code, .. } => Some(code),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for WikiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() { WikiError::Timeout } else { WikiError::Network(Arc::new(err)) }
    }
}

impl From<WikiError> for Error {
    fn from(err: WikiError) -> Self {
        match err {
            WikiError::HttpError { status } => Error::HttpError(format!("status {status}")),
            WikiError::Api { code, info } => Error::ApiError { code, info },
            WikiError::Incomplete | WikiError::MissingKey(_) | WikiError::Parse(_) => {
                Error::MalformedResponse(err.to_string())
            }
            WikiError::Timeout => Error::FetchTimeout(err.to_string()),
            WikiError::Network(e) => Error::HttpError(format!("network error: {e}")),
            WikiError::InvalidUrl(msg) => Error::InvalidUrl(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = WikiError::Api { code: "param_ip".to_string(), info: "bad".to_string() };
        assert!(err.to_string().contains("param_ip"));
        assert_eq!(err.api_code(), Some("param_ip"));
        assert_eq!(WikiError::Incomplete.api_code(), None);
    }

    #[test]
    fn test_into_core_error() {
        let err: Error = WikiError::MissingKey("query.users").into();
        assert!(matches!(err, Error::MalformedResponse(msg) if msg.contains("query.users")));

        let err: Error = WikiError::HttpError { status: 500 }.into();
        assert!(matches!(err, Error::HttpError(msg) if msg == "status 500"));
    }
}
