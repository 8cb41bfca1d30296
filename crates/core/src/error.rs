//! Unified error types for wikicard.
//!
//! Every variant carries a stable code prefix so logs and tool callers can
//! match on it without parsing free text.

use rmcp::model::{ErrorCode, ErrorData as McpError};

/// Unified error types for the wikicard server.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid input parameters (e.g., empty username).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// Invalid wiki URL.
    #[error("INVALID_URL: {0}")]
    InvalidUrl(String),

    /// HTTP error response from a wiki.
    #[error("HTTP_ERROR: {0}")]
    HttpError(String),

    /// Request to a wiki timed out.
    #[error("FETCH_TIMEOUT: {0}")]
    FetchTimeout(String),

    /// The wiki answered with an `error` object.
    #[error("API_ERROR: {code}: {info}")]
    ApiError { code: String, info: String },

    /// The wiki answered, but not with the shape we asked for.
    #[error("MALFORMED_RESPONSE: {0}")]
    MalformedResponse(String),

    /// Site registry could not be loaded.
    #[error("REGISTRY_ERROR: {0}")]
    Registry(String),

    /// A reply could not be delivered to the chat platform.
    #[error("DELIVERY_FAILED: {0}")]
    Delivery(String),
}

impl From<Error> for McpError {
    fn from(err: Error) -> Self {
        let (code, message) = match &err {
            Error::InvalidInput(msg) => (-32602, msg.clone()),
            Error::InvalidUrl(msg) => (-32003, msg.clone()),
            Error::HttpError(msg) => (-32008, msg.clone()),
            Error::FetchTimeout(msg) => (-32006, msg.clone()),
            Error::ApiError { code, info } => (-32013, format!("{code}: {info}")),
            Error::MalformedResponse(msg) => (-32014, msg.clone()),
            Error::Registry(msg) => (-32015, msg.clone()),
            Error::Delivery(msg) => (-32016, msg.clone()),
        };

        McpError { code: ErrorCode(code), message: message.into(), data: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::ApiError { code: "baduser_ucuser".to_string(), info: "Invalid user".to_string() };
        assert!(err.to_string().contains("API_ERROR"));
        assert!(err.to_string().contains("baduser_ucuser"));
    }

    #[test]
    fn test_error_to_mcp_error() {
        let err = Error::InvalidInput("username cannot be empty".to_string());
        let mcp_err: McpError = err.into();
        assert_eq!(mcp_err.code.0, -32602);
    }

    #[test]
    fn test_api_error_to_mcp_error() {
        let err = Error::ApiError { code: "param_ip".to_string(), info: "bad ip".to_string() };
        let mcp_err: McpError = err.into();
        assert_eq!(mcp_err.code.0, -32013);
        assert_eq!(mcp_err.message, "param_ip: bad ip");
    }
}
