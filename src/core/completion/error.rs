//! Completion error types.

use crate::core::config::ConfigError;

/// Errors from the completion pipeline.
#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("{0}")]
    ApiAuth(String),
    #[error("API error: {0}")]
    ApiMessage(String),
    #[error("The model returned no text")]
    EmptyResponse,
    #[error("{0}")]
    Other(Box<dyn std::error::Error + Send + Sync + 'static>),
    /// Every attempt failed; `last` is the final attempt's error.
    #[error("Completion failed after {attempts} attempts: {last}")]
    Exhausted {
        attempts: u32,
        last: Box<CompletionError>,
    },
}

/// Map async-openai or API errors into CompletionError.
pub fn map_api_error<E>(e: E) -> CompletionError
where
    E: std::fmt::Display + Into<Box<dyn std::error::Error + Send + Sync + 'static>>,
{
    let s = e.to_string();
    if s.contains("401") || s.to_lowercase().contains("invalid api key") {
        return CompletionError::ApiAuth(format!(
            "API error (401): authentication failed. Check {} in .env.",
            crate::core::config::API_KEY_VAR
        ));
    }
    if s.contains("\"error\"")
        && let Some((_, rest)) = s.split_once("\"message\":\"")
        && let Some((msg, _)) = rest.split_once('"')
    {
        return CompletionError::ApiMessage(msg.to_string());
    }
    CompletionError::Other(e.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_api_error_401() {
        let e = std::io::Error::other("status 401 Unauthorized");
        let err = map_api_error(e);
        match &err {
            CompletionError::ApiAuth(msg) => assert!(msg.contains("TOGETHER_API_KEY")),
            _ => panic!("expected ApiAuth, got {:?}", err),
        }
    }

    #[test]
    fn map_api_error_json_message() {
        let e = std::io::Error::other(r#"{"error":{"message":"Rate limit exceeded"}}"#);
        let err = map_api_error(e);
        match &err {
            CompletionError::ApiMessage(msg) => assert_eq!(msg, "Rate limit exceeded"),
            _ => panic!("expected ApiMessage, got {:?}", err),
        }
    }

    #[test]
    fn map_api_error_generic() {
        let e = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "connection refused");
        assert!(matches!(map_api_error(e), CompletionError::Other(_)));
    }

    #[test]
    fn exhausted_mentions_attempts_and_cause() {
        let err = CompletionError::Exhausted {
            attempts: 3,
            last: Box::new(CompletionError::EmptyResponse),
        };
        assert_eq!(
            err.to_string(),
            "Completion failed after 3 attempts: The model returned no text"
        );
    }
}
