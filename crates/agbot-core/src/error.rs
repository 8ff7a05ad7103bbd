//! Error types for the AG bot.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for configuration and start-up paths.
///
/// Completion failures are deliberately not part of this enum; they use
/// [`CompletionError`] and never leave the session controller.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum AgbotError {
    /// Configuration error (missing credential, bad config file)
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON"
        message: String,
    },
}

impl AgbotError {
    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Check if this is a config error
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Check if this is a serialization error
    pub fn is_serialization(&self) -> bool {
        matches!(self, Self::Serialization { .. })
    }
}

impl From<std::io::Error> for AgbotError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for AgbotError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for AgbotError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, AgbotError>`.
pub type Result<T> = std::result::Result<T, AgbotError>;

/// Failure of a single remote completion call.
///
/// There is exactly one kind: transport, authentication, quota and malformed
/// responses are indistinguishable to callers. The message is kept for
/// diagnostics only and is never shown in the transcript.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Completion failed: {message}")]
pub struct CompletionError {
    message: String,
}

impl CompletionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The request never produced an HTTP response.
    pub fn transport(err: impl std::fmt::Display) -> Self {
        Self::new(format!("request failed: {err}"))
    }

    /// The endpoint answered with a non-success status.
    pub fn http(status: u16, detail: impl std::fmt::Display) -> Self {
        Self::new(format!("HTTP {status}: {detail}"))
    }

    /// The endpoint answered but the body was unusable.
    pub fn malformed(detail: impl std::fmt::Display) -> Self {
        Self::new(format!("malformed response: {detail}"))
    }

    pub fn cancelled() -> Self {
        Self::new("request cancelled")
    }

    pub fn timed_out(after: std::time::Duration) -> Self {
        Self::new(format!("request timed out after {}s", after.as_secs_f32()))
    }

    /// Diagnostic detail. Not for display to end users.
    pub fn message(&self) -> &str {
        &self.message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_conversion_keeps_kind() {
        let err: AgbotError =
            std::io::Error::new(std::io::ErrorKind::NotFound, "secret.json").into();
        match err {
            AgbotError::Io { message } => {
                assert!(message.contains("secret.json"));
                assert!(message.contains("NotFound"));
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn test_toml_error_is_serialization() {
        let err: AgbotError = toml::from_str::<toml::Value>("= broken")
            .unwrap_err()
            .into();
        assert!(err.is_serialization());
        assert!(err.to_string().contains("TOML"));
    }

    #[test]
    fn test_completion_error_constructors_share_one_kind() {
        let errors = [
            CompletionError::transport("connection refused"),
            CompletionError::http(429, "RESOURCE_EXHAUSTED: quota"),
            CompletionError::malformed("missing candidates"),
            CompletionError::cancelled(),
        ];

        for err in &errors {
            assert!(err.to_string().starts_with("Completion failed: "));
        }
        assert_eq!(errors[1].message(), "HTTP 429: RESOURCE_EXHAUSTED: quota");
    }
}
