//! Error types for message extraction and the mail-source boundary.

use thiserror::Error;

#[derive(Debug, Error)]
/// Per-message extraction failure. Never fatal for a batch.
pub enum IngestError {
    /// A text part carried data that is not valid base64.
    #[error("base64 decode error in {mime_type} part: {source}")]
    Decode {
        mime_type: String,
        #[source]
        source: base64::DecodeError,
    },
    /// The part tree nests deeper than the traversal bound.
    #[error("message part tree deeper than {limit} levels")]
    PartTreeTooDeep { limit: usize },
}

#[derive(Debug, Error)]
/// Failure reported by a mail source while listing or fetching messages.
pub enum FetchError {
    /// No access token, or the token was rejected.
    #[error("authentication required")]
    AuthRequired,
    /// Provider quota or rate limit exhausted.
    #[error("quota exhausted: {0}")]
    QuotaExhausted(String),
    /// The identifier does not resolve to a message.
    #[error("message not found: {0}")]
    NotFound(String),
    /// Transport-level failure with a message.
    #[error("transport error: {0}")]
    Transport(String),
    /// IO error when reading message dumps.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Payload did not have the expected message shape.
    #[error("parse error: {0}")]
    Parse(String),
}

impl FetchError {
    /// True when the source needs fresh credentials.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, FetchError::AuthRequired)
    }
}

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, IngestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_auth_required_needs_credentials() {
        assert!(FetchError::AuthRequired.is_auth_failure());
        assert!(!FetchError::QuotaExhausted("429".to_string()).is_auth_failure());
        assert!(!FetchError::Transport("reset".to_string()).is_auth_failure());
    }
}
