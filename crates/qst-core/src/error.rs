//! Error types shared by the quote collection, the stores and the sync engine.

use thiserror::Error;

/// Result type for qst operations.
pub type Result<T> = std::result::Result<T, QuoteError>;

/// Errors that can occur while managing or syncing quotes.
#[derive(Error, Debug)]
pub enum QuoteError {
    /// User input rejected before any state change.
    #[error("{0}")]
    Validation(String),

    /// Import payload is not a JSON array of quotes.
    #[error("invalid import format: {0}")]
    Format(String),

    /// Remote request failed (connection, status code or body).
    #[error("transport error: {0}")]
    Transport(String),

    /// Durable store could not be read or written.
    #[error("storage error for key '{key}': {source}")]
    Storage {
        /// Store key involved.
        key: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Collection could not be serialized.
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Configuration could not be loaded.
    #[error("configuration error: {0}")]
    Config(String),
}

impl QuoteError {
    pub fn storage(key: impl Into<String>, source: std::io::Error) -> Self {
        Self::Storage {
            key: key.into(),
            source,
        }
    }

    /// Errors the user caused and can fix by changing their input.
    pub fn is_user_error(&self) -> bool {
        matches!(self, QuoteError::Validation(_) | QuoteError::Format(_))
    }
}

impl From<reqwest::Error> for QuoteError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            QuoteError::Transport(format!("remote answered {status}"))
        } else if err.is_timeout() {
            QuoteError::Transport("request timed out".to_string())
        } else if err.is_decode() {
            QuoteError::Transport(format!("unreadable response body: {err}"))
        } else {
            QuoteError::Transport(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_errors() {
        assert!(QuoteError::Validation("empty".into()).is_user_error());
        assert!(QuoteError::Format("not an array".into()).is_user_error());
        assert!(!QuoteError::Transport("offline".into()).is_user_error());
    }

    #[test]
    fn error_display() {
        let err = QuoteError::storage(
            "quotes",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(err.to_string().contains("quotes"));
        assert!(err.to_string().contains("denied"));

        let err = QuoteError::Format("expected an array".into());
        assert_eq!(err.to_string(), "invalid import format: expected an array");
    }
}
