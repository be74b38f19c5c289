//! Error types for the events crate.

use thiserror::Error;

/// Result type alias for event operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Event error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Session id outside the accepted alphabet or length.
    #[error("invalid session id '{value}': expected 1-128 characters from [A-Za-z0-9_-]")]
    InvalidSessionId { value: String },

    /// The session's channel was dropped.
    #[error("event channel closed")]
    ChannelClosed,
}

impl Error {
    /// True for errors caused by client input.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::InvalidSessionId { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InvalidSessionId {
            value: "a b".to_string(),
        };
        assert!(err.to_string().contains("'a b'"));
        assert!(err.is_validation());
        assert!(!Error::ChannelClosed.is_validation());
    }
}
