//! Error taxonomy for the preview engine.
//!
//! Every public operation catches collaborator failures at its own boundary
//! and maps them into one of these variants; raw errors from the markdown
//! engine, the host page, or the session store never escape to callers.

use thiserror::Error;

/// Failure categories a preview operation can surface.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PreviewError {
    /// The external markdown engine failed or produced unusable output.
    #[error("markdown parsing failed: {0}")]
    Parse(String),

    /// The host page rejected a query or mutation.
    #[error("host page error: {0}")]
    Dom(String),

    /// Malformed input to a public entry point.
    #[error("invalid input: {0}")]
    Validation(String),

    /// The session store is unavailable or rejected a write.
    #[error("session storage unavailable: {0}")]
    Storage(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages_are_non_empty() {
        let errors = [
            PreviewError::Parse("engine panicked".into()),
            PreviewError::Dom("container vanished".into()),
            PreviewError::Validation("empty content".into()),
            PreviewError::Storage("store disabled".into()),
        ];
        for err in errors {
            assert!(!err.to_string().is_empty());
        }
    }

    #[test]
    fn test_display_carries_detail() {
        let err = PreviewError::Parse("bad fence".into());
        assert!(err.to_string().contains("bad fence"));
        let err = PreviewError::Storage("quota".into());
        assert!(err.to_string().contains("quota"));
    }
}
