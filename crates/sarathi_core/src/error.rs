//! Error taxonomy shared across the workspace.
//!
//! The split matters for the pipeline: validation and authorization errors
//! propagate and stop a request; upstream and persistence errors are caught
//! at the stage where they occur and converted to degraded output.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Malformed or out-of-range request input. Never retried or degraded.
    #[error("validation error: {0}")]
    Validation(String),

    /// A referenced entity is absent. First field names the entity kind.
    #[error("{0} not found: {1}")]
    NotFound(&'static str, String),

    /// A terminal transition was attempted twice, or a write hit a
    /// closed resource (e.g. appending to an ended session).
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// Caller identity could not be established.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Caller does not own the referenced resource.
    #[error("access denied: {0}")]
    Forbidden(String),

    /// A black-box adapter (classifier, index, generator, verifier) failed.
    #[error("upstream adapter failure: {0}")]
    Upstream(String),

    /// A secondary write failed after the response was already computed.
    #[error("persistence failure: {0}")]
    Persistence(String),

    #[error("database error: {0}")]
    Database(String),
}

impl Error {
    /// True for the errors that must stop a request instead of degrading.
    pub fn is_request_fatal(&self) -> bool {
        matches!(
            self,
            Error::Validation(_) | Error::Unauthorized(_) | Error::Forbidden(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        assert!(Error::Validation("empty input".into()).is_request_fatal());
        assert!(Error::Forbidden("not your session".into()).is_request_fatal());
        assert!(!Error::Upstream("model down".into()).is_request_fatal());
        assert!(!Error::Persistence("disk full".into()).is_request_fatal());
    }

    #[test]
    fn test_not_found_message() {
        let e = Error::NotFound("session", "abc".into());
        assert_eq!(e.to_string(), "session not found: abc");
    }
}
