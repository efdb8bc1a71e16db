//! Engine error types.
//!
//! The taxonomy separates expected absence (new users have no roadmap,
//! no results) from structural corruption. Callers branch on these
//! classes without string matching: absence resolves to empty or
//! neutral results, corruption aborts the operation.

use thiserror::Error;

/// Errors produced by the rating engine and its store/embedder seams.
#[derive(Debug, Error)]
pub enum Error {
    /// A record the operation cannot proceed without is absent.
    #[error("no {entity} found for {key}")]
    MissingData { entity: &'static str, key: String },

    /// A stored record violates a structural invariant.
    #[error("invalid record: {reason}")]
    InvalidRecord { reason: String },

    /// The embedding backend failed.
    #[error("embedding failed: {0}")]
    Embedding(String),

    /// An embedding call exceeded its budget.
    #[error("embedding timed out after {seconds}s")]
    Timeout { seconds: u64 },

    /// The persistence backend failed.
    #[error("store error: {0}")]
    Store(String),
}

impl Error {
    pub fn missing(entity: &'static str, key: impl Into<String>) -> Self {
        Error::MissingData {
            entity,
            key: key.into(),
        }
    }

    pub fn invalid_record(reason: impl Into<String>) -> Self {
        Error::InvalidRecord {
            reason: reason.into(),
        }
    }

    pub fn store(reason: impl Into<String>) -> Self {
        Error::Store(reason.into())
    }

    /// Returns `true` for expected-absence conditions that callers may
    /// resolve to an empty result instead of failing.
    pub fn is_missing_data(&self) -> bool {
        matches!(self, Error::MissingData { .. })
    }

    /// Returns `true` for embedder failures the matcher degrades to
    /// "no match" rather than propagating.
    pub fn is_degradable(&self) -> bool {
        matches!(self, Error::Embedding(_) | Error::Timeout { .. })
    }
}

/// Result alias used across the engine.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_data_classification() {
        let err = Error::missing("roadmap", "8864862270");
        assert!(err.is_missing_data());
        assert!(!err.is_degradable());
        assert_eq!(err.to_string(), "no roadmap found for 8864862270");
    }

    #[test]
    fn degradable_classification() {
        assert!(Error::Embedding("model not loaded".into()).is_degradable());
        assert!(Error::Timeout { seconds: 10 }.is_degradable());
        assert!(!Error::invalid_record("negative maxScore").is_degradable());
    }
}
