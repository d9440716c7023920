//! Persistence layer error types

use medlift_domain::DomainError;
use thiserror::Error;

/// Persistence layer errors
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Entity not found: {entity_type} with key {key}")]
    NotFound {
        entity_type: &'static str,
        key: String,
    },

    #[error("{entity_type} with key {key} already exists")]
    Duplicate {
        entity_type: &'static str,
        key: String,
    },

    #[error("Write conflict: {0}")]
    WriteConflict(String),

    /// A domain rule refused the operation
    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl PersistenceError {
    /// Lookup failure in the wording clients see ("Could not find ...").
    #[must_use]
    pub fn missing(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::Domain(DomainError::not_found(entity_type, id))
    }
}

pub type Result<T> = std::result::Result<T, PersistenceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_uses_domain_wording() {
        let err = PersistenceError::missing("Drone", "D9");
        assert_eq!(err.to_string(), "Could not find Drone of ID D9");
    }

    #[test]
    fn test_duplicate_message() {
        let err = PersistenceError::Duplicate {
            entity_type: "Medication",
            key: "M1".into(),
        };
        assert_eq!(err.to_string(), "Medication with key M1 already exists");
    }
}
