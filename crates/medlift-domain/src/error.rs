//! Domain-level errors

use thiserror::Error;

/// Errors raised while constructing or mutating domain entities.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// A field failed its format, range or pattern rule.
    #[error("Invalid input format: input \"{input}\" doesn't match expected pattern \"{expected}\"")]
    InvalidInputFormat { input: String, expected: String },

    /// A business-rule precondition failed.
    #[error("{0}")]
    UnmetConditions(String),

    #[error("Could not find {entity_type} of ID {id}")]
    ResourceNotFound { entity_type: &'static str, id: String },

    /// The entity is in a state that forbids the operation (deletion guards,
    /// medication already carried by another drone).
    #[error("{0}")]
    Conflict(String),

    #[error(
        "Drone {drone} cannot take {requested} more weight units (load {load_weight} of {weight_limit})"
    )]
    CapacityExceeded {
        drone: String,
        load_weight: i64,
        requested: i64,
        weight_limit: i32,
    },

    /// Internal failure not attributable to the caller's input.
    #[error("Request processing failed: {0}")]
    RequestProcessing(String),
}

impl DomainError {
    pub fn invalid_input(input: impl Into<String>, expected: impl Into<String>) -> Self {
        Self::InvalidInputFormat {
            input: input.into(),
            expected: expected.into(),
        }
    }

    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::ResourceNotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Stable machine-readable code for the error variant
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidInputFormat { .. } => "INVALID_INPUT_FORMAT",
            Self::UnmetConditions(_) => "UNMET_CONDITIONS",
            Self::ResourceNotFound { .. } => "RESOURCE_NOT_FOUND",
            Self::Conflict(_) => "CONFLICT",
            Self::CapacityExceeded { .. } => "CAPACITY_EXCEEDED",
            Self::RequestProcessing(_) => "REQUEST_PROCESSING",
        }
    }
}

pub type DomainResult<T> = std::result::Result<T, DomainError>;
