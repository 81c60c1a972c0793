//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Variants map one-to-one onto the HTTP taxonomy at the API boundary:
/// validation and failed lifecycle preconditions become 400, missing entities
/// 404, duplicate email 409, protected targets 403, and the storage/crypto
/// variants a logged 500 with a generic client message.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. malformed or missing input).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A requested entity does not exist.
    #[error("{entity} not found")]
    NotFound { entity: &'static str },

    /// A uniqueness conflict (e.g. duplicate email).
    #[error("{0}")]
    Conflict(String),

    /// A lifecycle action whose precondition is not met.
    #[error("{0}")]
    InvalidTransition(String),

    /// An action against a categorically protected target.
    #[error("{0}")]
    PermissionDenied(String),

    /// Persistence failure. Never shown to clients verbatim.
    #[error("storage failure: {0}")]
    Storage(String),

    /// Hashing/signing failure. Never shown to clients verbatim.
    #[error("crypto failure: {0}")]
    Crypto(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(entity: &'static str) -> Self {
        Self::NotFound { entity }
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn invalid_transition(msg: impl Into<String>) -> Self {
        Self::InvalidTransition(msg.into())
    }

    pub fn permission_denied(msg: impl Into<String>) -> Self {
        Self::PermissionDenied(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    pub fn crypto(msg: impl Into<String>) -> Self {
        Self::Crypto(msg.into())
    }
}
