//! Domain-level errors.
//!
//! These errors represent business rule violations and domain logic failures.
//! They are independent of infrastructure concerns (database, CLI).

use thiserror::Error;

use crate::validation::ValidationErrors;

/// Domain-specific errors for business rule violations.
#[derive(Error, Debug, Clone)]
pub enum DomainError {
    /// One or more validation rules failed
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    /// Password hashing configuration errors
    #[error("Password error: {0}")]
    Password(String),

    /// Internal domain error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    /// Create a password error
    pub fn password(msg: impl Into<String>) -> Self {
        DomainError::Password(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        DomainError::Internal(msg.into())
    }
}

impl From<ValidationErrors> for DomainError {
    fn from(errors: ValidationErrors) -> Self {
        DomainError::Validation(errors)
    }
}

/// Result type alias for domain operations
pub type DomainResult<T> = Result<T, DomainError>;
