//! Unified error handling for the user service.
//!
//! Provides a single error type with:
//! - the validation taxonomy from the domain crate
//! - storage errors, with unique-index rejections split out as conflicts
//! - stable machine codes and user-facing messages that hide internals

use domain::{DomainError, Rule, UserField, ValidationErrors};
use thiserror::Error;

/// Application error types.
#[derive(Error, Debug)]
pub enum AppError {
    // Validation
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    /// The storage layer's unique index rejected a write that passed validation
    #[error("Uniqueness conflict: {0}")]
    UniquenessConflict(String),

    // Resource errors
    #[error("Resource not found")]
    NotFound,

    #[error("Invalid credentials")]
    InvalidCredentials,

    // External service errors
    #[cfg(feature = "database")]
    #[error("Database error")]
    Database(sea_orm::DbErr),

    // Internal
    #[error("Internal error")]
    Internal(String),
}

impl AppError {
    /// Get error code for callers
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::UniquenessConflict(_) => "UNIQUENESS_CONFLICT",
            AppError::NotFound => "NOT_FOUND",
            AppError::InvalidCredentials => "INVALID_CREDENTIALS",
            #[cfg(feature = "database")]
            AppError::Database(_) => "DATABASE_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Validation-style view of this error.
    ///
    /// A storage-level uniqueness conflict reads as `email: taken`, the same as
    /// the application-level rule.
    pub fn violations(&self) -> Option<ValidationErrors> {
        match self {
            AppError::Validation(errors) => Some(errors.clone()),
            AppError::UniquenessConflict(_) => Some(email_taken()),
            _ => None,
        }
    }

    /// True for errors the caller can fix by changing the input
    pub fn is_validation(&self) -> bool {
        matches!(self, AppError::Validation(_) | AppError::UniquenessConflict(_))
    }

    /// Fold a storage conflict into the validation taxonomy; other errors pass through.
    pub fn into_validation(self) -> Self {
        match self {
            AppError::UniquenessConflict(_) => AppError::Validation(email_taken()),
            other => other,
        }
    }

    /// Get user-facing message (hides internal details)
    pub fn user_message(&self) -> String {
        match self {
            // Show full message for client errors
            AppError::Validation(errors) => errors.to_string(),
            AppError::UniquenessConflict(_) => email_taken().to_string(),

            // Hide details for internal errors
            #[cfg(feature = "database")]
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                "A database error occurred".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "An internal error occurred".to_string()
            }

            // Use default message for others
            _ => self.to_string(),
        }
    }
}

fn email_taken() -> ValidationErrors {
    ValidationErrors::single(UserField::Email, Rule::Taken)
}

// =============================================================================
// Storage Error Conversion
// =============================================================================

#[cfg(feature = "database")]
impl From<sea_orm::DbErr> for AppError {
    fn from(err: sea_orm::DbErr) -> Self {
        match err.sql_err() {
            Some(sea_orm::SqlErr::UniqueConstraintViolation(detail)) => {
                AppError::UniquenessConflict(detail)
            }
            _ => AppError::Database(err),
        }
    }
}

// =============================================================================
// Domain Error Conversion
// =============================================================================

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(errors) => AppError::Validation(errors),
            DomainError::Password(msg) => AppError::Internal(msg),
            DomainError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        AppError::Validation(errors)
    }
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;

/// Extension trait for Option -> AppError conversion
pub trait OptionExt<T> {
    fn ok_or_not_found(self) -> AppResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_not_found(self) -> AppResult<T> {
        self.ok_or(AppError::NotFound)
    }
}

/// Convenience constructors
impl AppError {
    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }
}
