//! User domain entity and related types.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::constants::VALID_EMAIL_PATTERN;
use crate::password::{PasswordDigest, PasswordHasher};
use crate::validation::ValidationErrors;

static VALID_EMAIL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(VALID_EMAIL_PATTERN).expect("email pattern compiles"));

/// Check an address against the accepted email shape.
pub fn is_valid_email(email: &str) -> bool {
    VALID_EMAIL_REGEX.is_match(email)
}

/// Lower-cased form used for storage and uniqueness comparisons
pub fn normalize_email(email: &str) -> String {
    email.to_lowercase()
}

/// User domain entity (a persisted record)
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_digest: PasswordDigest,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Check a plain text password against this user's digest.
    pub fn authenticate(&self, hasher: &PasswordHasher, password: &str) -> bool {
        hasher.verify(password, &self.password_digest)
    }
}

/// Candidate attributes for creating or re-saving a user.
///
/// `password` and `password_confirmation` are transient: only the digest
/// derived from them is ever stored.
#[derive(Clone, Default, Deserialize, Validate)]
pub struct NewUser {
    #[validate(
        custom(function = "validate_present"),
        length(max = 50, code = "too_long")
    )]
    pub name: String,

    #[validate(
        custom(function = "validate_present"),
        length(max = 255, code = "too_long"),
        regex(path = *VALID_EMAIL_REGEX, code = "invalid")
    )]
    pub email: String,

    #[validate(
        custom(function = "validate_present"),
        length(min = 6, code = "too_short"),
        must_match(other = "password_confirmation", code = "confirmation")
    )]
    pub password: String,

    pub password_confirmation: String,
}

// Keep plain text passwords out of logs
impl std::fmt::Debug for NewUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewUser")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("password_confirmation", &"[REDACTED]")
            .finish()
    }
}

impl NewUser {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
        password_confirmation: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            password: password.into(),
            password_confirmation: password_confirmation.into(),
        }
    }

    /// Set password and confirmation to the same value.
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        let password = password.into();
        self.password_confirmation = password.clone();
        self.password = password;
        self
    }

    /// Run every synchronous rule (presence, length, format, confirmation).
    ///
    /// Uniqueness needs storage and is checked by the service layer.
    pub fn check(&self) -> Result<(), ValidationErrors> {
        self.validate().map_err(ValidationErrors::from)
    }
}

fn validate_present(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// A candidate that passed every rule, with its password already hashed.
#[derive(Debug, Clone)]
pub struct ValidatedUser {
    name: String,
    email: String,
    password_digest: PasswordDigest,
}

impl ValidatedUser {
    /// Pair an accepted candidate with the digest of its password.
    pub fn accept(candidate: NewUser, password_digest: PasswordDigest) -> Self {
        Self {
            name: candidate.name,
            email: candidate.email,
            password_digest,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Email as submitted
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Email in the form that is written to storage
    pub fn normalized_email(&self) -> String {
        normalize_email(&self.email)
    }

    pub fn password_digest(&self) -> &PasswordDigest {
        &self.password_digest
    }
}
