//! Domain-level constants.
//!
//! These constants define business rules and validation requirements.

// =============================================================================
// Validation
// =============================================================================

/// Maximum length of a user's display name (characters)
pub const MAX_NAME_LENGTH: u64 = 50;

/// Maximum length of an email address (characters)
pub const MAX_EMAIL_LENGTH: u64 = 255;

/// Minimum password length requirement
pub const MIN_PASSWORD_LENGTH: u64 = 6;

/// Accepted email shape. Simplified: rejects some valid RFC 5322 addresses
/// and accepts some invalid ones.
pub const VALID_EMAIL_PATTERN: &str = r"(?i)\A[a-z0-9_+\-.]+@[a-z0-9\-.]+\.[a-z]+\z";
