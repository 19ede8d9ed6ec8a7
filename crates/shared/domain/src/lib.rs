//! Domain layer - Core business entities and value objects.
//!
//! This crate contains pure domain logic with no infrastructure dependencies:
//! the user entity, its validation rules, and password hashing.

pub mod constants;
pub mod error;
pub mod password;
pub mod user;
pub mod validation;

pub use constants::*;
pub use error::{DomainError, DomainResult};
pub use password::{HashCost, PasswordDigest, PasswordHasher};
pub use user::{is_valid_email, normalize_email, NewUser, User, ValidatedUser};
pub use validation::{FieldViolation, Rule, UserField, ValidationErrors};
