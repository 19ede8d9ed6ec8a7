//! Validation error taxonomy for user records.
//!
//! Every rule is evaluated before a record is accepted; the caller receives
//! the full list of violations rather than the first one.

use std::fmt;

use serde::Serialize;

use crate::constants::{MAX_EMAIL_LENGTH, MAX_NAME_LENGTH, MIN_PASSWORD_LENGTH};

/// Validated attribute of a user record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UserField {
    Name,
    Email,
    Password,
}

impl UserField {
    /// Attribute name as it appears on the record
    pub fn as_str(&self) -> &'static str {
        match self {
            UserField::Name => "name",
            UserField::Email => "email",
            UserField::Password => "password",
        }
    }

    /// Resolve an attribute name reported by the validator.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "name" => Some(UserField::Name),
            "email" => Some(UserField::Email),
            "password" | "password_confirmation" => Some(UserField::Password),
            _ => None,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            UserField::Name => "Name",
            UserField::Email => "Email",
            UserField::Password => "Password",
        }
    }
}

impl fmt::Display for UserField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Violated rule. Codes match the ones attached to the `validator` attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    Blank,
    TooLong,
    TooShort,
    Invalid,
    Confirmation,
    Taken,
}

impl Rule {
    /// Stable machine code for the rule
    pub fn code(&self) -> &'static str {
        match self {
            Rule::Blank => "blank",
            Rule::TooLong => "too_long",
            Rule::TooShort => "too_short",
            Rule::Invalid => "invalid",
            Rule::Confirmation => "confirmation",
            Rule::Taken => "taken",
        }
    }

    /// Map a validator error code back to a rule. Unknown codes count as `Invalid`.
    pub fn from_code(code: &str) -> Self {
        match code {
            "blank" => Rule::Blank,
            "too_long" => Rule::TooLong,
            "too_short" => Rule::TooShort,
            "confirmation" => Rule::Confirmation,
            "taken" => Rule::Taken,
            _ => Rule::Invalid,
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A single `(field, rule)` failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct FieldViolation {
    pub field: UserField,
    pub rule: Rule,
}

impl FieldViolation {
    pub fn new(field: UserField, rule: Rule) -> Self {
        Self { field, rule }
    }

    /// Human readable message, e.g. "Name is too long (maximum is 50 characters)".
    pub fn message(&self) -> String {
        let detail = match (self.field, self.rule) {
            (_, Rule::Blank) => "can't be blank".to_string(),
            (UserField::Name, Rule::TooLong) => {
                format!("is too long (maximum is {} characters)", MAX_NAME_LENGTH)
            }
            (UserField::Email, Rule::TooLong) => {
                format!("is too long (maximum is {} characters)", MAX_EMAIL_LENGTH)
            }
            (_, Rule::TooLong) => "is too long".to_string(),
            (UserField::Password, Rule::TooShort) => {
                format!("is too short (minimum is {} characters)", MIN_PASSWORD_LENGTH)
            }
            (_, Rule::TooShort) => "is too short".to_string(),
            (_, Rule::Invalid) => "is invalid".to_string(),
            (_, Rule::Confirmation) => "doesn't match confirmation".to_string(),
            (_, Rule::Taken) => "has already been taken".to_string(),
        };
        format!("{} {}", self.field.label(), detail)
    }
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

/// Ordered, de-duplicated set of violations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    violations: Vec<FieldViolation>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Errors holding exactly one violation
    pub fn single(field: UserField, rule: Rule) -> Self {
        let mut errors = Self::new();
        errors.add(field, rule);
        errors
    }

    /// Record a violation; duplicates are ignored and ordering is by field, then rule.
    pub fn add(&mut self, field: UserField, rule: Rule) {
        let violation = FieldViolation::new(field, rule);
        if let Err(pos) = self.violations.binary_search(&violation) {
            self.violations.insert(pos, violation);
        }
    }

    /// Fold another set into this one
    pub fn merge(&mut self, other: ValidationErrors) {
        for violation in other.violations {
            self.add(violation.field, violation.rule);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldViolation> {
        self.violations.iter()
    }

    /// Check whether a specific rule failed on a field
    pub fn has(&self, field: UserField, rule: Rule) -> bool {
        self.violations
            .binary_search(&FieldViolation::new(field, rule))
            .is_ok()
    }

    /// Check whether any rule failed on a field
    pub fn has_field(&self, field: UserField) -> bool {
        self.violations.iter().any(|v| v.field == field)
    }

    /// Rules that failed on a field, in rule order
    pub fn on(&self, field: UserField) -> Vec<Rule> {
        self.violations
            .iter()
            .filter(|v| v.field == field)
            .map(|v| v.rule)
            .collect()
    }

    /// All messages, in field order
    pub fn full_messages(&self) -> Vec<String> {
        self.violations.iter().map(FieldViolation::message).collect()
    }

    /// `Ok(())` when empty, otherwise `Err(self)`
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_messages().join(", "))
    }
}

impl std::error::Error for ValidationErrors {}

impl From<validator::ValidationErrors> for ValidationErrors {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut collected = ValidationErrors::new();
        for (name, field_errors) in errors.field_errors() {
            let Some(field) = UserField::from_name(name.as_ref()) else {
                continue;
            };
            for error in field_errors.iter() {
                collected.add(field, Rule::from_code(&error.code));
            }
        }
        collected
    }
}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = &'a FieldViolation;
    type IntoIter = std::slice::Iter<'a, FieldViolation>;

    fn into_iter(self) -> Self::IntoIter {
        self.violations.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_keeps_order_and_dedupes() {
        let mut errors = ValidationErrors::new();
        errors.add(UserField::Password, Rule::TooShort);
        errors.add(UserField::Name, Rule::Blank);
        errors.add(UserField::Password, Rule::TooShort);

        assert_eq!(errors.len(), 2);
        let fields: Vec<UserField> = errors.iter().map(|v| v.field).collect();
        assert_eq!(fields, vec![UserField::Name, UserField::Password]);
    }

    #[test]
    fn test_merge_and_lookup() {
        let mut errors = ValidationErrors::single(UserField::Email, Rule::Invalid);
        errors.merge(ValidationErrors::single(UserField::Email, Rule::Taken));

        assert!(errors.has(UserField::Email, Rule::Taken));
        assert!(!errors.has(UserField::Name, Rule::Taken));
        assert_eq!(errors.on(UserField::Email), vec![Rule::Invalid, Rule::Taken]);
    }

    #[test]
    fn test_messages() {
        let errors = {
            let mut e = ValidationErrors::single(UserField::Name, Rule::TooLong);
            e.add(UserField::Email, Rule::Taken);
            e
        };

        assert_eq!(
            errors.full_messages(),
            vec![
                "Name is too long (maximum is 50 characters)".to_string(),
                "Email has already been taken".to_string(),
            ]
        );
        assert_eq!(
            errors.to_string(),
            "Name is too long (maximum is 50 characters), Email has already been taken"
        );
    }

    #[test]
    fn test_into_result() {
        assert!(ValidationErrors::new().into_result().is_ok());
        assert!(ValidationErrors::single(UserField::Password, Rule::Blank)
            .into_result()
            .is_err());
    }

    #[test]
    fn test_unknown_code_maps_to_invalid() {
        assert_eq!(Rule::from_code("regex"), Rule::Invalid);
        assert_eq!(Rule::from_code("taken"), Rule::Taken);
    }
}
