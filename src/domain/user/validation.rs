//! Validation and sanitization for incoming user data
//!
//! Validators are pure and operate on the raw request shape; the sanitizer
//! produces the canonical form that gets persisted. Keeping the two separate
//! lets the service always sanitize first (idempotent, never fails) and then
//! validate, so a string `"25"` and a number `25` for age yield identical
//! results downstream.

use serde_json::Value;
use thiserror::Error;

/// Errors that can occur during user validation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    #[error("username must not be empty")]
    EmptyUsername,

    #[error("username must be at least {0} characters")]
    UsernameTooShort(usize),

    #[error("username must be at most {0} characters")]
    UsernameTooLong(usize),

    #[error("username may only contain letters, digits and underscores")]
    InvalidUsernameCharacter(char),

    #[error("age must not be empty")]
    MissingAge,

    #[error("age must be a valid integer")]
    AgeNotAnInteger,

    #[error("age must not be negative")]
    NegativeAge,

    #[error("age must not exceed {0}")]
    AgeTooLarge(i64),
}

pub const MIN_USERNAME_LENGTH: usize = 3;
pub const MAX_USERNAME_LENGTH: usize = 20;
pub const MIN_AGE: i64 = 0;
pub const MAX_AGE: i64 = 120;

/// Validate a username
///
/// Rules (applied to the trimmed value):
/// - Cannot be empty
/// - 3 to 20 characters
/// - Only letters, digits and underscores
///
/// Trimming here only affects the checks; whether the trimmed or raw value
/// is persisted is decided by [`sanitize_user_data`].
pub fn validate_username(raw: &str) -> Result<(), UserValidationError> {
    let username = raw.trim();

    if username.is_empty() {
        return Err(UserValidationError::EmptyUsername);
    }

    let length = username.chars().count();

    if length < MIN_USERNAME_LENGTH {
        return Err(UserValidationError::UsernameTooShort(MIN_USERNAME_LENGTH));
    }

    if length > MAX_USERNAME_LENGTH {
        return Err(UserValidationError::UsernameTooLong(MAX_USERNAME_LENGTH));
    }

    for c in username.chars() {
        if !c.is_ascii_alphanumeric() && c != '_' {
            return Err(UserValidationError::InvalidUsernameCharacter(c));
        }
    }

    Ok(())
}

/// Leniently coerce a raw JSON value into an age
///
/// Accepts a JSON integer or a numeric string (surrounding whitespace
/// tolerated). Anything else, including floats, booleans and null, yields
/// `None`.
pub fn parse_age(raw: Option<&Value>) -> Option<i64> {
    match raw? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

/// Validate a raw age value
///
/// Absent, null and empty-string input are reported as missing; input that
/// cannot be coerced to an integer is reported as such; the parsed value
/// must lie within [0, 120]. Returns the parsed age on success.
pub fn validate_age(raw: Option<&Value>) -> Result<i64, UserValidationError> {
    let value = match raw {
        None | Some(Value::Null) => return Err(UserValidationError::MissingAge),
        Some(Value::String(s)) if s.trim().is_empty() => {
            return Err(UserValidationError::MissingAge);
        }
        Some(value) => value,
    };

    let age = parse_age(Some(value)).ok_or(UserValidationError::AgeNotAnInteger)?;

    if age < MIN_AGE {
        return Err(UserValidationError::NegativeAge);
    }

    if age > MAX_AGE {
        return Err(UserValidationError::AgeTooLarge(MAX_AGE));
    }

    Ok(age)
}

/// Canonical form of raw user input
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SanitizedUserData {
    /// Trimmed username; empty string when the input was absent
    pub username: String,
    /// Coerced age; `None` when the input was absent or not an integer
    pub age: Option<i64>,
}

/// Clean raw user input into its canonical form
///
/// Never fails: an unparseable age becomes `None`, which [`validate_age`]
/// later reports as a user-facing error. Idempotent by construction.
pub fn sanitize_user_data(username: Option<&str>, age: Option<&Value>) -> SanitizedUserData {
    SanitizedUserData {
        username: username.map(str::trim).unwrap_or_default().to_string(),
        age: parse_age(age),
    }
}
