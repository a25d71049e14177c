//! Signup input validation.
//!
//! Checks run in a fixed order: type, presence, username length, password
//! length. The first failure wins. Lengths count Unicode scalar values of
//! the trimmed input.

use serde_json::Value;
use thiserror::Error;

pub const MIN_USERNAME_LEN: usize = 3;
pub const MAX_USERNAME_LEN: usize = 50;
pub const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Invalid input types")]
    InvalidType,

    #[error("Username and password are required")]
    Empty,

    #[error("Username must be between 3 and 50 characters")]
    UsernameLength,

    #[error("Password must be at least 8 characters long")]
    PasswordLength,
}

impl ValidationError {
    /// Stable machine-readable reason code
    pub fn reason(&self) -> &'static str {
        match self {
            ValidationError::InvalidType => "invalid-type",
            ValidationError::Empty => "empty",
            ValidationError::UsernameLength => "username-length",
            ValidationError::PasswordLength => "password-length",
        }
    }
}

/// Trimmed, validated signup input.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// `Null` counts as absent; any other non-string is a type error.
fn as_text(value: &Value) -> Result<Option<&str>, ValidationError> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s.as_str())),
        _ => Err(ValidationError::InvalidType),
    }
}

/// Validate raw JSON inputs and return trimmed credentials.
pub fn validate(raw_username: &Value, raw_password: &Value) -> Result<Credentials, ValidationError> {
    let username = as_text(raw_username)?;
    let password = as_text(raw_password)?;

    let (Some(username), Some(password)) = (username, password) else {
        return Err(ValidationError::Empty);
    };

    let username = username.trim();
    let password = password.trim();

    if username.is_empty() || password.is_empty() {
        return Err(ValidationError::Empty);
    }

    let username_len = username.chars().count();
    if !(MIN_USERNAME_LEN..=MAX_USERNAME_LEN).contains(&username_len) {
        return Err(ValidationError::UsernameLength);
    }

    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::PasswordLength);
    }

    Ok(Credentials {
        username: username.to_string(),
        password: password.to_string(),
    })
}
