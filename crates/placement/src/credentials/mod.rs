//! Credential utility: password hashing, input validation, sanitization and token generation.
//!
//! Validation functions return `Result<(), CredentialError>`; the error's `Display` output is the
//! user-facing reason string.

mod password;
mod sanitize;
mod token;
mod validate;

pub use password::{hash_password, verify_password, CredentialHasher};
pub use sanitize::sanitize_input;
pub use token::{generate_secure_token, DEFAULT_TOKEN_BYTES};
pub use validate::{
    validate_email, validate_password, validate_password_strength,
    validate_password_strength_medium, validate_username, PasswordPolicy,
};

/// Reasons a credential was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CredentialError {
    #[error("Password cannot be empty")]
    EmptyPassword,
    #[error("Password must be at least 6 characters long")]
    PasswordTooShort,
    #[error("Password must be less than 128 characters")]
    PasswordTooLong,
    #[error("Password must contain at least one letter")]
    PasswordMissingLetter,
    #[error("Password must contain at least one number")]
    PasswordMissingDigit,
    #[error("Password must contain at least one special character")]
    PasswordMissingSymbol,
    #[error("Username cannot be empty")]
    EmptyUsername,
    #[error("Username must be at least 3 characters long")]
    UsernameTooShort,
    #[error("Username must be less than 30 characters")]
    UsernameTooLong,
    #[error("Username can only contain letters, numbers, underscore, and hyphen")]
    UsernameCharset,
    #[error("Username must start with a letter or number")]
    UsernameStart,
    #[error("Invalid email address")]
    InvalidEmail,
    #[error("password hashing failed: {0}")]
    Hashing(String),
}
