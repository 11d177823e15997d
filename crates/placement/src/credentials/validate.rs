use std::sync::OnceLock;

use regex::Regex;

use super::CredentialError;

const PASSWORD_MIN_CHARS: usize = 6;
const PASSWORD_MAX_CHARS: usize = 128;
const USERNAME_MIN_CHARS: usize = 3;
const USERNAME_MAX_CHARS: usize = 30;

/// Which password rules registration enforces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PasswordPolicy {
    /// Letter, digit and punctuation required.
    #[default]
    Strict,
    /// Letter required.
    Medium,
}

pub fn validate_password(password: &str, policy: PasswordPolicy) -> Result<(), CredentialError> {
    match policy {
        PasswordPolicy::Strict => validate_password_strength(password),
        PasswordPolicy::Medium => validate_password_strength_medium(password),
    }
}

pub fn validate_password_strength(password: &str) -> Result<(), CredentialError> {
    validate_password_strength_medium(password)?;

    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(CredentialError::PasswordMissingDigit);
    }
    if !password.chars().any(|c| c.is_ascii_punctuation()) {
        return Err(CredentialError::PasswordMissingSymbol);
    }
    Ok(())
}

pub fn validate_password_strength_medium(password: &str) -> Result<(), CredentialError> {
    if password.is_empty() {
        return Err(CredentialError::EmptyPassword);
    }

    let length = password.chars().count();
    if length < PASSWORD_MIN_CHARS {
        return Err(CredentialError::PasswordTooShort);
    }
    if length > PASSWORD_MAX_CHARS {
        return Err(CredentialError::PasswordTooLong);
    }
    if !password.chars().any(|c| c.is_ascii_alphabetic()) {
        return Err(CredentialError::PasswordMissingLetter);
    }
    Ok(())
}

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .expect("email pattern compiles")
    })
}

pub fn validate_email(email: &str) -> bool {
    !email.is_empty() && email_pattern().is_match(email)
}

/// Surrounding whitespace is ignored; callers should store the trimmed value.
pub fn validate_username(username: &str) -> Result<(), CredentialError> {
    let username = username.trim();
    if username.is_empty() {
        return Err(CredentialError::EmptyUsername);
    }

    let length = username.chars().count();
    if length < USERNAME_MIN_CHARS {
        return Err(CredentialError::UsernameTooShort);
    }
    if length > USERNAME_MAX_CHARS {
        return Err(CredentialError::UsernameTooLong);
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(CredentialError::UsernameCharset);
    }
    if !username
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphanumeric())
    {
        return Err(CredentialError::UsernameStart);
    }
    Ok(())
}
