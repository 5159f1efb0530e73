//! Account validation rules.

use folio_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Maximum accepted email length.
pub const EMAIL_MAX_LENGTH: usize = 254;

/// Minimum password length.
pub const PASSWORD_MIN_LENGTH: usize = 10;

/// Maximum password length. Bounds Argon2 work per login attempt.
pub const PASSWORD_MAX_LENGTH: usize = 128;

/// Lowercased login email.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Creates a validated email address.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let normalized = value.into().trim().to_lowercase();

        if normalized.is_empty() {
            return Err(AppError::Validation(
                "email address must not be empty".to_owned(),
            ));
        }

        if normalized.len() > EMAIL_MAX_LENGTH {
            return Err(AppError::Validation(format!(
                "email address must not exceed {EMAIL_MAX_LENGTH} characters"
            )));
        }

        let Some((local, domain)) = normalized.split_once('@') else {
            return Err(AppError::Validation(
                "email address must contain '@'".to_owned(),
            ));
        };

        if local.is_empty() || domain.contains('@') {
            return Err(AppError::Validation(format!(
                "email address '{normalized}' is malformed"
            )));
        }

        if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
            return Err(AppError::Validation(format!(
                "email domain '{domain}' is malformed"
            )));
        }

        Ok(Self(normalized))
    }

    /// Returns the validated email string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

/// Validates a plaintext password before hashing.
pub fn validate_password(password: &str) -> AppResult<()> {
    let length = password.chars().count();

    if length < PASSWORD_MIN_LENGTH {
        return Err(AppError::Validation(format!(
            "password must be at least {PASSWORD_MIN_LENGTH} characters"
        )));
    }

    if length > PASSWORD_MAX_LENGTH {
        return Err(AppError::Validation(format!(
            "password must not exceed {PASSWORD_MAX_LENGTH} characters"
        )));
    }

    let lowered = password.to_lowercase();
    if COMMON_PASSWORDS.contains(&lowered.as_str()) {
        return Err(AppError::Validation(
            "password is too common".to_owned(),
        ));
    }

    Ok(())
}

static COMMON_PASSWORDS: &[&str] = &[
    "1234567890",
    "0123456789",
    "1q2w3e4r5t",
    "qwertyuiop",
    "password01",
    "password12",
    "password123",
    "iloveyou12",
    "adminadmin",
    "admin12345",
    "letmein123",
    "welcome123",
    "journal123",
    "editor1234",
    "reviewer123",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_is_lowercased() {
        let email = EmailAddress::new(" Editor@Journal.ORG ");
        assert_eq!(email.ok().map(String::from), Some("editor@journal.org".to_owned()));
    }

    #[test]
    fn malformed_emails_are_rejected() {
        assert!(EmailAddress::new("").is_err());
        assert!(EmailAddress::new("no-at-sign").is_err());
        assert!(EmailAddress::new("@journal.org").is_err());
        assert!(EmailAddress::new("a@b@journal.org").is_err());
        assert!(EmailAddress::new("user@localhost").is_err());
        assert!(EmailAddress::new("user@journal.").is_err());
    }

    #[test]
    fn password_length_bounds_are_enforced() {
        assert!(validate_password("short").is_err());
        assert!(validate_password(&"p".repeat(PASSWORD_MAX_LENGTH + 1)).is_err());
        assert!(validate_password(&"p".repeat(PASSWORD_MAX_LENGTH)).is_ok());
        assert!(validate_password("a long enough passphrase").is_ok());
    }

    #[test]
    fn common_password_is_rejected_case_insensitively() {
        assert!(validate_password("Password123").is_err());
    }
}
