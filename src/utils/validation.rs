//! Input validation for registration and admin provisioning

use crate::utils::error::{CmsError, Result};
use once_cell::sync::Lazy;
use regex::Regex;

static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("valid username regex"));

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("valid email regex")
});

/// Validate a username: 3-80 characters from `[A-Za-z0-9_-]`
pub fn validate_username(username: &str) -> Result<()> {
    if username.len() < 3 || username.len() > 80 {
        return Err(CmsError::validation(
            "Username must be between 3 and 80 characters",
        ));
    }
    if !USERNAME_RE.is_match(username) {
        return Err(CmsError::validation(
            "Username may only contain letters, digits, underscores and hyphens",
        ));
    }
    Ok(())
}

/// Validate an email address format
pub fn validate_email(email: &str) -> Result<()> {
    if email.len() > 120 || !EMAIL_RE.is_match(email) {
        return Err(CmsError::validation("Invalid email address"));
    }
    Ok(())
}

/// Validate a password before it is handed to the hashing policy
pub fn validate_password(password: &str) -> Result<()> {
    if password.len() < 8 {
        return Err(CmsError::validation(
            "Password must be at least 8 characters",
        ));
    }
    if password.len() > 128 {
        return Err(CmsError::validation(
            "Password must be at most 128 characters",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_username() {
        assert!(validate_username("valid_user").is_ok());
        assert!(validate_username("user-123").is_ok());
        assert!(validate_username("").is_err());
        assert!(validate_username("ab").is_err());
        assert!(validate_username("invalid@user").is_err());
        assert!(validate_username("spaced user").is_err());
        assert!(validate_username(&"x".repeat(81)).is_err());
        assert!(validate_username(&"x".repeat(80)).is_ok());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("user@example.com").is_ok());
        assert!(validate_email("first.last+tag@sub.example.org").is_ok());
        assert!(validate_email("not-an-email").is_err());
        assert!(validate_email("missing@tld").is_err());
        assert!(validate_email("@example.com").is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("longenough").is_ok());
        assert!(validate_password("short").is_err());
        assert!(validate_password(&"x".repeat(129)).is_err());
    }
}
