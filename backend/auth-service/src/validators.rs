use once_cell::sync::Lazy;
use regex::Regex;

/// Input validation utilities for auth-service

// Compile regex patterns once at startup
static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    // This regex is hardcoded and validated - it is a compile-time constant in practice
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
        .expect("hardcoded email regex is invalid - fix source code")
});

/// Validate email format (RFC 5322 simplified)
pub fn validate_email(email: &str) -> bool {
    !email.is_empty() && email.len() <= 254 && EMAIL_REGEX.is_match(email)
}

/// Validate password strength requirements
/// - Minimum 8 characters
/// - At least one uppercase letter
/// - At least one lowercase letter
/// - At least one digit
/// - At least one special character
///
/// Returns the first failed requirement, or `None` when the password passes.
pub fn password_weakness(password: &str) -> Option<&'static str> {
    if password.len() < 8 {
        return Some("must be at least 8 characters");
    }

    if !password.chars().any(|c| c.is_uppercase()) {
        return Some("must contain at least one uppercase letter");
    }
    if !password.chars().any(|c| c.is_lowercase()) {
        return Some("must contain at least one lowercase letter");
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Some("must contain at least one digit");
    }
    if !password.chars().any(|c| !c.is_alphanumeric()) {
        return Some("must contain at least one special character");
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_email() {
        assert!(validate_email("user@example.com"));
        assert!(validate_email("test.user+tag@sub.example.co.uk"));
    }

    #[test]
    fn test_invalid_email() {
        assert!(!validate_email("invalid"));
        assert!(!validate_email("@example.com"));
        assert!(!validate_email("user@"));
        assert!(!validate_email(""));
    }

    #[test]
    fn test_valid_password() {
        assert!(password_weakness("SecurePass123!").is_none());
        assert!(password_weakness("Passw0rd!").is_none());
    }

    #[test]
    fn test_invalid_password() {
        assert!(password_weakness("short1!").is_some()); // Too short
        assert!(password_weakness("password123!").is_some()); // No uppercase
        assert!(password_weakness("PASSWORD123!").is_some()); // No lowercase
        assert!(password_weakness("SecurePassword!").is_some()); // No digit
        assert!(password_weakness("SecurePass1").is_some()); // No special char
    }
}
