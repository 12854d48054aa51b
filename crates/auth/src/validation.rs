//! Input validation for phone numbers, passwords and OTP codes

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{AuthError, Result};

static MOBILE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^09\d{9}$").expect("valid mobile regex"));

/// Characters that count as special in a password
pub const PASSWORD_SPECIALS: &str = "!@#$%^&*(),.?\":{}|<>";

/// Minimum password length
pub const MIN_PASSWORD_LEN: usize = 8;

/// Check an Iranian mobile number: `09` followed by nine digits
pub fn validate_phone(phone: &str) -> Result<()> {
    if MOBILE_RE.is_match(phone) {
        Ok(())
    } else {
        Err(AuthError::validation(
            "phone_number",
            "must be a valid mobile number (e.g. 09121732430)",
        ))
    }
}

/// Check password strength
///
/// At least eight characters with a lowercase letter, an uppercase letter,
/// a digit and one of [`PASSWORD_SPECIALS`].
pub fn validate_password(password: &str) -> Result<()> {
    let fail = |message: &str| Err(AuthError::validation("password", message));

    if password.chars().count() < MIN_PASSWORD_LEN {
        return fail("must be at least 8 characters long");
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return fail("must contain at least one lowercase letter");
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return fail("must contain at least one uppercase letter");
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return fail("must contain at least one number");
    }
    if !password.chars().any(|c| PASSWORD_SPECIALS.contains(c)) {
        return fail("must contain at least one special character");
    }
    Ok(())
}

/// Check that a submitted OTP is exactly `digits` decimal digits
pub fn validate_code(code: &str, digits: usize) -> Result<()> {
    if code.is_empty() || !code.chars().all(|c| c.is_ascii_digit()) {
        return Err(AuthError::validation("otp_code", "must be numeric"));
    }
    if code.len() != digits {
        return Err(AuthError::validation(
            "otp_code",
            format!("must be {} digits", digits),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(result: Result<()>) -> String {
        match result {
            Err(AuthError::Validation { message, .. }) => message,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_phone() {
        assert!(validate_phone("09121732430").is_ok());
        assert!(validate_phone("9121732430").is_err());
        assert!(validate_phone("0912173243").is_err());
        assert!(validate_phone("091217324301").is_err());
        assert!(validate_phone("08121732430").is_err());
        assert!(validate_phone("0912173243a").is_err());
    }

    #[test]
    fn test_password_rules_in_order() {
        assert!(validate_password("Str0ng!pass").is_ok());
        assert!(message(validate_password("S1!a")).contains("8 characters"));
        assert!(message(validate_password("STRONG1!PASS")).contains("lowercase"));
        assert!(message(validate_password("strong1!pass")).contains("uppercase"));
        assert!(message(validate_password("Strong!pass")).contains("number"));
        assert!(message(validate_password("Strong1pass")).contains("special"));
    }

    #[test]
    fn test_code() {
        assert!(validate_code("12345", 5).is_ok());
        assert!(message(validate_code("12a45", 5)).contains("numeric"));
        assert!(message(validate_code("", 5)).contains("numeric"));
        assert!(message(validate_code("1234", 5)).contains("5 digits"));
    }
}
