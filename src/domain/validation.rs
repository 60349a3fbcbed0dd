//! Stateless input validation rules
//!
//! Each function returns a [`ValidationResult`] that event handlers fold
//! into per-field error state; nothing here is ever thrown or surfaced as a
//! hard error.
use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::phone::PhoneNumberVerifier;

/// Outcome of validating a single input field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    pub is_successful: bool,
    pub error_message: Option<String>,
}

impl ValidationResult {
    pub fn ok() -> Self {
        Self {
            is_successful: true,
            error_message: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            is_successful: false,
            error_message: Some(message.into()),
        }
    }
}

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9+._%\-]{1,256}@[a-zA-Z0-9][a-zA-Z0-9\-]{0,64}(\.[a-zA-Z0-9][a-zA-Z0-9\-]{0,25})+$",
    )
    .expect("email regex is valid")
});

pub fn validate_email(email: &str) -> ValidationResult {
    if email.trim().is_empty() {
        return ValidationResult::error("Email cannot be empty.");
    }
    if !EMAIL_REGEX.is_match(email) {
        return ValidationResult::error("That's not a valid email.");
    }
    ValidationResult::ok()
}

pub fn validate_password(password: &str) -> ValidationResult {
    if password.len() < 6 {
        return ValidationResult::error("Password must be at least 6 characters long.");
    }
    ValidationResult::ok()
}

pub fn validate_confirm_password(password: &str, confirm_password: &str) -> ValidationResult {
    if password != confirm_password {
        return ValidationResult::error("Passwords do not match");
    }
    ValidationResult::ok()
}

pub fn validate_first_name(first_name: &str) -> ValidationResult {
    if first_name.trim().is_empty() {
        return ValidationResult::error("Name cannot be empty.");
    }
    if first_name.len() < 2 {
        return ValidationResult::error("Name must be at least 2 characters long.");
    }
    ValidationResult::ok()
}

pub fn validate_surname(surname: &str) -> ValidationResult {
    if surname.trim().is_empty() {
        return ValidationResult::error("Surname cannot be empty.");
    }
    if surname.len() < 2 {
        return ValidationResult::error("Surname must be at least 2 characters long.");
    }
    ValidationResult::ok()
}

/// Validate a phone number for a region using the bound verifier.
pub fn validate_phone(
    verifier: &dyn PhoneNumberVerifier,
    phone: &str,
    region_code: &str,
) -> ValidationResult {
    if phone.trim().is_empty() {
        return ValidationResult::error("Phone number cannot be empty.");
    }
    match verifier.is_valid_number(phone, region_code) {
        Ok(true) => ValidationResult::ok(),
        Ok(false) => ValidationResult::error("Invalid phone number for the selected region."),
        Err(_) => ValidationResult::error("Invalid phone number format."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::phone::DigitRuleVerifier;

    #[test]
    fn password_needs_six_characters() {
        let short = validate_password("12345");
        assert!(!short.is_successful);
        assert_eq!(
            short.error_message.as_deref(),
            Some("Password must be at least 6 characters long.")
        );

        let ok = validate_password("123456");
        assert!(ok.is_successful);
        assert!(ok.error_message.is_none());
    }

    #[test]
    fn email_format_is_enforced() {
        assert!(!validate_email("").is_successful);
        assert!(!validate_email("nonsense@").is_successful);
        assert!(!validate_email("user@host").is_successful);
        assert!(validate_email("user@example.com").is_successful);
    }

    #[test]
    fn confirm_password_must_match() {
        assert!(!validate_confirm_password("secret1", "secret2").is_successful);
        assert!(validate_confirm_password("secret1", "secret1").is_successful);
    }

    #[test]
    fn names_need_two_characters() {
        assert!(!validate_first_name(" ").is_successful);
        assert!(!validate_first_name("A").is_successful);
        assert!(validate_first_name("Al").is_successful);
        assert!(!validate_surname("").is_successful);
        assert!(validate_surname("Ng").is_successful);
    }

    #[test]
    fn phone_validation_distinguishes_invalid_and_unparsable() {
        let verifier = DigitRuleVerifier;
        assert!(!validate_phone(&verifier, "", "EG").is_successful);

        let wrong_region = validate_phone(&verifier, "12345", "EG");
        assert_eq!(
            wrong_region.error_message.as_deref(),
            Some("Invalid phone number for the selected region.")
        );

        let garbage = validate_phone(&verifier, "abc", "EG");
        assert_eq!(
            garbage.error_message.as_deref(),
            Some("Invalid phone number format.")
        );

        assert!(validate_phone(&verifier, "1012345678", "EG").is_successful);
    }
}
