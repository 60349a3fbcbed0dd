//! Phone-number verification capability
//!
//! Real deployments bind a platform phone library behind this trait; the
//! bundled verifier applies per-region digit rules, which is enough for the
//! validation flows here.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PhoneError {
    #[error("phone number contains characters that cannot be parsed")]
    Unparsable,
}

/// Capability interface the validation layer depends on.
pub trait PhoneNumberVerifier: Send + Sync {
    /// Whether `phone` is a plausible national number for the ISO 3166-1
    /// alpha-2 `region_code`. Errors mean the input could not be parsed at
    /// all, as opposed to parsing fine but being invalid for the region.
    fn is_valid_number(&self, phone: &str, region_code: &str) -> Result<bool, PhoneError>;
}

/// Default adapter: strips formatting and checks digit counts per region.
pub struct DigitRuleVerifier;

impl DigitRuleVerifier {
    fn expected_digits(region_code: &str) -> std::ops::RangeInclusive<usize> {
        match region_code {
            "EG" => 10..=10,
            "US" | "CA" => 10..=10,
            "GB" => 10..=11,
            "DE" => 10..=11,
            "IN" => 10..=10,
            _ => 6..=14,
        }
    }
}

impl PhoneNumberVerifier for DigitRuleVerifier {
    fn is_valid_number(&self, phone: &str, region_code: &str) -> Result<bool, PhoneError> {
        let cleaned: String = phone
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '(' | ')'))
            .collect();
        let digits = cleaned.strip_prefix('+').unwrap_or(&cleaned);
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(PhoneError::Unparsable);
        }
        Ok(Self::expected_digits(region_code).contains(&digits.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_a_well_formed_regional_number() {
        let verifier = DigitRuleVerifier;
        assert!(verifier.is_valid_number("1012345678", "EG").unwrap());
        assert!(verifier.is_valid_number("(555) 123-4567", "US").unwrap());
    }

    #[test]
    fn rejects_wrong_length_for_region() {
        let verifier = DigitRuleVerifier;
        assert!(!verifier.is_valid_number("12345", "EG").unwrap());
    }

    #[test]
    fn unparsable_input_is_an_error() {
        let verifier = DigitRuleVerifier;
        assert!(verifier.is_valid_number("not-a-number", "EG").is_err());
    }
}
