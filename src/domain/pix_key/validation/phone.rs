//! Phone key validation

use super::{KeyFormatError, KeyValidator};
use crate::domain::pix_key::KeyType;

const COUNTRY_PREFIX: &str = "+55";

/// Validates Brazilian phone keys: `+55` followed by 10 or 11 digits
#[derive(Debug, Clone, Copy, Default)]
pub struct PhoneValidator;

impl KeyValidator for PhoneValidator {
    fn key_type(&self) -> KeyType {
        KeyType::Phone
    }

    fn validate(&self, raw: &str) -> Result<(), KeyFormatError> {
        let value = raw.trim();

        if value.is_empty() {
            return Err(KeyFormatError::PhoneBlank);
        }

        let digits = value
            .strip_prefix(COUNTRY_PREFIX)
            .ok_or(KeyFormatError::PhoneMissingPrefix)?;

        let valid_length = (10..=11).contains(&digits.len());

        if !valid_length || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(KeyFormatError::PhoneDigitCount);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validate(raw: &str) -> Result<(), KeyFormatError> {
        PhoneValidator.validate(raw)
    }

    #[test]
    fn test_valid_phones() {
        assert!(validate("+5511987654321").is_ok());
        assert!(validate("+551138765432").is_ok());
        assert!(validate("  +5511987654321 ").is_ok());
    }

    #[test]
    fn test_blank() {
        assert_eq!(validate(""), Err(KeyFormatError::PhoneBlank));
        assert_eq!(validate(" \t "), Err(KeyFormatError::PhoneBlank));
    }

    #[test]
    fn test_missing_prefix() {
        assert_eq!(validate("11987654321"), Err(KeyFormatError::PhoneMissingPrefix));
        assert_eq!(validate("5511987654321"), Err(KeyFormatError::PhoneMissingPrefix));
        assert_eq!(validate("+5411987654321"), Err(KeyFormatError::PhoneMissingPrefix));
    }

    #[test]
    fn test_wrong_digit_count() {
        assert_eq!(validate("+55119876543"), Err(KeyFormatError::PhoneDigitCount));
        assert_eq!(validate("+55119876543210"), Err(KeyFormatError::PhoneDigitCount));
        assert_eq!(validate("+55"), Err(KeyFormatError::PhoneDigitCount));
    }

    #[test]
    fn test_non_digits_after_prefix() {
        assert_eq!(validate("+55 11987654321"), Err(KeyFormatError::PhoneDigitCount));
        assert_eq!(validate("+55(11)98765432"), Err(KeyFormatError::PhoneDigitCount));
    }
}
