//! CNPJ (company taxpayer number) validation

use super::{KeyFormatError, KeyValidator, all_equal, ascii_digits, mod11_check_digit};
use crate::domain::pix_key::KeyType;

const CNPJ_LENGTH: usize = 14;
const FIRST_WEIGHTS: [u32; 12] = [5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];
const SECOND_WEIGHTS: [u32; 13] = [6, 5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];

/// Validates 14-digit CNPJ numbers
///
/// Only digits, spaces and the usual mask punctuation (`.`, `-`, `/`) are
/// accepted before the digits are extracted.
#[derive(Debug, Clone, Copy, Default)]
pub struct CnpjValidator;

fn is_mask_char(c: char) -> bool {
    c.is_ascii_digit() || matches!(c, ' ' | '.' | '-' | '/')
}

impl KeyValidator for CnpjValidator {
    fn key_type(&self) -> KeyType {
        KeyType::Cnpj
    }

    fn validate(&self, raw: &str) -> Result<(), KeyFormatError> {
        let value = raw.trim();

        if value.is_empty() || !value.chars().all(is_mask_char) {
            return Err(KeyFormatError::Cnpj);
        }

        let digits = ascii_digits(value);

        if digits.len() != CNPJ_LENGTH || all_equal(&digits) {
            return Err(KeyFormatError::Cnpj);
        }

        let first = mod11_check_digit(&digits[..12], &FIRST_WEIGHTS);
        let second = mod11_check_digit(&digits[..13], &SECOND_WEIGHTS);

        if digits[12] != first || digits[13] != second {
            return Err(KeyFormatError::Cnpj);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validate(raw: &str) -> Result<(), KeyFormatError> {
        CnpjValidator.validate(raw)
    }

    #[test]
    fn test_valid_cnpj() {
        assert!(validate("12.345.678/0001-95").is_ok());
        assert!(validate("12345678000195").is_ok());
        assert!(validate("  12 345 678 0001 95 ").is_ok());
        assert!(validate("11.222.333/0001-81").is_ok());
    }

    #[test]
    fn test_wrong_check_digits() {
        assert_eq!(validate("12.345.678/0001-94"), Err(KeyFormatError::Cnpj));
        assert_eq!(validate("12.345.678/0001-85"), Err(KeyFormatError::Cnpj));
    }

    #[test]
    fn test_thirteen_digits_rejected() {
        assert_eq!(validate("1234567800019"), Err(KeyFormatError::Cnpj));
    }

    #[test]
    fn test_all_zero_and_all_equal_rejected() {
        assert_eq!(validate("00.000.000/0000-00"), Err(KeyFormatError::Cnpj));
        assert_eq!(validate("11111111111111"), Err(KeyFormatError::Cnpj));
    }

    #[test]
    fn test_disallowed_characters_rejected() {
        assert_eq!(validate("12.345.678/0001-9a"), Err(KeyFormatError::Cnpj));
        assert_eq!(validate("12_345_678_0001_95"), Err(KeyFormatError::Cnpj));
    }

    #[test]
    fn test_blank_rejected() {
        assert_eq!(validate(""), Err(KeyFormatError::Cnpj));
        assert_eq!(validate("   "), Err(KeyFormatError::Cnpj));
    }
}
