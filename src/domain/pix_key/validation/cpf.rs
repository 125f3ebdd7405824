//! CPF (individual taxpayer number) validation

use super::{KeyFormatError, KeyValidator, all_equal, ascii_digits, mod11_check_digit};
use crate::domain::pix_key::KeyType;

const CPF_LENGTH: usize = 11;
const FIRST_WEIGHTS: [u32; 9] = [10, 9, 8, 7, 6, 5, 4, 3, 2];
const SECOND_WEIGHTS: [u32; 10] = [11, 10, 9, 8, 7, 6, 5, 4, 3, 2];

/// Validates 11-digit CPF numbers, masked (`529.982.247-25`) or bare
#[derive(Debug, Clone, Copy, Default)]
pub struct CpfValidator;

impl KeyValidator for CpfValidator {
    fn key_type(&self) -> KeyType {
        KeyType::Cpf
    }

    fn validate(&self, raw: &str) -> Result<(), KeyFormatError> {
        let digits = ascii_digits(raw);

        if digits.len() != CPF_LENGTH || all_equal(&digits) {
            return Err(KeyFormatError::Cpf);
        }

        let first = mod11_check_digit(&digits[..9], &FIRST_WEIGHTS);
        let second = mod11_check_digit(&digits[..10], &SECOND_WEIGHTS);

        if digits[9] != first || digits[10] != second {
            return Err(KeyFormatError::Cpf);
        }

        Ok(())
    }
}
