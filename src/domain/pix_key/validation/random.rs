//! Random (opaque) key validation

use super::{KeyFormatError, KeyValidator};
use crate::domain::pix_key::KeyType;

/// Exact length of a random key
pub const RANDOM_KEY_LENGTH: usize = 32;

/// Validates random keys: exactly 32 ASCII alphanumeric characters,
/// case-sensitive, surrounding whitespace ignored
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomKeyValidator;

impl KeyValidator for RandomKeyValidator {
    fn key_type(&self) -> KeyType {
        KeyType::Random
    }

    fn validate(&self, raw: &str) -> Result<(), KeyFormatError> {
        let value = raw.trim();

        if value.len() != RANDOM_KEY_LENGTH || !value.bytes().all(|b| b.is_ascii_alphanumeric()) {
            return Err(KeyFormatError::Random(RANDOM_KEY_LENGTH));
        }

        Ok(())
    }
}
