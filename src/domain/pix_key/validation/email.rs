//! Email key validation

use once_cell::sync::Lazy;
use regex::Regex;

use super::{KeyFormatError, KeyValidator};
use crate::domain::pix_key::KeyType;

/// Maximum email length, in characters
pub const MAX_EMAIL_LENGTH: usize = 77;

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").unwrap()
});

/// Validates email keys: `local@domain.tld`, at most 77 characters
#[derive(Debug, Clone, Copy, Default)]
pub struct EmailValidator;

impl KeyValidator for EmailValidator {
    fn key_type(&self) -> KeyType {
        KeyType::Email
    }

    fn validate(&self, raw: &str) -> Result<(), KeyFormatError> {
        let value = raw.trim();

        if value.is_empty() {
            return Err(KeyFormatError::EmailBlank);
        }

        if value.chars().count() > MAX_EMAIL_LENGTH {
            return Err(KeyFormatError::EmailTooLong(MAX_EMAIL_LENGTH));
        }

        if !EMAIL_PATTERN.is_match(value) {
            return Err(KeyFormatError::EmailFormat);
        }

        Ok(())
    }
}
