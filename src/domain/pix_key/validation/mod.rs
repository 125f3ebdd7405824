//! Key format validators
//!
//! One validator per [`KeyType`]. Validators are pure: they inspect the raw
//! value and either accept it or return a [`KeyFormatError`] describing the
//! category-specific failure. They never normalize or store the value.

mod cnpj;
mod cpf;
mod email;
mod phone;
mod random;
mod registry;

use std::fmt::Debug;

use thiserror::Error;

use super::entity::KeyType;

pub use cnpj::CnpjValidator;
pub use cpf::CpfValidator;
pub use email::{EmailValidator, MAX_EMAIL_LENGTH};
pub use phone::PhoneValidator;
pub use random::{RandomKeyValidator, RANDOM_KEY_LENGTH};
pub use registry::{KeyValidatorRegistry, RegistryError};

/// Errors produced when a key value fails its category's rules
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KeyFormatError {
    #[error("invalid CPF")]
    Cpf,

    #[error("invalid CNPJ: expected 14 valid digits (with or without mask)")]
    Cnpj,

    #[error("email cannot be blank")]
    EmailBlank,

    #[error("email exceeds {0} characters")]
    EmailTooLong(usize),

    #[error("invalid email format")]
    EmailFormat,

    #[error("phone cannot be blank")]
    PhoneBlank,

    #[error("phone must start with +55")]
    PhoneMissingPrefix,

    #[error("invalid phone: expected +55 followed by 10 or 11 digits")]
    PhoneDigitCount,

    #[error("invalid random key: expected {0} alphanumeric characters")]
    Random(usize),
}

/// Format validation strategy for one key category
pub trait KeyValidator: Send + Sync + Debug {
    /// The category this validator is responsible for
    fn key_type(&self) -> KeyType;

    /// Accept or reject a raw key value
    fn validate(&self, raw: &str) -> Result<(), KeyFormatError>;

    /// Name used in registry diagnostics
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// The built-in validators, one per key category
pub fn builtin_validators() -> Vec<std::sync::Arc<dyn KeyValidator>> {
    vec![
        std::sync::Arc::new(CpfValidator),
        std::sync::Arc::new(CnpjValidator),
        std::sync::Arc::new(EmailValidator),
        std::sync::Arc::new(PhoneValidator),
        std::sync::Arc::new(RandomKeyValidator),
    ]
}

/// Modulo-11 check digit over `digits`, pairing each digit with a weight.
///
/// A remainder below 2 yields 0, anything else `11 - remainder`.
pub(crate) fn mod11_check_digit(digits: &[u32], weights: &[u32]) -> u32 {
    let sum: u32 = digits.iter().zip(weights).map(|(d, w)| d * w).sum();
    let remainder = sum % 11;

    if remainder < 2 { 0 } else { 11 - remainder }
}

/// Extract ASCII digits, discarding everything else
pub(crate) fn ascii_digits(raw: &str) -> Vec<u32> {
    raw.chars().filter_map(|c| c.to_digit(10)).collect()
}

pub(crate) fn all_equal(digits: &[u32]) -> bool {
    digits.windows(2).all(|pair| pair[0] == pair[1])
}
