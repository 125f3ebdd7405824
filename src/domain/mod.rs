//! Domain layer - Core business logic and entities

pub mod error;
pub mod pix_key;

pub use error::DomainError;
pub use pix_key::{
    AccountType, KeyFormatError, KeyStatus, KeyType, KeyValidator, KeyValidatorRegistry, PixKey,
    PixKeyId, PixKeyRepository,
};
