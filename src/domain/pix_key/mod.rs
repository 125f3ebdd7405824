//! Pix key domain
//!
//! Domain types for Pix keys: the entity and its lifecycle, the per-category
//! format validators with their registry, and the storage contract.

mod entity;
mod repository;
pub mod validation;

pub use entity::{
    AccountType, InvalidAccountType, KeyStatus, KeyType, PixKey, PixKeyId, PixKeyParts,
};
pub use repository::PixKeyRepository;
pub use validation::{KeyFormatError, KeyValidator, KeyValidatorRegistry, RegistryError};

#[cfg(test)]
pub use repository::MockPixKeyRepository;
