//! Validator registry
//!
//! Immutable key type -> validator table, built once at startup.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use super::{KeyValidator, builtin_validators};
use crate::domain::pix_key::KeyType;
use crate::domain::DomainError;

/// Errors raised while building the registry
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("duplicate validator for {key_type}: {existing} and {duplicate}")]
    Duplicate {
        key_type: KeyType,
        existing: String,
        duplicate: String,
    },
}

impl From<RegistryError> for DomainError {
    fn from(err: RegistryError) -> Self {
        DomainError::configuration(err.to_string())
    }
}

/// Lookup table from key type to its validator
#[derive(Debug, Clone)]
pub struct KeyValidatorRegistry {
    validators: HashMap<KeyType, Arc<dyn KeyValidator>>,
}

impl KeyValidatorRegistry {
    /// Build a registry, rejecting two validators for the same key type
    pub fn new(
        validators: impl IntoIterator<Item = Arc<dyn KeyValidator>>,
    ) -> Result<Self, RegistryError> {
        let mut by_type: HashMap<KeyType, Arc<dyn KeyValidator>> = HashMap::new();

        for validator in validators {
            let key_type = validator.key_type();

            if let Some(existing) = by_type.get(&key_type) {
                return Err(RegistryError::Duplicate {
                    key_type,
                    existing: existing.name().to_string(),
                    duplicate: validator.name().to_string(),
                });
            }

            debug!(key_type = %key_type, validator = validator.name(), "Registering key validator");
            by_type.insert(key_type, validator);
        }

        Ok(Self {
            validators: by_type,
        })
    }

    /// Registry with the built-in validator for every key type
    pub fn standard() -> Result<Self, RegistryError> {
        Self::new(builtin_validators())
    }

    /// Get the validator for a key type
    ///
    /// A missing validator is a wiring defect, reported as a configuration
    /// error rather than a user error.
    pub fn get(&self, key_type: KeyType) -> Result<&dyn KeyValidator, DomainError> {
        self.validators
            .get(&key_type)
            .map(|v| v.as_ref())
            .ok_or_else(|| {
                DomainError::configuration(format!(
                    "no validator registered for key type: {}",
                    key_type
                ))
            })
    }

    /// Validate a raw value with the validator registered for `key_type`
    pub fn validate(&self, key_type: KeyType, raw: &str) -> Result<(), DomainError> {
        self.get(key_type)?.validate(raw)?;
        Ok(())
    }

    /// Registered key types, in declaration order
    pub fn supported_types(&self) -> Vec<KeyType> {
        KeyType::ALL
            .into_iter()
            .filter(|t| self.validators.contains_key(t))
            .collect()
    }

    /// Fail unless every key type has a validator
    pub fn ensure_complete(&self) -> Result<(), DomainError> {
        let missing: Vec<&str> = KeyType::ALL
            .iter()
            .filter(|t| !self.validators.contains_key(t))
            .map(|t| t.as_str())
            .collect();

        if !missing.is_empty() {
            return Err(DomainError::configuration(format!(
                "no validator registered for key types: {}",
                missing.join(", ")
            )));
        }

        Ok(())
    }
}
