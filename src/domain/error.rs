use thiserror::Error;

use super::pix_key::KeyFormatError;

/// Core domain errors
#[derive(Debug, Error)]
pub enum DomainError {
    /// The key value failed its category's format or checksum rule
    #[error("Invalid key: {0}")]
    InvalidKey(#[from] KeyFormatError),

    #[error("Business rule violation: {message}")]
    BusinessRule { message: String },

    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },
}

impl DomainError {
    pub fn business_rule(message: impl Into<String>) -> Self {
        Self::BusinessRule {
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// True for caller-correctable rejections: bad key format or a violated
    /// business rule.
    pub fn is_rule_violation(&self) -> bool {
        matches!(self, Self::InvalidKey(_) | Self::BusinessRule { .. })
    }
}
