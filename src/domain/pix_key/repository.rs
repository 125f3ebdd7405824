//! Pix key repository trait

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use super::entity::{PixKey, PixKeyId};
use crate::domain::DomainError;

/// Storage contract for Pix keys
///
/// Implementations must enforce uniqueness of `key_value` themselves: `save`
/// returns [`DomainError::Conflict`] when another key already holds the
/// value. A stored inactive key is final, so replacing it also returns
/// `Conflict`. Transport failures are reported as [`DomainError::Storage`].
#[cfg_attr(test, automock)]
#[async_trait]
pub trait PixKeyRepository: Send + Sync {
    /// Find a key by id
    async fn find_by_id(&self, id: &PixKeyId) -> Result<Option<PixKey>, DomainError>;

    /// Find the key holding a value, whatever its status
    async fn find_by_key_value(&self, key_value: &str) -> Result<Option<PixKey>, DomainError>;

    /// Count keys linked to an agency/account pair, whatever their status
    async fn count_by_agency_and_account(
        &self,
        agency: &str,
        account: &str,
    ) -> Result<usize, DomainError>;

    /// Insert or fully replace a key, keyed by id
    async fn save(&self, key: PixKey) -> Result<PixKey, DomainError>;

    /// Check that the backing store is reachable
    async fn health_check(&self) -> Result<(), DomainError> {
        Ok(())
    }
}
