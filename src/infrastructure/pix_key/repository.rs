//! In-memory Pix key repository implementation

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::pix_key::{PixKey, PixKeyId, PixKeyRepository};
use crate::domain::DomainError;

#[derive(Debug, Default)]
struct Records {
    keys: HashMap<PixKeyId, PixKey>,
    /// key_value -> id, the unique index
    value_index: HashMap<String, PixKeyId>,
}

/// In-memory implementation of PixKeyRepository
///
/// The uniqueness check and the insert happen under the same write lock, so
/// two concurrent saves of the same value cannot both succeed.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPixKeyRepository {
    records: Arc<RwLock<Records>>,
}

impl InMemoryPixKeyRepository {
    /// Create a new in-memory repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys, any status
    pub async fn len(&self) -> usize {
        self.records.read().await.keys.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl PixKeyRepository for InMemoryPixKeyRepository {
    async fn find_by_id(&self, id: &PixKeyId) -> Result<Option<PixKey>, DomainError> {
        let records = self.records.read().await;
        Ok(records.keys.get(id).cloned())
    }

    async fn find_by_key_value(&self, key_value: &str) -> Result<Option<PixKey>, DomainError> {
        let records = self.records.read().await;

        Ok(records
            .value_index
            .get(key_value)
            .and_then(|id| records.keys.get(id))
            .cloned())
    }

    async fn count_by_agency_and_account(
        &self,
        agency: &str,
        account: &str,
    ) -> Result<usize, DomainError> {
        let records = self.records.read().await;

        Ok(records
            .keys
            .values()
            .filter(|k| k.is_linked_to(agency, account))
            .count())
    }

    async fn save(&self, key: PixKey) -> Result<PixKey, DomainError> {
        let mut records = self.records.write().await;
        let id = *key.id();

        if records.keys.get(&id).is_some_and(PixKey::is_inactive) {
            return Err(DomainError::conflict(format!("pix key {} is already inactive", id)));
        }

        if let Some(owner) = records.value_index.get(key.key_value()) {
            if *owner != id {
                return Err(DomainError::conflict(format!(
                    "key value '{}' already exists",
                    key.key_value()
                )));
            }
        }

        // A replaced record may carry a different value; drop its old index entry
        let previous_value = records
            .keys
            .get(&id)
            .map(|previous| previous.key_value().to_string());

        if let Some(previous_value) = previous_value {
            records.value_index.remove(&previous_value);
        }

        records.value_index.insert(key.key_value().to_string(), id);
        records.keys.insert(id, key.clone());

        Ok(key)
    }
}
