//! Application state for shared services

use std::sync::Arc;

use crate::domain::pix_key::{PixKey, PixKeyId};
use crate::domain::DomainError;
use crate::infrastructure::pix_key::{NewPixKey, PixKeyService, UpdatePixKeyAccount};

/// Application state containing shared services using dynamic dispatch
#[derive(Clone)]
pub struct AppState {
    pub pix_key_service: Arc<dyn PixKeyServiceTrait>,
}

impl AppState {
    pub fn new(pix_key_service: Arc<dyn PixKeyServiceTrait>) -> Self {
        Self { pix_key_service }
    }
}

/// Trait for Pix key service operations
#[async_trait::async_trait]
pub trait PixKeyServiceTrait: Send + Sync {
    async fn create(&self, request: NewPixKey) -> Result<PixKeyId, DomainError>;
    async fn find_by_id(&self, id: &PixKeyId) -> Result<PixKey, DomainError>;
    async fn inactivate(&self, id: &PixKeyId) -> Result<PixKey, DomainError>;
    async fn update_account(
        &self,
        id: &PixKeyId,
        request: UpdatePixKeyAccount,
    ) -> Result<PixKey, DomainError>;
    async fn health_check(&self) -> Result<(), DomainError>;
}

#[async_trait::async_trait]
impl PixKeyServiceTrait for PixKeyService {
    async fn create(&self, request: NewPixKey) -> Result<PixKeyId, DomainError> {
        PixKeyService::create(self, request).await
    }

    async fn find_by_id(&self, id: &PixKeyId) -> Result<PixKey, DomainError> {
        PixKeyService::find_by_id(self, id).await
    }

    async fn inactivate(&self, id: &PixKeyId) -> Result<PixKey, DomainError> {
        PixKeyService::inactivate(self, id).await
    }

    async fn update_account(
        &self,
        id: &PixKeyId,
        request: UpdatePixKeyAccount,
    ) -> Result<PixKey, DomainError> {
        PixKeyService::update_account(self, id, request).await
    }

    async fn health_check(&self) -> Result<(), DomainError> {
        PixKeyService::health_check(self).await
    }
}
