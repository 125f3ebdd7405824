//! Pix key registry
//!
//! Registers the aliases (CPF, CNPJ, email, phone, random) that resolve to a
//! bank account in the Brazilian Pix instant payment system:
//! - Per-category format and check-digit validation
//! - Global uniqueness of key values
//! - Per-account key quota
//! - Soft delete and account relinking

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use crate::config::AppConfig;

use std::sync::Arc;

use anyhow::Context;
use api::state::AppState;
use crate::config::StorageBackend;
use domain::pix_key::{KeyValidatorRegistry, PixKeyRepository};
use infrastructure::pix_key::{
    InMemoryPixKeyRepository, PixKeyService, PostgresConfig, PostgresPixKeyRepository,
};
use tracing::info;

/// Create the application state with default configuration
pub async fn create_app_state() -> anyhow::Result<AppState> {
    create_app_state_with_config(&AppConfig::default()).await
}

/// Create the application state with custom configuration
pub async fn create_app_state_with_config(config: &AppConfig) -> anyhow::Result<AppState> {
    let service = create_pix_key_service(config).await?;
    Ok(AppState::new(Arc::new(service)))
}

/// Build the Pix key service for the configured storage backend
///
/// Fails when the validator registry does not cover every key type.
pub async fn create_pix_key_service(config: &AppConfig) -> anyhow::Result<PixKeyService> {
    let registry = KeyValidatorRegistry::standard()?;
    registry
        .ensure_complete()
        .context("Validator registry is incomplete")?;

    info!(
        key_types = ?registry.supported_types(),
        "Key validators registered"
    );

    let repository: Arc<dyn PixKeyRepository> = match config.storage.backend {
        StorageBackend::Memory => {
            info!("Using in-memory storage for pix keys");
            Arc::new(InMemoryPixKeyRepository::new())
        }
        StorageBackend::Postgres => {
            info!("Using PostgreSQL storage for pix keys");
            let repository = connect_postgres(config).await?;
            repository.ensure_schema().await?;
            Arc::new(repository)
        }
    };

    let limits = config.pix_keys.limits();
    info!(
        max_keys_per_account = limits.max_keys_per_account,
        "Pix key limits configured"
    );

    Ok(PixKeyService::new(repository, Arc::new(registry)).with_limits(limits))
}

/// Connect to the database named by `storage.database_url`
pub async fn connect_postgres(config: &AppConfig) -> anyhow::Result<PostgresPixKeyRepository> {
    let url = config
        .storage
        .database_url
        .as_deref()
        .context("storage.database_url is required for the postgres backend")?;

    info!("Connecting to PostgreSQL...");
    let repository = PostgresPixKeyRepository::connect(
        &PostgresConfig::new(url).with_max_connections(config.storage.max_connections),
    )
    .await?;
    info!("PostgreSQL connection established");

    Ok(repository)
}
