//! Pix key infrastructure: repositories and the registration service

mod postgres_repository;
mod repository;
mod service;

pub use postgres_repository::{PostgresConfig, PostgresPixKeyRepository};
pub use repository::InMemoryPixKeyRepository;
pub use service::{
    DEFAULT_MAX_KEYS_PER_ACCOUNT, NewPixKey, PixKeyLimits, PixKeyService, UpdatePixKeyAccount,
};
