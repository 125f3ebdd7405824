//! PostgreSQL Pix key repository

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;
use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::pix_key::{PixKey, PixKeyId, PixKeyParts, PixKeyRepository};
use crate::domain::DomainError;

const SELECT_COLUMNS: &str = "id, key_type, key_value, account_type, agency, account, \
     holder_name, holder_surname, status, created_at, inactivated_at";

/// PostgreSQL connection settings
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    /// Database connection URL
    pub url: String,
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Connection timeout in seconds
    pub connect_timeout_secs: u64,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            url: "postgres://localhost/pix_keys".to_string(),
            max_connections: 10,
            connect_timeout_secs: 30,
        }
    }
}

impl PostgresConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn with_max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }
}

/// Pix key repository backed by the `pix_keys` table
///
/// Uniqueness of `key_value` is enforced by a unique index; a violation on
/// save is reported as `DomainError::Conflict`.
#[derive(Debug, Clone)]
pub struct PostgresPixKeyRepository {
    pool: PgPool,
}

impl PostgresPixKeyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a connection pool and wrap it in a repository
    pub async fn connect(config: &PostgresConfig) -> Result<Self, DomainError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
            .connect(&config.url)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to connect to PostgreSQL: {}", e)))?;

        Ok(Self::new(pool))
    }

    /// Create the table and its indexes if they do not exist
    pub async fn ensure_schema(&self) -> Result<(), DomainError> {
        let statements = [
            r#"
            CREATE TABLE IF NOT EXISTS pix_keys (
                id UUID PRIMARY KEY,
                key_type VARCHAR(10) NOT NULL,
                key_value VARCHAR(77) NOT NULL,
                account_type VARCHAR(10) NOT NULL,
                agency VARCHAR(4) NOT NULL,
                account VARCHAR(8) NOT NULL,
                holder_name VARCHAR(30) NOT NULL,
                holder_surname VARCHAR(45) NOT NULL DEFAULT '',
                status VARCHAR(10) NOT NULL,
                created_at TIMESTAMPTZ NOT NULL,
                inactivated_at TIMESTAMPTZ
            )
            "#,
            "CREATE UNIQUE INDEX IF NOT EXISTS pix_keys_key_value_idx ON pix_keys (key_value)",
            "CREATE INDEX IF NOT EXISTS pix_keys_agency_account_idx ON pix_keys (agency, account)",
        ];

        for statement in statements {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| DomainError::storage(format!("Failed to create schema: {}", e)))?;
        }

        info!("Pix key schema ensured");
        Ok(())
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .map(|db| db.is_unique_violation())
        .unwrap_or(false)
}

fn column<'r, T>(row: &'r PgRow, name: &str) -> Result<T, DomainError>
where
    T: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>,
{
    row.try_get(name)
        .map_err(|e| DomainError::storage(format!("Failed to read column '{}': {}", name, e)))
}

fn row_to_pix_key(row: &PgRow) -> Result<PixKey, DomainError> {
    let id: Uuid = column(row, "id")?;
    let key_type: String = column(row, "key_type")?;
    let account_type: String = column(row, "account_type")?;
    let status: String = column(row, "status")?;

    Ok(PixKey::from_parts(PixKeyParts {
        id: PixKeyId::from_uuid(id),
        key_type: key_type
            .parse()
            .map_err(|e: DomainError| DomainError::storage(e.to_string()))?,
        key_value: column(row, "key_value")?,
        account_type: account_type
            .parse()
            .map_err(|e: crate::domain::pix_key::InvalidAccountType| {
                DomainError::storage(e.to_string())
            })?,
        agency: column(row, "agency")?,
        account: column(row, "account")?,
        holder_name: column(row, "holder_name")?,
        holder_surname: column(row, "holder_surname")?,
        status: status
            .parse()
            .map_err(|e: DomainError| DomainError::storage(e.to_string()))?,
        created_at: column::<DateTime<Utc>>(row, "created_at")?,
        inactivated_at: column::<Option<DateTime<Utc>>>(row, "inactivated_at")?,
    }))
}

#[async_trait]
impl PixKeyRepository for PostgresPixKeyRepository {
    async fn find_by_id(&self, id: &PixKeyId) -> Result<Option<PixKey>, DomainError> {
        let query = format!("SELECT {} FROM pix_keys WHERE id = $1", SELECT_COLUMNS);

        let row = sqlx::query(&query)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to get pix key: {}", e)))?;

        row.as_ref().map(row_to_pix_key).transpose()
    }

    async fn find_by_key_value(&self, key_value: &str) -> Result<Option<PixKey>, DomainError> {
        let query = format!("SELECT {} FROM pix_keys WHERE key_value = $1", SELECT_COLUMNS);

        let row = sqlx::query(&query)
            .bind(key_value)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to get pix key: {}", e)))?;

        row.as_ref().map(row_to_pix_key).transpose()
    }

    async fn count_by_agency_and_account(
        &self,
        agency: &str,
        account: &str,
    ) -> Result<usize, DomainError> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS count FROM pix_keys WHERE agency = $1 AND account = $2",
        )
        .bind(agency)
        .bind(account)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to count pix keys: {}", e)))?;

        let count: i64 = column(&row, "count")?;
        debug!(agency, account, count, "Counted pix keys for account");

        Ok(count as usize)
    }

    async fn save(&self, key: PixKey) -> Result<PixKey, DomainError> {
        let result = sqlx::query(
            r#"
            INSERT INTO pix_keys (
                id, key_type, key_value, account_type, agency, account,
                holder_name, holder_surname, status, created_at, inactivated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (id) DO UPDATE SET
                key_type = EXCLUDED.key_type,
                key_value = EXCLUDED.key_value,
                account_type = EXCLUDED.account_type,
                agency = EXCLUDED.agency,
                account = EXCLUDED.account,
                holder_name = EXCLUDED.holder_name,
                holder_surname = EXCLUDED.holder_surname,
                status = EXCLUDED.status,
                created_at = EXCLUDED.created_at,
                inactivated_at = EXCLUDED.inactivated_at
            WHERE pix_keys.status = 'ACTIVE'
            "#,
        )
        .bind(key.id().as_uuid())
        .bind(key.key_type().as_str())
        .bind(key.key_value())
        .bind(key.account_type().as_str())
        .bind(key.agency())
        .bind(key.account())
        .bind(key.holder_name())
        .bind(key.holder_surname())
        .bind(key.status().as_str())
        .bind(key.created_at())
        .bind(key.inactivated_at())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                DomainError::conflict(format!(
                    "key value '{}' already exists",
                    key.key_value()
                ))
            } else {
                DomainError::storage(format!("Failed to save pix key: {}", e))
            }
        })?;

        // The upsert skips rows that are already inactive
        if result.rows_affected() == 0 {
            return Err(DomainError::conflict(format!(
                "pix key {} is already inactive",
                key.id()
            )));
        }

        Ok(key)
    }

    async fn health_check(&self) -> Result<(), DomainError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Database health check failed: {}", e)))?;

        Ok(())
    }
}
