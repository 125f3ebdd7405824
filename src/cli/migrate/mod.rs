//! Migrate command - creates the PostgreSQL schema

use tracing::info;

use crate::config::AppConfig;
use crate::infrastructure::logging;

/// Create the `pix_keys` table and indexes, then exit
pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    logging::init_logging(&config.logging);

    let repository = crate::connect_postgres(&config).await?;
    repository.ensure_schema().await?;

    info!("Migration complete");

    Ok(())
}
