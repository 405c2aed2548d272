pub mod postgres;
pub mod migrations;
pub mod blob;
pub mod repositories;

pub use postgres::{PostgresPool, create_postgres_pool, health_check as postgres_health_check};
pub use blob::{BlobDeleter, BlobStore};
pub use repositories::*;

use anyhow::Result;

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub postgres_url: String,
    pub max_connections: u32,
}

pub async fn initialize_database(config: &DatabaseConfig) -> Result<PostgresPool> {
    let postgres_pool = create_postgres_pool(&config.postgres_url, config.max_connections).await?;

    // Run migrations
    migrations::run_postgres_migrations(&postgres_pool).await?;

    Ok(postgres_pool)
}
