//! Persistence layer for the storefront catalog engine.
//!
//! Repositories expose the engine operations as plain async calls over
//! `sqlx`/PostgreSQL. Every mutating operation exists in two forms: a
//! `*_tx` primitive that runs inside the caller's transaction, and a
//! pool-taking wrapper of the same name that owns begin/commit. There are
//! no optional transaction parameters.

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;

pub mod config;
pub mod error;
pub mod models;
pub mod repositories;

pub use config::DbConfig;
pub use error::DbError;

pub type DbPool = sqlx::PgPool;

/// Create a connection pool from a database URL, with default tuning.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config::DEFAULT_MAX_CONNECTIONS)
        .acquire_timeout(Duration::from_secs(config::DEFAULT_ACQUIRE_TIMEOUT_SECS))
        .connect(database_url)
        .await
}

/// Create a connection pool from a [`DbConfig`].
pub async fn create_pool_from_config(config: &DbConfig) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .connect(&config.database_url)
        .await
}

/// Verify the database is reachable.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply pending migrations from `db/migrations`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../db/migrations").run(pool).await?;
    tracing::info!("Database migrations applied");
    Ok(())
}
