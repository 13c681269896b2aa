//! Construcción del pool de conexiones SQLite, con `PRAGMA
//! journal_mode=WAL` para permitir lectores concurrentes mientras un
//! writer está activo.

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;

use crate::config::StoreConfig;
use crate::error::map_sqlx_error;
use beaker_core::BeakerError;

pub async fn build_pool(config: &StoreConfig) -> Result<SqlitePool, BeakerError> {
    let options = SqliteConnectOptions::from_str(&config.connection_url())
        .map_err(|e| BeakerError::Internal(format!("invalid database url: {e}")))?
        .create_if_missing(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(options)
        .await
        .map_err(|e| map_sqlx_error("open sqlite pool", e))?;

    log::info!(
        "beaker-store: connected to '{}' (max_connections={})",
        config.database_path,
        config.max_connections
    );
    Ok(pool)
}

/// Atajo usado por la CLI y los tests de integración: lee `StoreConfig`
/// desde el entorno y abre el pool.
pub async fn build_pool_from_env() -> Result<SqlitePool, BeakerError> {
    build_pool(&StoreConfig::from_env()).await
}
