//! Almacén durable de beakers y bitácora de seeds sobre un único fichero
//! SQLite, respetando el trait `beaker_core::Beaker` para poder mezclarse
//! libremente con beakers efímeros dentro del mismo grafo.

mod config;
mod error;
mod pool;
mod seed_audit;
mod sqlite_beaker;

pub use config::StoreConfig;
pub use error::{is_retryable, map_sqlx_error};
pub use pool::{build_pool, build_pool_from_env};
pub use seed_audit::SqliteSeedAudit;
pub use sqlite_beaker::SqliteBeaker;
