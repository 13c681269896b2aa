//! Configuración del almacén durable, leída de variables de entorno (y de
//! un `.env` si existe).

use once_cell::sync::Lazy;
use std::env;

static ENV_LOADED: Lazy<()> = Lazy::new(|| {
    let _ = dotenvy::dotenv();
});

/// Ruta del fichero SQLite que respalda los beakers durables, y tamaño del
/// pool de conexiones.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub database_path: String,
    pub max_connections: u32,
}

impl StoreConfig {
    /// Lee `BEAKERFLOW_DB_PATH` (por defecto `beakerflow.db`) y
    /// `BEAKERFLOW_DB_MAX_CONNECTIONS` (por defecto 5).
    pub fn from_env() -> Self {
        Lazy::force(&ENV_LOADED);

        let database_path =
            env::var("BEAKERFLOW_DB_PATH").unwrap_or_else(|_| "beakerflow.db".to_string());
        let max_connections = env::var("BEAKERFLOW_DB_MAX_CONNECTIONS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(5);

        Self {
            database_path,
            max_connections,
        }
    }

    pub fn connection_url(&self) -> String {
        format!("sqlite://{}?mode=rwc", self.database_path)
    }
}
