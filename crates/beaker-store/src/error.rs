//! Mapea errores de `sqlx` a la taxonomía cerrada de `beaker_core::BeakerError`.

use beaker_core::BeakerError;

/// Clasifica un error de sqlx para decidir si conviene reintentar la
/// operación.
pub fn is_retryable(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::PoolTimedOut | sqlx::Error::Io(_) | sqlx::Error::PoolClosed
    )
}

pub fn map_sqlx_error(context: &str, err: sqlx::Error) -> BeakerError {
    log::error!("beaker-store: {context}: {err}");
    BeakerError::Internal(format!("{context}: {err}"))
}

/// Como `map_sqlx_error`, pero reconoce una violación de unicidad (p. ej.
/// un `INSERT` sin `ON CONFLICT` chocando contra la `id` existente) y la
/// traduce a `DuplicateId` en lugar de `Internal`.
pub fn map_insert_error(id_text: &str, context: &str, err: sqlx::Error) -> BeakerError {
    if let sqlx::Error::Database(ref db_err) = err {
        if db_err.is_unique_violation() {
            return BeakerError::DuplicateId(id_text.to_string());
        }
    }
    map_sqlx_error(context, err)
}
