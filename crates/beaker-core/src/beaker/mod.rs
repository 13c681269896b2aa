//! Abstracción de almacenamiento tipado por beaker.
//!
//! Una sola implementación in-memory vive aquí (`MemoryBeaker`, efímera);
//! la implementación durable (`SqliteBeaker`) vive en el crate
//! `beaker-store`, que depende de este trait.

mod memory;

pub use memory::MemoryBeaker;

use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeSet;

use crate::errors::BeakerError;
use crate::record::RecordId;

/// Almacén homogéneo de payloads JSON indexados por `RecordId`.
///
/// El motor nunca conoce el tipo concreto almacenado: valida contra un
/// `BeakerSchema` antes de escribir y decodifica contra él al leer (ver
/// `model::schema`). El trait en sí opera sobre `serde_json::Value` para
/// permanecer objeto-seguro y compartible entre beakers de distintos tipos
/// dentro del mismo grafo.
#[async_trait]
pub trait Beaker: Send + Sync {
    /// Nombre declarado del beaker dentro del grafo.
    fn name(&self) -> &str;

    /// `true` si este beaker sobrevive a un reinicio del proceso.
    fn is_durable(&self) -> bool;

    /// Inserta o reemplaza el payload de `id`. Idempotente: reinsertar el
    /// mismo `id` con el mismo payload no es un error (soporta reanudar
    /// ejecuciones parciales).
    async fn put(&self, id: RecordId, payload: Value) -> Result<(), BeakerError>;

    /// Inserta `id` sólo si no existe todavía. A diferencia de `put`, no es
    /// idempotente: reinsertar un id ya presente falla con `DuplicateId` en
    /// lugar de sobrescribir. La implementación por defecto hace un
    /// check-then-put no atómico; los backends concretos la especializan.
    async fn add(&self, id: RecordId, payload: Value) -> Result<(), BeakerError> {
        if self.get(id).await?.is_some() {
            return Err(BeakerError::DuplicateId(id.to_string()));
        }
        self.put(id, payload).await
    }

    /// Inserta varios pares `(id, payload)` nuevos como una sola unidad: si
    /// alguno ya existe, ninguno queda escrito. Usado por `SeedManager`
    /// para que una corrida de seed no deje altas parciales.
    async fn add_batch(&self, items: Vec<(RecordId, Value)>) -> Result<(), BeakerError> {
        for (id, payload) in items {
            self.add(id, payload).await?;
        }
        Ok(())
    }

    /// Payload almacenado bajo `id`, si existe.
    async fn get(&self, id: RecordId) -> Result<Option<Value>, BeakerError>;

    /// Todos los `(id, payload)` almacenados. Sin orden garantizado salvo el
    /// que imponga la implementación concreta.
    async fn items(&self) -> Result<Vec<(RecordId, Value)>, BeakerError>;

    /// Conjunto de identidades presentes. Usado para calcular qué registros
    /// ya cruzaron un edge (`ya_procesados = id_set(origen) ∩
    /// id_set(destino)`).
    async fn id_set(&self) -> Result<BTreeSet<RecordId>, BeakerError>;

    /// Número de registros almacenados.
    async fn len(&self) -> Result<usize, BeakerError>;

    async fn is_empty(&self) -> Result<bool, BeakerError> {
        Ok(self.len().await? == 0)
    }

    /// Vacía el beaker por completo. Usado por `seed --reset` y por la CLI
    /// `clear`.
    async fn reset(&self) -> Result<(), BeakerError>;
}
