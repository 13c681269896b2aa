//! Contrato común de un edge: el trait tipado que implementan las
//! funciones de usuario (`EdgeFn`) y la interfaz type-erased que el motor
//! usa para ejecutar cualquier edge sin conocer sus tipos concretos
//! (`EdgeRunner`).

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::BeakerError;
use crate::model::Lineage;
use crate::record::RecordId;

/// Errores producidos por el cuerpo de un edge deben poder declarar su
/// propia "clase" para poder compararse contra un `error_map` sin recurrir
/// a downcasting.
pub trait EdgeError: std::error::Error + Send + Sync + 'static {
    fn class_name(&self) -> &'static str;
}

impl EdgeError for BeakerError {
    fn class_name(&self) -> &'static str {
        BeakerError::class_name(self)
    }
}

/// Resultado devuelto por el cuerpo de un `EdgeFn`.
///
/// `Many` modela tanto un generador (fan-out, cada elemento recibe una
/// identidad fresca) como un único resultado envuelto en una lista; el
/// llamador (`Transform::run`) decide qué identidad asignar según la
/// variante, no según el tamaño de la lista.
pub enum EdgeCallResult<Out> {
    /// Un único resultado que conserva la identidad del registro de
    /// entrada.
    Single(Out),
    /// Cero o más resultados, cada uno con identidad fresca (fan-out).
    Many(Vec<Out>),
    /// Ningún resultado (filtrado).
    Empty,
}

/// Función tipada que implementa el cuerpo de un edge.
#[async_trait]
pub trait EdgeFn: Send + Sync {
    type Input: crate::model::BeakerSchema;
    type Output: crate::model::BeakerSchema;
    type Error: EdgeError;

    /// `lineage` da acceso de sólo lectura al registro completo a través de
    /// todos los beakers; la mayoría de los edges lo ignoran.
    async fn call(
        &self,
        input: Self::Input,
        lineage: &Lineage,
    ) -> Result<EdgeCallResult<Self::Output>, Self::Error>;
}

/// Efecto concreto de ejecutar un edge sobre un registro: o bien una
/// escritura en un beaker destino, o bien una señal explícita de detener.
#[derive(Debug, Clone)]
pub enum EdgeOutcome {
    Write {
        destination: String,
        id: RecordId,
        payload: Value,
    },
    Stop,
}

/// Interfaz type-erased que el motor invoca para avanzar un registro a
/// través de un edge, sin conocer los tipos `Input`/`Output` concretos.
/// Implementada por `Transform` y `Splitter`.
#[async_trait]
pub trait EdgeRunner: Send + Sync {
    fn name(&self) -> &str;

    async fn run(
        &self,
        id: RecordId,
        payload: Value,
        lineage: &Lineage,
    ) -> Result<Vec<EdgeOutcome>, BeakerError>;
}
