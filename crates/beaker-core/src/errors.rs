//! Errores del core: taxonomía cerrada, serializable y comparable.
//!
//! Todas las variantes son deterministas y serializables: no envuelven
//! `Box<dyn Error>` porque `BeakerError` debe poder viajar a través de un
//! límite `Clone + Serialize` (p. ej. dentro de un `ErrorRecord` o un log
//! estructurado) sin perder información reproducible.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Violaciones detectadas en tiempo de construcción del grafo.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GraphError {
    #[error("beaker '{0}' is not declared in this graph")]
    UnknownBeaker(String),
    #[error("edge from '{from}' to '{to}' would create a cycle")]
    CycleDetected { from: String, to: String },
    #[error("error destination '{0}' must be a durable beaker with the Error schema")]
    InvalidErrorDestination(String),
    #[error("destination '{0}' does not exist and its schema cannot be inferred unambiguously")]
    AmbiguousAutoCreate(String),
    #[error("beaker '{0}' is already declared")]
    DuplicateBeaker(String),
    #[error("edge '{edge}' expects schema '{expected}' at beaker '{beaker}' but it declares '{actual}'")]
    TypeMismatch {
        edge: String,
        beaker: String,
        expected: String,
        actual: String,
    },
}

/// Fallos al invocar `SeedManager::run_seed`.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeedErrorKind {
    #[error("seed '{0}' is not registered")]
    UnknownSeed(String),
    #[error("seed '{name}' already ran at {ran_at}")]
    AlreadyRun { name: String, ran_at: String },
    #[error("seed '{name}' producer failed: {message}")]
    ProducerFailed { name: String, message: String },
}

/// Error unificado del motor. Toda operación pública del crate retorna este
/// tipo (o un subconjunto de sus variantes) vía `Result`.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BeakerError {
    #[error("graph error: {0}")]
    Graph(#[from] GraphError),

    #[error("seed error: {0}")]
    Seed(#[from] SeedErrorKind),

    #[error("item '{0}' not found")]
    ItemNotFound(String),

    #[error("duplicate id '{0}'")]
    DuplicateId(String),

    #[error("edge produced no result and filtering is not allowed")]
    NoEdgeResult,

    #[error("splitter returned key '{0}' which is absent from its map")]
    BadSplitResult(String),

    #[error("uncaught edge error ({class}): {message}")]
    UncaughtEdgeError { class: String, message: String },

    #[error("schema validation failed for beaker '{beaker}': {message}")]
    SchemaValidation { beaker: String, message: String },

    #[error("internal: {0}")]
    Internal(String),
}

impl BeakerError {
    /// Nombre de variante estable, útil para logging estructurado y para
    /// clasificar errores en el `error_map` de un edge sin hacer `matches!`
    /// repetido en cada call site.
    pub fn class_name(&self) -> &'static str {
        match self {
            BeakerError::Graph(_) => "GraphError",
            BeakerError::Seed(_) => "SeedError",
            BeakerError::ItemNotFound(_) => "ItemNotFound",
            BeakerError::DuplicateId(_) => "DuplicateId",
            BeakerError::NoEdgeResult => "NoEdgeResult",
            BeakerError::BadSplitResult(_) => "BadSplitResult",
            BeakerError::UncaughtEdgeError { .. } => "UncaughtEdgeError",
            BeakerError::SchemaValidation { .. } => "SchemaValidation",
            BeakerError::Internal(_) => "Internal",
        }
    }
}
