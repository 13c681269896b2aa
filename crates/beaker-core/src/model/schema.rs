//! Esquema tipado de un beaker, manteniendo el motor agnóstico a los
//! payloads concretos.
//!
//! Un beaker declara un `BeakerSchema`: un tipo `Serialize +
//! DeserializeOwned` con un nombre estable (`SCHEMA_NAME`) y una validación
//! semántica opcional. El motor nunca inspecciona el payload más allá de
//! serializar/deserializar/validar.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// Error al decodificar o validar un payload contra un `BeakerSchema`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    Deserialize(String),
    Validation(String),
}

impl std::fmt::Display for SchemaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchemaError::Deserialize(m) => write!(f, "deserialize error: {m}"),
            SchemaError::Validation(m) => write!(f, "validation error: {m}"),
        }
    }
}

impl std::error::Error for SchemaError {}

/// Especificación de un tipo que puede poblar un beaker.
///
/// `SCHEMA_NAME` participa en la validación de compatibilidad entre el
/// tipo declarado de un beaker y el tipo de entrada/salida de un edge.
pub trait BeakerSchema: Sized + Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const SCHEMA_NAME: &'static str;

    /// Validación semántica ligera y sin efectos secundarios. Por defecto
    /// siempre válida.
    fn validate(&self) -> Result<(), SchemaError> {
        Ok(())
    }

    /// Serializa a JSON genérico (lo que el `Beaker` trait almacena).
    fn to_value(&self) -> Value {
        serde_json::to_value(self).expect("serialize beaker payload")
    }

    /// Decodifica y valida desde JSON genérico.
    fn from_value(v: &Value) -> Result<Self, SchemaError> {
        let decoded: Self =
            serde_json::from_value(v.clone()).map_err(|e| SchemaError::Deserialize(e.to_string()))?;
        decoded.validate().map_err(|e| match e {
            SchemaError::Validation(m) => SchemaError::Validation(m),
            other => other,
        })?;
        Ok(decoded)
    }
}

/// Registro de error de ancho fijo escrito en los beakers de error.
/// Comparte identidad con el registro fuente que falló.
#[derive(Debug, Clone, Serialize, serde::Deserialize)]
pub struct ErrorRecord {
    pub item: Value,
    pub exception_message: String,
    pub exception_class_name: String,
}

impl BeakerSchema for ErrorRecord {
    const SCHEMA_NAME: &'static str = "__error__";
}
