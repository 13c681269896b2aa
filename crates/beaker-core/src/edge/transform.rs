//! `Transform`: edge de un beaker a otro, ejecutando una función de
//! usuario tipada.
//!
//! - si la función falla y su error calza una entrada de `error_map`, el
//!   registro se reescribe como un `ErrorRecord` hacia el destino de esa
//!   entrada (conservando la identidad) y el edge no propaga el error;
//! - si la función devuelve `Empty` y `allow_filter` es verdadero, el edge
//!   detiene el registro sin error; si `allow_filter` es falso, es
//!   `NoEdgeResult`;
//! - `Single` conserva la identidad del registro de entrada;
//! - `Many` asigna una identidad fresca a cada elemento (fan-out).

use async_trait::async_trait;
use serde_json::Value;

use crate::edge::contract::{EdgeCallResult, EdgeError, EdgeFn, EdgeOutcome, EdgeRunner};
use crate::errors::BeakerError;
use crate::model::{BeakerSchema, ErrorRecord, Lineage};
use crate::record::RecordId;

/// Una entrada del mapa de errores: un conjunto de nombres de clase de
/// error y el beaker destino al que se enruta un error que calce alguno de
/// ellos. Evaluado en orden de declaración (primera coincidencia gana),
/// igual que el `error_map` original.
pub struct ErrorMapEntry {
    pub classes: Vec<&'static str>,
    pub destination: String,
}

pub struct Transform<F: EdgeFn> {
    name: String,
    func: F,
    to_beaker: String,
    error_map: Vec<ErrorMapEntry>,
    allow_filter: bool,
}

impl<F: EdgeFn> Transform<F> {
    pub fn new(name: impl Into<String>, to_beaker: impl Into<String>, func: F) -> Self {
        Self {
            name: name.into(),
            func,
            to_beaker: to_beaker.into(),
            error_map: Vec::new(),
            allow_filter: false,
        }
    }

    /// Permite que la función devuelva `Empty` sin que eso sea un error: el
    /// registro simplemente se detiene en este edge.
    pub fn allow_filter(mut self) -> Self {
        self.allow_filter = true;
        self
    }

    pub fn error_map_entry(mut self, classes: Vec<&'static str>, destination: impl Into<String>) -> Self {
        self.error_map.push(ErrorMapEntry {
            classes,
            destination: destination.into(),
        });
        self
    }

    fn route_error(&self, err: &F::Error) -> Option<&str> {
        let class = err.class_name();
        self.error_map
            .iter()
            .find(|entry| entry.classes.contains(&class))
            .map(|entry| entry.destination.as_str())
    }
}

#[async_trait]
impl<F: EdgeFn> EdgeRunner for Transform<F> {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(
        &self,
        id: RecordId,
        payload: Value,
        lineage: &Lineage,
    ) -> Result<Vec<EdgeOutcome>, BeakerError> {
        let input = F::Input::from_value(&payload).map_err(|e| BeakerError::SchemaValidation {
            beaker: self.name.clone(),
            message: e.to_string(),
        })?;

        match self.func.call(input, lineage).await {
            Ok(EdgeCallResult::Single(out)) => Ok(vec![EdgeOutcome::Write {
                destination: self.to_beaker.clone(),
                id,
                payload: out.to_value(),
            }]),
            Ok(EdgeCallResult::Many(outs)) => {
                if outs.is_empty() {
                    self.empty_outcome()
                } else {
                    Ok(outs
                        .into_iter()
                        .map(|out| EdgeOutcome::Write {
                            destination: self.to_beaker.clone(),
                            id: RecordId::new(),
                            payload: out.to_value(),
                        })
                        .collect())
                }
            }
            Ok(EdgeCallResult::Empty) => self.empty_outcome(),
            Err(err) => {
                if let Some(destination) = self.route_error(&err) {
                    let record = ErrorRecord {
                        item: payload,
                        exception_message: err.to_string(),
                        exception_class_name: err.class_name().to_string(),
                    };
                    Ok(vec![EdgeOutcome::Write {
                        destination: destination.to_string(),
                        id,
                        payload: record.to_value(),
                    }])
                } else {
                    Err(BeakerError::UncaughtEdgeError {
                        class: err.class_name().to_string(),
                        message: err.to_string(),
                    })
                }
            }
        }
    }
}

impl<F: EdgeFn> Transform<F> {
    fn empty_outcome(&self) -> Result<Vec<EdgeOutcome>, BeakerError> {
        if self.allow_filter {
            Ok(vec![EdgeOutcome::Stop])
        } else {
            Err(BeakerError::NoEdgeResult)
        }
    }
}
