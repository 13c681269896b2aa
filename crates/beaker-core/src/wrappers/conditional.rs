//! Evalúa un predicado sobre el payload de entrada antes de invocar el
//! edge interno: si el predicado es falso, el registro se detiene
//! (`Drop`) o se reenvía sin transformar a un destino fijo (`Send`).

use async_trait::async_trait;
use serde_json::Value;

use crate::edge::{EdgeOutcome, EdgeRunner};
use crate::errors::BeakerError;
use crate::model::Lineage;
use crate::record::RecordId;

/// Qué hacer con un registro que no cumple el predicado.
pub enum IfFalse {
    Drop,
    Send { destination: String },
}

type Predicate = Box<dyn Fn(&Value) -> bool + Send + Sync>;

pub struct Conditional {
    inner: Box<dyn EdgeRunner>,
    predicate: Predicate,
    if_false: IfFalse,
}

impl Conditional {
    pub fn new(
        inner: Box<dyn EdgeRunner>,
        predicate: impl Fn(&Value) -> bool + Send + Sync + 'static,
        if_false: IfFalse,
    ) -> Self {
        Self {
            inner,
            predicate: Box::new(predicate),
            if_false,
        }
    }
}

#[async_trait]
impl EdgeRunner for Conditional {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn run(
        &self,
        id: RecordId,
        payload: Value,
        lineage: &Lineage,
    ) -> Result<Vec<EdgeOutcome>, BeakerError> {
        if (self.predicate)(&payload) {
            self.inner.run(id, payload, lineage).await
        } else {
            match &self.if_false {
                IfFalse::Drop => Ok(vec![EdgeOutcome::Stop]),
                IfFalse::Send { destination } => Ok(vec![EdgeOutcome::Write {
                    destination: destination.clone(),
                    id,
                    payload,
                }]),
            }
        }
    }
}
