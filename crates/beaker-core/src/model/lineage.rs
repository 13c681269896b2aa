//! Proyección read-only por identidad a través de todos los beakers.
//!
//! Un `Lineage` se ensambla bajo demanda en cada acceso (nunca es un objeto
//! mutable compartido): para un `RecordId` dado, contiene el payload
//! (cuando existe) de cada beaker que lo contiene.

use serde_json::Value;
use std::collections::BTreeMap;

use crate::record::RecordId;

/// Vista read-only de un registro a través de todos los beakers del grafo,
/// indexada por nombre de beaker. Se ensambla como valor inmutable en cada
/// acceso, nunca se muta en sitio.
#[derive(Debug, Clone)]
pub struct Lineage {
    id: RecordId,
    by_beaker: BTreeMap<String, Value>,
}

impl Lineage {
    pub fn new(id: RecordId) -> Self {
        Self {
            id,
            by_beaker: BTreeMap::new(),
        }
    }

    pub fn id(&self) -> RecordId {
        self.id
    }

    /// Inserta (o reemplaza) el payload visto en `beaker_name`. Usado por el
    /// motor al ensamblar la vista; nunca expuesto mutable a funciones de
    /// edge.
    pub fn insert(&mut self, beaker_name: impl Into<String>, payload: Value) {
        self.by_beaker.insert(beaker_name.into(), payload);
    }

    /// Payload visto en `beaker_name`, si el registro existe allí.
    pub fn get(&self, beaker_name: &str) -> Option<&Value> {
        self.by_beaker.get(beaker_name)
    }

    pub fn contains(&self, beaker_name: &str) -> bool {
        self.by_beaker.contains_key(beaker_name)
    }

    pub fn beaker_names(&self) -> impl Iterator<Item = &str> {
        self.by_beaker.keys().map(String::as_str)
    }
}
