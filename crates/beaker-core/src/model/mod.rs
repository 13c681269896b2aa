//! Tipos de dominio compartidos: esquema de beaker y proyección de lineage.

mod lineage;
mod schema;

pub use lineage::Lineage;
pub use schema::{BeakerSchema, ErrorRecord, SchemaError};
