//! Identidad de registro: `RecordId` (opaco, ancho fijo) y lineage opcional.
//!
//! Un `RecordId` se genera fresco cuando un registro no declara `parent`; el
//! parent se preserva a través de edges que conservan identidad.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Identidad opaca de un registro. Ancho fijo (UUID), comparable, hasheable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordId(Uuid);

impl RecordId {
    /// Genera una identidad nueva.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Construye desde un `Uuid` ya existente (p. ej. al leer de storage).
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for RecordId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Lineage opcional: si `Some`, el registro conserva la identidad de un
/// registro anterior (p. ej. a través de un Transform que preserva id). Si
/// `None`, la identidad fue generada fresca (p. ej. fan-out de un
/// generador).
pub type Parent = Option<RecordId>;
