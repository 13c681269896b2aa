//! Álgebra de edges: `Transform` (función tipada de un beaker a otro) y
//! `Splitter` (clasifica y delega en un `Transform` interno por rama).

mod contract;
mod splitter;
mod transform;

pub use contract::{EdgeCallResult, EdgeError, EdgeFn, EdgeOutcome, EdgeRunner};
pub use splitter::Splitter;
pub use transform::{ErrorMapEntry, Transform};
