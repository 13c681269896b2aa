//! Motor de ejecución de grafos tipados de beakers: registros identificados
//! por id, beakers (durables o efímeros) que los almacenan, edges que los
//! transforman de un beaker a otro, y dos estrategias de recorrido
//! (waterfall, river).
//!
//! Este crate es agnóstico al backend de almacenamiento concreto: sólo
//! conoce el trait `Beaker`. La implementación durable sobre SQLite vive en
//! el crate `beaker-store`.

pub mod beaker;
pub mod edge;
pub mod errors;
pub mod graph;
pub mod model;
pub mod pipeline;
pub mod record;
pub mod report;
pub mod runner;
pub mod seed;
pub mod wrappers;

pub use beaker::{Beaker, MemoryBeaker};
pub use edge::{EdgeCallResult, EdgeError, EdgeFn, EdgeOutcome, EdgeRunner, Splitter, Transform};
pub use errors::{BeakerError, GraphError, SeedErrorKind};
pub use graph::{BeakerNode, EdgeDecl, EdgeKind, Graph};
pub use model::{BeakerSchema, ErrorRecord, Lineage, SchemaError};
pub use pipeline::Pipeline;
pub use record::RecordId;
pub use report::{RunMode, RunReport};
pub use seed::{MemorySeedAudit, SeedAudit, SeedManager, SeedProducer, SeedRun};
