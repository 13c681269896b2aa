//! `Pipeline`: ata el grafo declarado a sus beakers y edges concretos, y
//! expone las operaciones de alto nivel que la CLI y los runners invocan.

use std::collections::BTreeSet;
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;

use crate::beaker::Beaker;
use crate::edge::EdgeRunner;
use crate::errors::{BeakerError, GraphError};
use crate::graph::{EdgeDecl, Graph};
use crate::model::Lineage;
use crate::record::RecordId;
use crate::seed::SeedManager;

pub struct Pipeline {
    graph: Graph,
    beakers: IndexMap<String, Arc<dyn Beaker>>,
    edges: IndexMap<String, Arc<dyn EdgeRunner>>,
    pub seeds: SeedManager,
}

impl Pipeline {
    pub fn new(graph: Graph, seeds: SeedManager) -> Self {
        Self {
            graph,
            beakers: IndexMap::new(),
            edges: IndexMap::new(),
            seeds,
        }
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn register_beaker(&mut self, beaker: Arc<dyn Beaker>) {
        self.beakers.insert(beaker.name().to_string(), beaker);
    }

    pub fn register_edge(&mut self, name: impl Into<String>, runner: Arc<dyn EdgeRunner>) {
        self.edges.insert(name.into(), runner);
    }

    pub fn beaker(&self, name: &str) -> Result<&Arc<dyn Beaker>, BeakerError> {
        self.beakers
            .get(name)
            .ok_or_else(|| GraphError::UnknownBeaker(name.to_string()).into())
    }

    pub fn edge_runner(&self, edge: &EdgeDecl) -> Result<&Arc<dyn EdgeRunner>, BeakerError> {
        self.edges
            .get(&edge.name)
            .ok_or_else(|| BeakerError::Internal(format!("edge '{}' has no runner registered", edge.name)))
    }

    /// Conjunto unión de ids presentes en cualquiera de los destinos
    /// posibles de un edge (normales o de error). Usado para calcular qué
    /// registros del origen ya fueron procesados por este edge.
    pub async fn destinations_id_set(&self, edge: &EdgeDecl) -> Result<BTreeSet<RecordId>, BeakerError> {
        let mut set = BTreeSet::new();
        for name in edge.to_beakers.iter().chain(edge.error_destinations.iter()) {
            set.extend(self.beaker(name)?.id_set().await?);
        }
        Ok(set)
    }

    /// Ensambla la vista de lineage de `id` a través de todos los beakers
    /// que lo contienen.
    pub async fn assemble_lineage(&self, id: RecordId) -> Result<Lineage, BeakerError> {
        let mut lineage = Lineage::new(id);
        for (name, beaker) in &self.beakers {
            if let Some(payload) = beaker.get(id).await? {
                lineage.insert(name.clone(), payload);
            }
        }
        Ok(lineage)
    }

    pub async fn get_item(&self, beaker_name: &str, id: RecordId) -> Result<Option<Value>, BeakerError> {
        self.beaker(beaker_name)?.get(id).await
    }

    pub async fn clear_beaker(&self, beaker_name: &str) -> Result<(), BeakerError> {
        self.beaker(beaker_name)?.reset().await
    }
}
