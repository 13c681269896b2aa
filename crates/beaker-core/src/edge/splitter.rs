//! `Splitter`: clasifica un registro y delega en el `EdgeRunner` interno
//! registrado bajo la clave devuelta por el clasificador.

use async_trait::async_trait;
use indexmap::IndexMap;
use serde_json::Value;

use crate::edge::contract::{EdgeOutcome, EdgeRunner};
use crate::errors::BeakerError;
use crate::model::Lineage;
use crate::record::RecordId;

type Classifier = Box<dyn Fn(&Value) -> Result<String, BeakerError> + Send + Sync>;

pub struct Splitter {
    name: String,
    classify: Classifier,
    branches: IndexMap<String, Box<dyn EdgeRunner>>,
}

impl Splitter {
    pub fn new(
        name: impl Into<String>,
        classify: impl Fn(&Value) -> Result<String, BeakerError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            classify: Box::new(classify),
            branches: IndexMap::new(),
        }
    }

    pub fn branch(mut self, key: impl Into<String>, runner: Box<dyn EdgeRunner>) -> Self {
        self.branches.insert(key.into(), runner);
        self
    }
}

#[async_trait]
impl EdgeRunner for Splitter {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(
        &self,
        id: RecordId,
        payload: Value,
        lineage: &Lineage,
    ) -> Result<Vec<EdgeOutcome>, BeakerError> {
        let key = (self.classify)(&payload)?;
        let branch = self
            .branches
            .get(&key)
            .ok_or_else(|| BeakerError::BadSplitResult(key.clone()))?;
        branch.run(id, payload, lineage).await
    }
}
