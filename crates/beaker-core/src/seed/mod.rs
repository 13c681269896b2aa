//! Manejador de seeds: registra productores nombrados que alimentan un
//! beaker y garantiza que cada uno corre, como mucho, una vez por nombre
//! salvo que se pida explícitamente un reset.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::beaker::Beaker;
use crate::errors::{BeakerError, SeedErrorKind};
use crate::record::RecordId;

/// Registro inmutable de una ejecución de seed pasada, escrito una vez y
/// nunca modificado.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedRun {
    pub run_id: RecordId,
    pub seed_name: String,
    pub beaker_name: String,
    pub num_items: usize,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
}

/// Produce los items iniciales de un seed. Implementado por el código de
/// usuario que registra el seed (p. ej. leer una lista fija, golpear una
/// API semilla, etc.).
#[async_trait]
pub trait SeedProducer: Send + Sync {
    async fn produce(&self) -> Result<Vec<Value>, BeakerError>;
}

/// Bitácora de ejecuciones de seeds, consultable por nombre o en bloque
/// (para `list_seeds`/la subcomanda `seeds` de la CLI). Una implementación
/// in-memory vive aquí; la durable vive en `beaker-store`.
#[async_trait]
pub trait SeedAudit: Send + Sync {
    async fn record_run(&self, run: SeedRun) -> Result<(), BeakerError>;
    async fn runs_for(&self, seed_name: &str) -> Result<Vec<SeedRun>, BeakerError>;
    async fn all_runs(&self) -> Result<BTreeMap<String, Vec<SeedRun>>, BeakerError>;
}

/// Bitácora de seeds en memoria, perdida al reiniciar el proceso (coherente
/// con el resto de los beakers efímeros).
#[derive(Default)]
pub struct MemorySeedAudit {
    runs: DashMap<String, Vec<SeedRun>>,
}

impl MemorySeedAudit {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SeedAudit for MemorySeedAudit {
    async fn record_run(&self, run: SeedRun) -> Result<(), BeakerError> {
        self.runs.entry(run.seed_name.clone()).or_default().push(run);
        Ok(())
    }

    async fn runs_for(&self, seed_name: &str) -> Result<Vec<SeedRun>, BeakerError> {
        Ok(self.runs.get(seed_name).map(|v| v.clone()).unwrap_or_default())
    }

    async fn all_runs(&self) -> Result<BTreeMap<String, Vec<SeedRun>>, BeakerError> {
        Ok(self
            .runs
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect())
    }
}

struct RegisteredSeed {
    to_beaker: String,
    producer: Box<dyn SeedProducer>,
}

/// Coordina el registro de seeds y su ejecución con semántica "una vez por
/// nombre salvo reset explícito".
pub struct SeedManager {
    seeds: IndexMap<String, RegisteredSeed>,
    audit: Box<dyn SeedAudit>,
}

impl SeedManager {
    pub fn new(audit: Box<dyn SeedAudit>) -> Self {
        Self {
            seeds: IndexMap::new(),
            audit,
        }
    }

    pub fn register(
        &mut self,
        name: impl Into<String>,
        to_beaker: impl Into<String>,
        producer: Box<dyn SeedProducer>,
    ) {
        self.seeds.insert(
            name.into(),
            RegisteredSeed {
                to_beaker: to_beaker.into(),
                producer,
            },
        );
    }

    /// Vista agrupada por beaker destino y luego por nombre de seed, usada
    /// por la subcomanda `seeds` de la CLI. El doble `BTreeMap` garantiza un
    /// orden determinista independiente del orden de registro.
    pub async fn list_seeds(&self) -> Result<BTreeMap<String, BTreeMap<String, Vec<SeedRun>>>, BeakerError> {
        let mut out: BTreeMap<String, BTreeMap<String, Vec<SeedRun>>> = BTreeMap::new();
        for (name, seed) in &self.seeds {
            let runs = self.audit.runs_for(name).await?;
            out.entry(seed.to_beaker.clone())
                .or_default()
                .insert(name.clone(), runs);
        }
        Ok(out)
    }

    /// Ejecuta el productor registrado bajo `name` y escribe los items
    /// producidos como registros nuevos en su beaker destino, en una sola
    /// alta por lote. Falla si ya corrió antes y `reset` es falso.
    /// `max_items` trunca la lista producida antes de insertarla, útil para
    /// probar un seed costoso contra una muestra pequeña.
    pub async fn run_seed(
        &self,
        name: &str,
        reset: bool,
        destination: &dyn Beaker,
        max_items: Option<usize>,
    ) -> Result<SeedRun, BeakerError> {
        let started_at = Utc::now();
        let seed = self
            .seeds
            .get(name)
            .ok_or_else(|| SeedErrorKind::UnknownSeed(name.to_string()))?;

        if !reset {
            let previous = self.audit.runs_for(name).await?;
            if let Some(last) = previous.last() {
                return Err(SeedErrorKind::AlreadyRun {
                    name: name.to_string(),
                    ran_at: last.started_at.to_rfc3339(),
                }
                .into());
            }
        } else {
            destination.reset().await?;
        }

        let mut items = seed
            .producer
            .produce()
            .await
            .map_err(|e| SeedErrorKind::ProducerFailed {
                name: name.to_string(),
                message: e.to_string(),
            })?;
        if let Some(max) = max_items {
            items.truncate(max);
        }

        let items_with_ids: Vec<(RecordId, Value)> =
            items.into_iter().map(|item| (RecordId::new(), item)).collect();
        let num_items = items_with_ids.len();
        destination.add_batch(items_with_ids).await?;

        let run = SeedRun {
            run_id: RecordId::new(),
            seed_name: name.to_string(),
            beaker_name: destination.name().to_string(),
            num_items,
            started_at,
            ended_at: Utc::now(),
        };
        self.audit.record_run(run.clone()).await?;
        Ok(run)
    }
}
