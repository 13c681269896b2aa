//! Resultado de una ejecución: cuántos registros cruzaron cada edge.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Estrategia de recorrido del grafo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunMode {
    /// Amplitud por edge: procesa todo un edge antes de avanzar al
    /// siguiente nivel del grafo.
    Waterfall,
    /// Profundidad por registro: cada registro atraviesa tantos edges como
    /// pueda antes de que el siguiente registro comience.
    River,
}

/// Conteo de registros que cruzaron de `from_beaker` a `to_beaker` (o a
/// `"_already_processed"` cuando el registro ya estaba presente en el
/// destino y se saltó por idempotencia).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    mode: RunMode,
    started_at: DateTime<Utc>,
    ended_at: Option<DateTime<Utc>>,
    /// Beakers a los que se restringió esta corrida (modo waterfall,
    /// parámetro `only`). `None` cuando la corrida cubrió el grafo entero.
    only_beakers: Option<Vec<String>>,
    /// Beaker de arranque de una corrida en modo river. `None` en
    /// waterfall, que no tiene un único punto de partida.
    start_beaker: Option<String>,
    /// beaker de origen -> beaker de destino (o `_already_processed`) -> conteo
    counts: BTreeMap<String, BTreeMap<String, usize>>,
}

impl Default for RunMode {
    fn default() -> Self {
        RunMode::Waterfall
    }
}

pub const ALREADY_PROCESSED: &str = "_already_processed";

impl RunReport {
    pub fn new(mode: RunMode, only_beakers: Option<Vec<String>>, start_beaker: Option<String>) -> Self {
        Self {
            mode,
            started_at: Utc::now(),
            ended_at: None,
            only_beakers,
            start_beaker,
            counts: BTreeMap::new(),
        }
    }

    pub fn mode(&self) -> RunMode {
        self.mode
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.ended_at
    }

    pub fn only_beakers(&self) -> Option<&[String]> {
        self.only_beakers.as_deref()
    }

    pub fn start_beaker(&self) -> Option<&str> {
        self.start_beaker.as_deref()
    }

    /// Marca la corrida como terminada. Llamado por el runner justo antes
    /// de devolver el reporte final.
    pub fn finish(&mut self) {
        self.ended_at = Some(Utc::now());
    }

    pub fn record(&mut self, from_beaker: &str, to_beaker: &str, n: usize) {
        if n == 0 {
            return;
        }
        *self
            .counts
            .entry(from_beaker.to_string())
            .or_default()
            .entry(to_beaker.to_string())
            .or_insert(0) += n;
    }

    pub fn record_already_processed(&mut self, from_beaker: &str, n: usize) {
        self.record(from_beaker, ALREADY_PROCESSED, n);
    }

    pub fn counts(&self) -> &BTreeMap<String, BTreeMap<String, usize>> {
        &self.counts
    }

    pub fn total_for(&self, from_beaker: &str, to_beaker: &str) -> usize {
        self.counts
            .get(from_beaker)
            .and_then(|m| m.get(to_beaker))
            .copied()
            .unwrap_or(0)
    }
}
