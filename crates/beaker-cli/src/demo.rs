//! Pipeline de demostración: dos beakers durables y un transform entre
//! ellos, suficiente para ejercitar todas las subcomandas de la CLI.

use std::sync::Arc;

use async_trait::async_trait;
use beaker_core::{
    BeakerError, BeakerNode, BeakerSchema, EdgeCallResult, EdgeDecl, EdgeFn, EdgeKind, Graph,
    Lineage, MemorySeedAudit, Pipeline, SeedManager, SeedProducer, Transform,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const RAW_BEAKER: &str = "raw_urls";
pub const PARSED_BEAKER: &str = "parsed_pages";
pub const ERROR_BEAKER: &str = "parse_errors";
pub const SEED_NAME: &str = "sample_urls";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawUrl {
    pub url: String,
}

impl BeakerSchema for RawUrl {
    const SCHEMA_NAME: &'static str = "raw_url";
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedPage {
    pub url: String,
    pub title: String,
}

impl BeakerSchema for ParsedPage {
    const SCHEMA_NAME: &'static str = "parsed_page";
}

struct ExtractTitle;

#[async_trait]
impl EdgeFn for ExtractTitle {
    type Input = RawUrl;
    type Output = ParsedPage;
    type Error = BeakerError;

    async fn call(
        &self,
        input: Self::Input,
        _lineage: &Lineage,
    ) -> Result<EdgeCallResult<Self::Output>, Self::Error> {
        if input.url.trim().is_empty() {
            return Err(BeakerError::Internal("empty url".to_string()));
        }
        let title = input
            .url
            .trim_start_matches("https://")
            .trim_start_matches("http://")
            .to_string();
        Ok(EdgeCallResult::Single(ParsedPage {
            url: input.url,
            title,
        }))
    }
}

struct SampleUrls;

#[async_trait]
impl SeedProducer for SampleUrls {
    async fn produce(&self) -> Result<Vec<Value>, BeakerError> {
        Ok(vec![
            serde_json::to_value(RawUrl {
                url: "https://example.com".to_string(),
            })
            .unwrap(),
            serde_json::to_value(RawUrl {
                url: "https://rust-lang.org".to_string(),
            })
            .unwrap(),
        ])
    }
}

/// Construye el grafo, registra los beakers (durables, vía `beaker-store`)
/// y devuelve el `Pipeline` listo para correr.
pub async fn build(pool: sqlx::sqlite::SqlitePool) -> Result<Pipeline, BeakerError> {
    let mut graph = Graph::new();
    graph.add_beaker(BeakerNode {
        name: RAW_BEAKER.to_string(),
        schema_name: RawUrl::SCHEMA_NAME,
        durable: true,
    })?;
    graph.add_beaker(BeakerNode {
        name: PARSED_BEAKER.to_string(),
        schema_name: ParsedPage::SCHEMA_NAME,
        durable: true,
    })?;
    graph.add_beaker(BeakerNode {
        name: ERROR_BEAKER.to_string(),
        schema_name: beaker_core::ErrorRecord::SCHEMA_NAME,
        durable: true,
    })?;
    graph.add_edge(EdgeDecl {
        name: "extract_title".to_string(),
        kind: EdgeKind::Transform,
        from_beaker: RAW_BEAKER.to_string(),
        to_beakers: vec![PARSED_BEAKER.to_string()],
        error_destinations: vec![ERROR_BEAKER.to_string()],
        input_schema: Some(RawUrl::SCHEMA_NAME),
        output_schema: Some(ParsedPage::SCHEMA_NAME),
    })?;

    let mut seeds = SeedManager::new(Box::new(MemorySeedAudit::new()));
    seeds.register(SEED_NAME, RAW_BEAKER, Box::new(SampleUrls));

    let mut pipeline = Pipeline::new(graph, seeds);

    pipeline.register_beaker(Arc::new(
        beaker_store::SqliteBeaker::open(pool.clone(), RAW_BEAKER).await?,
    ));
    pipeline.register_beaker(Arc::new(
        beaker_store::SqliteBeaker::open(pool.clone(), PARSED_BEAKER).await?,
    ));
    pipeline.register_beaker(Arc::new(
        beaker_store::SqliteBeaker::open(pool, ERROR_BEAKER).await?,
    ));

    let transform = Transform::new("extract_title", PARSED_BEAKER, ExtractTitle)
        .error_map_entry(vec!["Internal"], ERROR_BEAKER);
    pipeline.register_edge("extract_title", Arc::new(transform));

    Ok(pipeline)
}
