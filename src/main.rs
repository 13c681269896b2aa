//! Demostración de extremo a extremo del motor, completamente en memoria:
//! siembra un beaker, lo empuja a través de un transform en modo
//! waterfall, e imprime el reporte de la corrida.

use std::sync::Arc;

use async_trait::async_trait;
use beaker_core::{
    BeakerNode, BeakerSchema, EdgeCallResult, EdgeDecl, EdgeFn, EdgeKind, Graph, Lineage,
    MemoryBeaker, MemorySeedAudit, Pipeline, RunMode, SeedManager, SeedProducer, Transform,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawNumber {
    value: i64,
}

impl BeakerSchema for RawNumber {
    const SCHEMA_NAME: &'static str = "raw_number";
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SquaredNumber {
    value: i64,
}

impl BeakerSchema for SquaredNumber {
    const SCHEMA_NAME: &'static str = "squared_number";
}

struct Square;

#[async_trait]
impl EdgeFn for Square {
    type Input = RawNumber;
    type Output = SquaredNumber;
    type Error = beaker_core::BeakerError;

    async fn call(
        &self,
        input: Self::Input,
        _lineage: &Lineage,
    ) -> Result<EdgeCallResult<Self::Output>, Self::Error> {
        Ok(EdgeCallResult::Single(SquaredNumber {
            value: input.value * input.value,
        }))
    }
}

struct Numbers;

#[async_trait]
impl SeedProducer for Numbers {
    async fn produce(&self) -> Result<Vec<Value>, beaker_core::BeakerError> {
        Ok((1..=5)
            .map(|value| serde_json::to_value(RawNumber { value }).unwrap())
            .collect())
    }
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().filter_or("BEAKERFLOW_LOG", "info"))
        .init();

    const RAW: &str = "raw_numbers";
    const SQUARED: &str = "squared_numbers";

    let mut graph = Graph::new();
    graph
        .add_beaker(BeakerNode {
            name: RAW.to_string(),
            schema_name: RawNumber::SCHEMA_NAME,
            durable: false,
        })
        .expect("declare raw beaker");
    graph
        .add_beaker(BeakerNode {
            name: SQUARED.to_string(),
            schema_name: SquaredNumber::SCHEMA_NAME,
            durable: false,
        })
        .expect("declare squared beaker");
    graph
        .add_edge(EdgeDecl {
            name: "square".to_string(),
            kind: EdgeKind::Transform,
            from_beaker: RAW.to_string(),
            to_beakers: vec![SQUARED.to_string()],
            error_destinations: vec![],
            input_schema: Some(RawNumber::SCHEMA_NAME),
            output_schema: Some(SquaredNumber::SCHEMA_NAME),
        })
        .expect("declare square edge");

    let mut seeds = SeedManager::new(Box::new(MemorySeedAudit::new()));
    seeds.register("numbers", RAW, Box::new(Numbers));

    let mut pipeline = Pipeline::new(graph, seeds);
    pipeline.register_beaker(Arc::new(MemoryBeaker::new(RAW)));
    pipeline.register_beaker(Arc::new(MemoryBeaker::new(SQUARED)));
    pipeline.register_edge("square", Arc::new(Transform::new("square", SQUARED, Square)));

    let run = pipeline
        .seeds
        .run_seed("numbers", false, pipeline.beaker(RAW).unwrap().as_ref(), None)
        .await
        .expect("run seed");
    println!("seeded {} number(s)", run.num_items);

    let report = beaker_core::runner::run(&pipeline, RunMode::Waterfall, None, None)
        .await
        .expect("run waterfall");

    for (from, to_counts) in report.counts() {
        for (to, n) in to_counts {
            println!("{from} -> {to}: {n}");
        }
    }

    for (id, payload) in pipeline.beaker(SQUARED).unwrap().items().await.unwrap() {
        println!("{id}: {payload}");
    }
}
