//! Escenarios de extremo a extremo sobre beakers en memoria: siembra,
//! transform con fan-out, enrutamiento de errores y re-ejecución
//! idempotente en modo waterfall.

use std::sync::Arc;

use async_trait::async_trait;
use beaker_core::{
    BeakerError, BeakerNode, BeakerSchema, EdgeCallResult, EdgeDecl, EdgeFn, EdgeKind, ErrorRecord,
    Graph, Lineage, MemoryBeaker, MemorySeedAudit, Pipeline, RunMode, SeedManager, SeedProducer,
    Transform,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

const RAW: &str = "raw";
const EVEN: &str = "even";
const ERRORS: &str = "errors";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Raw {
    value: i64,
}
impl BeakerSchema for Raw {
    const SCHEMA_NAME: &'static str = "raw";
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Doubled {
    value: i64,
}
impl BeakerSchema for Doubled {
    const SCHEMA_NAME: &'static str = "doubled";
}

struct KeepEvensDoubled;

#[async_trait]
impl EdgeFn for KeepEvensDoubled {
    type Input = Raw;
    type Output = Doubled;
    type Error = BeakerError;

    async fn call(
        &self,
        input: Self::Input,
        _lineage: &Lineage,
    ) -> Result<EdgeCallResult<Self::Output>, Self::Error> {
        if input.value < 0 {
            return Err(BeakerError::Internal("negative value".to_string()));
        }
        if input.value % 2 == 0 {
            Ok(EdgeCallResult::Single(Doubled {
                value: input.value * 2,
            }))
        } else {
            Ok(EdgeCallResult::Empty)
        }
    }
}

struct FixedNumbers(Vec<i64>);

#[async_trait]
impl SeedProducer for FixedNumbers {
    async fn produce(&self) -> Result<Vec<Value>, BeakerError> {
        Ok(self
            .0
            .iter()
            .map(|v| serde_json::to_value(Raw { value: *v }).unwrap())
            .collect())
    }
}

async fn build_pipeline(numbers: Vec<i64>) -> Pipeline {
    let mut graph = Graph::new();
    graph
        .add_beaker(BeakerNode {
            name: RAW.to_string(),
            schema_name: Raw::SCHEMA_NAME,
            durable: false,
        })
        .unwrap();
    graph
        .add_beaker(BeakerNode {
            name: EVEN.to_string(),
            schema_name: Doubled::SCHEMA_NAME,
            durable: false,
        })
        .unwrap();
    graph
        .add_beaker(BeakerNode {
            name: ERRORS.to_string(),
            schema_name: ErrorRecord::SCHEMA_NAME,
            durable: true,
        })
        .unwrap();
    graph
        .add_edge(EdgeDecl {
            name: "double_evens".to_string(),
            kind: EdgeKind::Transform,
            from_beaker: RAW.to_string(),
            to_beakers: vec![EVEN.to_string()],
            error_destinations: vec![ERRORS.to_string()],
            input_schema: Some(Raw::SCHEMA_NAME),
            output_schema: Some(Doubled::SCHEMA_NAME),
        })
        .unwrap();

    let mut seeds = SeedManager::new(Box::new(MemorySeedAudit::new()));
    seeds.register("numbers", RAW, Box::new(FixedNumbers(numbers)));

    let mut pipeline = Pipeline::new(graph, seeds);
    pipeline.register_beaker(Arc::new(MemoryBeaker::new(RAW)));
    pipeline.register_beaker(Arc::new(MemoryBeaker::new(EVEN)));
    pipeline.register_beaker(Arc::new(MemoryBeaker::new(ERRORS)));
    pipeline.register_edge(
        "double_evens",
        Arc::new(
            Transform::new("double_evens", EVEN, KeepEvensDoubled)
                .allow_filter()
                .error_map_entry(vec!["Internal"], ERRORS),
        ),
    );

    pipeline
        .seeds
        .run_seed("numbers", false, pipeline.beaker(RAW).unwrap().as_ref(), None)
        .await
        .unwrap();

    pipeline
}

#[tokio::test]
async fn odd_numbers_are_filtered_and_evens_doubled() {
    let pipeline = build_pipeline(vec![1, 2, 3, 4]).await;
    let report = beaker_core::runner::run(&pipeline, RunMode::Waterfall, None, None)
        .await
        .unwrap();

    assert_eq!(pipeline.beaker(EVEN).unwrap().len().await.unwrap(), 2);
    assert_eq!(report.total_for(RAW, EVEN), 2);

    let values: Vec<i64> = pipeline
        .beaker(EVEN)
        .unwrap()
        .items()
        .await
        .unwrap()
        .into_iter()
        .map(|(_, v)| v["value"].as_i64().unwrap())
        .collect();
    assert!(values.contains(&4));
    assert!(values.contains(&8));
}

#[tokio::test]
async fn negative_values_route_to_the_error_beaker() {
    let pipeline = build_pipeline(vec![-2]).await;
    beaker_core::runner::run(&pipeline, RunMode::Waterfall, None, None)
        .await
        .unwrap();

    assert_eq!(pipeline.beaker(ERRORS).unwrap().len().await.unwrap(), 1);
    let (_, payload) = pipeline.beaker(ERRORS).unwrap().items().await.unwrap().remove(0);
    assert_eq!(payload["exception_class_name"], json!("Internal"));
}

#[tokio::test]
async fn rerunning_waterfall_does_not_reprocess_already_seen_records() {
    let pipeline = build_pipeline(vec![2, 4]).await;
    beaker_core::runner::run(&pipeline, RunMode::Waterfall, None, None)
        .await
        .unwrap();
    assert_eq!(pipeline.beaker(EVEN).unwrap().len().await.unwrap(), 2);

    let second_report = beaker_core::runner::run(&pipeline, RunMode::Waterfall, None, None)
        .await
        .unwrap();

    assert_eq!(pipeline.beaker(EVEN).unwrap().len().await.unwrap(), 2);
    assert_eq!(
        second_report.total_for(RAW, beaker_core::report::ALREADY_PROCESSED),
        2
    );
}

#[tokio::test]
async fn river_mode_reaches_the_same_fixed_point_as_waterfall() {
    let pipeline = build_pipeline(vec![1, 2, 3, 4, 6]).await;
    beaker_core::runner::run(&pipeline, RunMode::River, Some(RAW), None)
        .await
        .unwrap();

    assert_eq!(pipeline.beaker(EVEN).unwrap().len().await.unwrap(), 3);
}

#[tokio::test]
async fn seed_cannot_run_twice_without_reset() {
    let pipeline = build_pipeline(vec![2]).await;
    let err = pipeline
        .seeds
        .run_seed("numbers", false, pipeline.beaker(RAW).unwrap().as_ref(), None)
        .await
        .unwrap_err();
    assert!(matches!(err, BeakerError::Seed(_)));
}

#[tokio::test]
async fn seed_max_items_truncates_the_produced_batch() {
    let pipeline = build_pipeline(vec![2, 4, 6, 8]).await;
    assert_eq!(pipeline.beaker(RAW).unwrap().len().await.unwrap(), 4);

    let run = pipeline
        .seeds
        .run_seed("numbers", true, pipeline.beaker(RAW).unwrap().as_ref(), Some(2))
        .await
        .unwrap();
    assert_eq!(run.num_items, 2);
    assert_eq!(pipeline.beaker(RAW).unwrap().len().await.unwrap(), 2);
}

#[tokio::test]
async fn seed_can_rerun_with_reset() {
    let pipeline = build_pipeline(vec![2, 4]).await;
    assert_eq!(pipeline.beaker(RAW).unwrap().len().await.unwrap(), 2);

    pipeline
        .seeds
        .run_seed("numbers", true, pipeline.beaker(RAW).unwrap().as_ref(), None)
        .await
        .unwrap();
    assert_eq!(pipeline.beaker(RAW).unwrap().len().await.unwrap(), 2);
}
