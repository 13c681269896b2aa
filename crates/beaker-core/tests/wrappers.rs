//! Decoradores de edges: reintentos, enrutamiento condicional y
//! clasificación vía `Splitter`.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use beaker_core::{
    BeakerError, EdgeCallResult, EdgeFn, EdgeOutcome, EdgeRunner, Lineage, RecordId, Splitter,
    Transform,
};
use beaker_core::wrappers::{Conditional, IfFalse, Retry};
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Num {
    value: i64,
}
impl beaker_core::BeakerSchema for Num {
    const SCHEMA_NAME: &'static str = "num";
}

struct FailNTimes {
    remaining: AtomicUsize,
}

#[async_trait]
impl EdgeFn for FailNTimes {
    type Input = Num;
    type Output = Num;
    type Error = BeakerError;

    async fn call(
        &self,
        input: Self::Input,
        _lineage: &Lineage,
    ) -> Result<EdgeCallResult<Self::Output>, Self::Error> {
        if self.remaining.fetch_sub(1, Ordering::SeqCst) > 0 {
            Err(BeakerError::Internal("transient failure".to_string()))
        } else {
            Ok(EdgeCallResult::Single(input))
        }
    }
}

#[tokio::test]
async fn retry_succeeds_after_transient_failures() {
    let inner = Transform::new(
        "flaky",
        "out",
        FailNTimes {
            remaining: AtomicUsize::new(2),
        },
    );
    let wrapped = Retry::new(Box::new(inner), 2);
    let lineage = Lineage::new(RecordId::new());

    let outcomes = wrapped.run(RecordId::new(), json!({"value": 7}), &lineage).await.unwrap();
    assert_eq!(outcomes.len(), 1);
    assert!(matches!(outcomes[0], EdgeOutcome::Write { .. }));
}

#[tokio::test]
async fn retry_gives_up_after_exhausting_attempts() {
    let inner = Transform::new(
        "flaky",
        "out",
        FailNTimes {
            remaining: AtomicUsize::new(10),
        },
    );
    let wrapped = Retry::new(Box::new(inner), 1);
    let lineage = Lineage::new(RecordId::new());

    let err = wrapped
        .run(RecordId::new(), json!({"value": 7}), &lineage)
        .await
        .unwrap_err();
    assert!(matches!(err, BeakerError::UncaughtEdgeError { .. }));
}

struct Identity;

#[async_trait]
impl EdgeFn for Identity {
    type Input = Num;
    type Output = Num;
    type Error = BeakerError;

    async fn call(
        &self,
        input: Self::Input,
        _lineage: &Lineage,
    ) -> Result<EdgeCallResult<Self::Output>, Self::Error> {
        Ok(EdgeCallResult::Single(input))
    }
}

#[tokio::test]
async fn conditional_drops_records_failing_the_predicate() {
    let inner = Transform::new("identity", "out", Identity);
    let wrapped = Conditional::new(Box::new(inner), |v| v["value"].as_i64().unwrap() > 0, IfFalse::Drop);
    let lineage = Lineage::new(RecordId::new());

    let outcomes = wrapped
        .run(RecordId::new(), json!({"value": -1}), &lineage)
        .await
        .unwrap();
    assert!(matches!(outcomes[0], EdgeOutcome::Stop));
}

#[tokio::test]
async fn conditional_passes_records_through_on_true() {
    let inner = Transform::new("identity", "out", Identity);
    let wrapped = Conditional::new(Box::new(inner), |v| v["value"].as_i64().unwrap() > 0, IfFalse::Drop);
    let lineage = Lineage::new(RecordId::new());

    let outcomes = wrapped
        .run(RecordId::new(), json!({"value": 3}), &lineage)
        .await
        .unwrap();
    assert!(matches!(outcomes[0], EdgeOutcome::Write { .. }));
}

#[tokio::test]
async fn splitter_routes_to_the_branch_named_by_the_classifier() {
    let positive = Transform::new("positive", "positives", Identity);
    let negative = Transform::new("negative", "negatives", Identity);

    let splitter = Splitter::new("sign", |v: &serde_json::Value| {
        Ok(if v["value"].as_i64().unwrap() >= 0 {
            "positive".to_string()
        } else {
            "negative".to_string()
        })
    })
    .branch("positive", Box::new(positive))
    .branch("negative", Box::new(negative));

    let lineage = Lineage::new(RecordId::new());
    let outcomes = splitter
        .run(RecordId::new(), json!({"value": -5}), &lineage)
        .await
        .unwrap();

    match &outcomes[0] {
        EdgeOutcome::Write { destination, .. } => assert_eq!(destination, "negatives"),
        EdgeOutcome::Stop => panic!("expected a write"),
    }
}

#[tokio::test]
async fn splitter_rejects_unknown_branch_keys() {
    let positive = Transform::new("positive", "positives", Identity);
    let splitter = Splitter::new("sign", |_: &serde_json::Value| Ok("missing".to_string()))
        .branch("positive", Box::new(positive));

    let lineage = Lineage::new(RecordId::new());
    let err = splitter
        .run(RecordId::new(), json!({"value": 1}), &lineage)
        .await
        .unwrap_err();
    assert!(matches!(err, BeakerError::BadSplitResult(_)));
}
