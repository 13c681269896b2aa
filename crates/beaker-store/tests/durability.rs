//! Verifica que un beaker durable sobrevive a reabrir el mismo fichero
//! SQLite con un pool nuevo (invariante 2, "durabilidad").

use beaker_core::{Beaker, BeakerError, RecordId, SeedAudit, SeedRun};
use beaker_store::{SqliteBeaker, SqliteSeedAudit};
use chrono::Utc;
use serde_json::json;
use sqlx::sqlite::SqlitePoolOptions;

async fn pool_for(path: &std::path::Path) -> sqlx::sqlite::SqlitePool {
    let url = format!("sqlite://{}?mode=rwc", path.display());
    SqlitePoolOptions::new()
        .max_connections(1)
        .connect(&url)
        .await
        .expect("open sqlite pool")
}

#[tokio::test]
async fn items_survive_reopening_the_database_file() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("beakers.db");

    let id = RecordId::new();
    {
        let pool = pool_for(&db_path).await;
        let beaker = SqliteBeaker::open(pool, "raw").await.unwrap();
        beaker.put(id, json!({"url": "http://example.com"})).await.unwrap();
    }

    let pool = pool_for(&db_path).await;
    let reopened = SqliteBeaker::open(pool, "raw").await.unwrap();
    let payload = reopened.get(id).await.unwrap();
    assert_eq!(payload, Some(json!({"url": "http://example.com"})));
    assert_eq!(reopened.len().await.unwrap(), 1);
}

#[tokio::test]
async fn reset_clears_the_backing_table() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("beakers.db");
    let pool = pool_for(&db_path).await;
    let beaker = SqliteBeaker::open(pool, "raw").await.unwrap();

    beaker.put(RecordId::new(), json!(1)).await.unwrap();
    beaker.put(RecordId::new(), json!(2)).await.unwrap();
    assert_eq!(beaker.len().await.unwrap(), 2);

    beaker.reset().await.unwrap();
    assert!(beaker.is_empty().await.unwrap());
}

#[tokio::test]
async fn seed_runs_are_recorded_and_survive_reopening() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("seeds.db");

    {
        let pool = pool_for(&db_path).await;
        let audit = SqliteSeedAudit::open(pool).await.unwrap();
        let now = Utc::now();
        audit
            .record_run(SeedRun {
                run_id: RecordId::new(),
                seed_name: "urls".to_string(),
                beaker_name: "raw_urls".to_string(),
                num_items: 3,
                started_at: now,
                ended_at: now,
            })
            .await
            .unwrap();
    }

    let pool = pool_for(&db_path).await;
    let reopened = SqliteSeedAudit::open(pool).await.unwrap();
    let runs = reopened.runs_for("urls").await.unwrap();
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].num_items, 3);
    assert_eq!(runs[0].beaker_name, "raw_urls");
}

#[tokio::test]
async fn add_rejects_a_duplicate_id_already_in_the_table() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("beakers.db");
    let pool = pool_for(&db_path).await;
    let beaker = SqliteBeaker::open(pool, "raw").await.unwrap();

    let id = RecordId::new();
    beaker.add(id, json!({"v": 1})).await.unwrap();
    let err = beaker.add(id, json!({"v": 2})).await.unwrap_err();
    assert!(matches!(err, BeakerError::DuplicateId(_)));
    assert_eq!(beaker.get(id).await.unwrap(), Some(json!({"v": 1})));
}

#[tokio::test]
async fn add_batch_commits_nothing_when_one_id_collides() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("beakers.db");
    let pool = pool_for(&db_path).await;
    let beaker = SqliteBeaker::open(pool, "raw").await.unwrap();

    let existing = RecordId::new();
    beaker.add(existing, json!(0)).await.unwrap();

    let fresh = RecordId::new();
    let err = beaker
        .add_batch(vec![(fresh, json!(1)), (existing, json!(2))])
        .await
        .unwrap_err();
    assert!(matches!(err, BeakerError::DuplicateId(_)));
    assert_eq!(beaker.get(fresh).await.unwrap(), None);
}
