//! Bitácora durable de ejecuciones de seeds, una fila inmutable por
//! ejecución.

use async_trait::async_trait;
use beaker_core::{BeakerError, RecordId, SeedAudit, SeedRun};
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqlitePool;
use sqlx::Row;
use std::collections::BTreeMap;

use crate::error::map_sqlx_error;

pub struct SqliteSeedAudit {
    pool: SqlitePool,
}

impl SqliteSeedAudit {
    pub async fn open(pool: SqlitePool) -> Result<Self, BeakerError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS _seeds (
                run_id TEXT NOT NULL,
                seed_name TEXT NOT NULL,
                beaker_name TEXT NOT NULL,
                num_items INTEGER NOT NULL,
                started_at TEXT NOT NULL,
                ended_at TEXT NOT NULL
            )",
        )
        .execute(&pool)
        .await
        .map_err(|e| map_sqlx_error("create _seeds table", e))?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl SeedAudit for SqliteSeedAudit {
    async fn record_run(&self, run: SeedRun) -> Result<(), BeakerError> {
        sqlx::query(
            "INSERT INTO _seeds (run_id, seed_name, beaker_name, num_items, started_at, ended_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(run.run_id.to_string())
        .bind(&run.seed_name)
        .bind(&run.beaker_name)
        .bind(run.num_items as i64)
        .bind(run.started_at.to_rfc3339())
        .bind(run.ended_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("record seed run", e))?;
        Ok(())
    }

    async fn runs_for(&self, seed_name: &str) -> Result<Vec<SeedRun>, BeakerError> {
        let rows = sqlx::query(
            "SELECT run_id, seed_name, beaker_name, num_items, started_at, ended_at \
             FROM _seeds WHERE seed_name = ?1 ORDER BY started_at ASC",
        )
        .bind(seed_name)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("query seed runs", e))?;
        rows.into_iter().map(row_to_seed_run).collect()
    }

    async fn all_runs(&self) -> Result<BTreeMap<String, Vec<SeedRun>>, BeakerError> {
        let rows = sqlx::query(
            "SELECT run_id, seed_name, beaker_name, num_items, started_at, ended_at \
             FROM _seeds ORDER BY started_at ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("query all seed runs", e))?;

        let mut out: BTreeMap<String, Vec<SeedRun>> = BTreeMap::new();
        for row in rows {
            let run = row_to_seed_run(row)?;
            out.entry(run.seed_name.clone()).or_default().push(run);
        }
        Ok(out)
    }
}

fn row_to_seed_run(row: sqlx::sqlite::SqliteRow) -> Result<SeedRun, BeakerError> {
    let run_id_text: String = row
        .try_get("run_id")
        .map_err(|e| map_sqlx_error("decode run_id", e))?;
    let seed_name: String = row
        .try_get("seed_name")
        .map_err(|e| map_sqlx_error("decode seed_name", e))?;
    let beaker_name: String = row
        .try_get("beaker_name")
        .map_err(|e| map_sqlx_error("decode beaker_name", e))?;
    let num_items: i64 = row
        .try_get("num_items")
        .map_err(|e| map_sqlx_error("decode num_items", e))?;
    let started_at_text: String = row
        .try_get("started_at")
        .map_err(|e| map_sqlx_error("decode started_at", e))?;
    let ended_at_text: String = row
        .try_get("ended_at")
        .map_err(|e| map_sqlx_error("decode ended_at", e))?;

    let run_id: RecordId = run_id_text
        .parse()
        .map_err(|_| BeakerError::Internal(format!("malformed run id '{run_id_text}'")))?;
    let started_at: DateTime<Utc> = started_at_text
        .parse()
        .map_err(|_| BeakerError::Internal(format!("malformed timestamp '{started_at_text}'")))?;
    let ended_at: DateTime<Utc> = ended_at_text
        .parse()
        .map_err(|_| BeakerError::Internal(format!("malformed timestamp '{ended_at_text}'")))?;

    Ok(SeedRun {
        run_id,
        seed_name,
        beaker_name,
        num_items: num_items as usize,
        started_at,
        ended_at,
    })
}
