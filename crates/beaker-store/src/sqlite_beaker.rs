//! Beaker durable respaldado por una tabla SQLite dedicada, una por
//! beaker.

use async_trait::async_trait;
use beaker_core::{Beaker, BeakerError, RecordId};
use serde_json::Value;
use sqlx::sqlite::SqlitePool;
use sqlx::Row;
use std::collections::BTreeSet;

use crate::error::{map_insert_error, map_sqlx_error};

/// Sólo letras, dígitos y `_`: el nombre del beaker se interpola
/// directamente en el nombre de la tabla (sqlx no permite bindear
/// identificadores), así que se valida antes de usarse en cualquier SQL.
fn validate_table_name(name: &str) -> Result<(), BeakerError> {
    if !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        Ok(())
    } else {
        Err(BeakerError::Internal(format!(
            "invalid beaker name for table storage: '{name}'"
        )))
    }
}

pub struct SqliteBeaker {
    name: String,
    pool: SqlitePool,
}

impl SqliteBeaker {
    pub async fn open(pool: SqlitePool, name: impl Into<String>) -> Result<Self, BeakerError> {
        let name = name.into();
        validate_table_name(&name)?;

        let ddl = format!(
            "CREATE TABLE IF NOT EXISTS \"{name}\" (id TEXT PRIMARY KEY, payload TEXT NOT NULL)"
        );
        sqlx::query(&ddl)
            .execute(&pool)
            .await
            .map_err(|e| map_sqlx_error(&format!("create table for beaker '{name}'"), e))?;

        log::debug!("beaker-store: opened durable beaker '{name}'");
        Ok(Self { name, pool })
    }
}

#[async_trait]
impl Beaker for SqliteBeaker {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_durable(&self) -> bool {
        true
    }

    async fn put(&self, id: RecordId, payload: Value) -> Result<(), BeakerError> {
        let sql = format!(
            "INSERT INTO \"{}\" (id, payload) VALUES (?1, ?2) \
             ON CONFLICT(id) DO UPDATE SET payload = excluded.payload",
            self.name
        );
        let payload_text = serde_json::to_string(&payload)
            .map_err(|e| BeakerError::Internal(format!("serialize payload: {e}")))?;
        sqlx::query(&sql)
            .bind(id.to_string())
            .bind(payload_text)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error(&format!("put into beaker '{}'", self.name), e))?;
        Ok(())
    }

    async fn add(&self, id: RecordId, payload: Value) -> Result<(), BeakerError> {
        let sql = format!("INSERT INTO \"{}\" (id, payload) VALUES (?1, ?2)", self.name);
        let payload_text = serde_json::to_string(&payload)
            .map_err(|e| BeakerError::Internal(format!("serialize payload: {e}")))?;
        sqlx::query(&sql)
            .bind(id.to_string())
            .bind(payload_text)
            .execute(&self.pool)
            .await
            .map_err(|e| map_insert_error(&id.to_string(), &format!("add into beaker '{}'", self.name), e))?;
        Ok(())
    }

    async fn add_batch(&self, items: Vec<(RecordId, Value)>) -> Result<(), BeakerError> {
        if items.is_empty() {
            return Ok(());
        }
        let sql = format!("INSERT INTO \"{}\" (id, payload) VALUES (?1, ?2)", self.name);
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error(&format!("begin transaction for beaker '{}'", self.name), e))?;

        for (id, payload) in items {
            let payload_text = serde_json::to_string(&payload)
                .map_err(|e| BeakerError::Internal(format!("serialize payload: {e}")))?;
            sqlx::query(&sql)
                .bind(id.to_string())
                .bind(payload_text)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    map_insert_error(&id.to_string(), &format!("add_batch into beaker '{}'", self.name), e)
                })?;
        }

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error(&format!("commit transaction for beaker '{}'", self.name), e))?;
        Ok(())
    }

    async fn get(&self, id: RecordId) -> Result<Option<Value>, BeakerError> {
        let sql = format!("SELECT payload FROM \"{}\" WHERE id = ?1", self.name);
        let row = sqlx::query(&sql)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error(&format!("get from beaker '{}'", self.name), e))?;
        row.map(|row| {
            let payload_text: String = row.try_get("payload").map_err(|e| {
                map_sqlx_error(&format!("decode row from beaker '{}'", self.name), e)
            })?;
            serde_json::from_str(&payload_text)
                .map_err(|e| BeakerError::Internal(format!("deserialize payload: {e}")))
        })
        .transpose()
    }

    async fn items(&self) -> Result<Vec<(RecordId, Value)>, BeakerError> {
        let sql = format!("SELECT id, payload FROM \"{}\"", self.name);
        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error(&format!("list items of beaker '{}'", self.name), e))?;

        rows.into_iter()
            .map(|row| {
                let id_text: String = row.try_get("id").map_err(|e| {
                    map_sqlx_error(&format!("decode id from beaker '{}'", self.name), e)
                })?;
                let payload_text: String = row.try_get("payload").map_err(|e| {
                    map_sqlx_error(&format!("decode payload from beaker '{}'", self.name), e)
                })?;
                let id = id_text
                    .parse()
                    .map_err(|_| BeakerError::Internal(format!("malformed id '{id_text}'")))?;
                let payload = serde_json::from_str(&payload_text)
                    .map_err(|e| BeakerError::Internal(format!("deserialize payload: {e}")))?;
                Ok((id, payload))
            })
            .collect()
    }

    async fn id_set(&self) -> Result<BTreeSet<RecordId>, BeakerError> {
        let sql = format!("SELECT id FROM \"{}\"", self.name);
        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error(&format!("list ids of beaker '{}'", self.name), e))?;

        rows.into_iter()
            .map(|row| {
                let id_text: String = row.try_get("id").map_err(|e| {
                    map_sqlx_error(&format!("decode id from beaker '{}'", self.name), e)
                })?;
                id_text
                    .parse()
                    .map_err(|_| BeakerError::Internal(format!("malformed id '{id_text}'")))
            })
            .collect()
    }

    async fn len(&self) -> Result<usize, BeakerError> {
        let sql = format!("SELECT COUNT(*) as n FROM \"{}\"", self.name);
        let row = sqlx::query(&sql)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_sqlx_error(&format!("count beaker '{}'", self.name), e))?;
        let n: i64 = row
            .try_get("n")
            .map_err(|e| map_sqlx_error(&format!("decode count of beaker '{}'", self.name), e))?;
        Ok(n as usize)
    }

    async fn reset(&self) -> Result<(), BeakerError> {
        let sql = format!("DELETE FROM \"{}\"", self.name);
        sqlx::query(&sql)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error(&format!("reset beaker '{}'", self.name), e))?;
        Ok(())
    }
}
