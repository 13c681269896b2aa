//! Beaker efímero in-memory, respaldado por `DashMap` para permitir
//! escrituras concurrentes desde el runner waterfall sin un mutex externo.

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde_json::Value;
use std::collections::BTreeSet;

use crate::beaker::Beaker;
use crate::errors::BeakerError;
use crate::record::RecordId;

pub struct MemoryBeaker {
    name: String,
    data: DashMap<RecordId, Value>,
}

impl MemoryBeaker {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data: DashMap::new(),
        }
    }
}

#[async_trait]
impl Beaker for MemoryBeaker {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_durable(&self) -> bool {
        false
    }

    async fn put(&self, id: RecordId, payload: Value) -> Result<(), BeakerError> {
        self.data.insert(id, payload);
        Ok(())
    }

    async fn get(&self, id: RecordId) -> Result<Option<Value>, BeakerError> {
        Ok(self.data.get(&id).map(|v| v.clone()))
    }

    async fn add(&self, id: RecordId, payload: Value) -> Result<(), BeakerError> {
        match self.data.entry(id) {
            Entry::Occupied(_) => Err(BeakerError::DuplicateId(id.to_string())),
            Entry::Vacant(slot) => {
                slot.insert(payload);
                Ok(())
            }
        }
    }

    async fn add_batch(&self, items: Vec<(RecordId, Value)>) -> Result<(), BeakerError> {
        for (id, _) in &items {
            if self.data.contains_key(id) {
                return Err(BeakerError::DuplicateId(id.to_string()));
            }
        }
        for (id, payload) in items {
            self.data.insert(id, payload);
        }
        Ok(())
    }

    async fn items(&self) -> Result<Vec<(RecordId, Value)>, BeakerError> {
        Ok(self
            .data
            .iter()
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect())
    }

    async fn id_set(&self) -> Result<BTreeSet<RecordId>, BeakerError> {
        Ok(self.data.iter().map(|entry| *entry.key()).collect())
    }

    async fn len(&self) -> Result<usize, BeakerError> {
        Ok(self.data.len())
    }

    async fn reset(&self) -> Result<(), BeakerError> {
        self.data.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn put_then_get_roundtrips() {
        let beaker = MemoryBeaker::new("raw");
        let id = RecordId::new();
        beaker.put(id, json!({"url": "http://example.com"})).await.unwrap();
        let got = beaker.get(id).await.unwrap();
        assert_eq!(got, Some(json!({"url": "http://example.com"})));
    }

    #[tokio::test]
    async fn reset_clears_id_set() {
        let beaker = MemoryBeaker::new("raw");
        beaker.put(RecordId::new(), json!(1)).await.unwrap();
        beaker.put(RecordId::new(), json!(2)).await.unwrap();
        assert_eq!(beaker.len().await.unwrap(), 2);
        beaker.reset().await.unwrap();
        assert!(beaker.is_empty().await.unwrap());
    }

    #[tokio::test]
    async fn put_is_idempotent_for_same_id() {
        let beaker = MemoryBeaker::new("raw");
        let id = RecordId::new();
        beaker.put(id, json!({"v": 1})).await.unwrap();
        beaker.put(id, json!({"v": 1})).await.unwrap();
        assert_eq!(beaker.len().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn add_rejects_an_id_already_present() {
        let beaker = MemoryBeaker::new("raw");
        let id = RecordId::new();
        beaker.add(id, json!({"v": 1})).await.unwrap();
        let err = beaker.add(id, json!({"v": 2})).await.unwrap_err();
        assert!(matches!(err, BeakerError::DuplicateId(_)));
        assert_eq!(beaker.get(id).await.unwrap(), Some(json!({"v": 1})));
    }

    #[tokio::test]
    async fn add_batch_writes_nothing_if_any_id_collides() {
        let beaker = MemoryBeaker::new("raw");
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
}
