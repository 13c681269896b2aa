//! Limita la tasa de invocación de un edge interno a `calls_per_second`.

use async_trait::async_trait;
use serde_json::Value;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use crate::edge::{EdgeOutcome, EdgeRunner};
use crate::errors::BeakerError;
use crate::model::Lineage;
use crate::record::RecordId;

pub struct RateLimit {
    inner: Box<dyn EdgeRunner>,
    min_interval: Duration,
    last_call: Mutex<Option<Instant>>,
}

impl RateLimit {
    pub fn new(inner: Box<dyn EdgeRunner>, calls_per_second: f64) -> Self {
        assert!(calls_per_second > 0.0, "calls_per_second must be positive");
        Self {
            inner,
            min_interval: Duration::from_secs_f64(1.0 / calls_per_second),
            last_call: Mutex::new(None),
        }
    }
}

#[async_trait]
impl EdgeRunner for RateLimit {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn run(
        &self,
        id: RecordId,
        payload: Value,
        lineage: &Lineage,
    ) -> Result<Vec<EdgeOutcome>, BeakerError> {
        {
            let mut last_call = self.last_call.lock().await;
            if let Some(previous) = *last_call {
                let elapsed = previous.elapsed();
                if elapsed < self.min_interval {
                    tokio::time::sleep(self.min_interval - elapsed).await;
                }
            }
            *last_call = Some(Instant::now());
        }
        self.inner.run(id, payload, lineage).await
    }
}
