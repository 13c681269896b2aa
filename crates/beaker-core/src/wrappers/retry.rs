//! Reintenta un edge interno hasta `retries` veces adicionales antes de
//! propagar el último error.

use async_trait::async_trait;
use serde_json::Value;

use crate::edge::{EdgeOutcome, EdgeRunner};
use crate::errors::BeakerError;
use crate::model::Lineage;
use crate::record::RecordId;

pub struct Retry {
    inner: Box<dyn EdgeRunner>,
    retries: u32,
}

impl Retry {
    pub fn new(inner: Box<dyn EdgeRunner>, retries: u32) -> Self {
        Self { inner, retries }
    }
}

#[async_trait]
impl EdgeRunner for Retry {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn run(
        &self,
        id: RecordId,
        payload: Value,
        lineage: &Lineage,
    ) -> Result<Vec<EdgeOutcome>, BeakerError> {
        let attempts = self.retries + 1;
        let mut last_err = None;
        for attempt in 0..attempts {
            match self.inner.run(id, payload.clone(), lineage).await {
                Ok(outcomes) => return Ok(outcomes),
                Err(err) => {
                    log::debug!(
                        "edge '{}' attempt {}/{} failed: {}",
                        self.inner.name(),
                        attempt + 1,
                        attempts,
                        err
                    );
                    last_err = Some(err);
                }
            }
        }
        Err(last_err.expect("attempts is always >= 1"))
    }
}
