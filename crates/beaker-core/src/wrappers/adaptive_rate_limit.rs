//! Limitador de tasa que se ajusta solo: retrocede (`back_off_rate`)
//! cuando el edge interno falla con uno de `timeout_classes`, y acelera
//! tras `speed_up_after` éxitos consecutivos.

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tokio::sync::Mutex;

use crate::edge::{EdgeError, EdgeOutcome, EdgeRunner};
use crate::errors::BeakerError;
use crate::model::Lineage;
use crate::record::RecordId;

struct AdaptiveState {
    delay: Duration,
    consecutive_successes: u32,
}

pub struct AdaptiveRateLimit {
    inner: Box<dyn EdgeRunner>,
    timeout_classes: Vec<&'static str>,
    back_off_rate: f64,
    speed_up_after: u32,
    /// El delay configurado al construirse: el tope de velocidad original.
    /// Acelerar nunca baja el delay por debajo de este valor.
    floor_delay: Duration,
    max_delay: Duration,
    state: Mutex<AdaptiveState>,
}

impl AdaptiveRateLimit {
    pub fn new(
        inner: Box<dyn EdgeRunner>,
        initial_delay: Duration,
        timeout_classes: Vec<&'static str>,
        back_off_rate: f64,
        speed_up_after: u32,
    ) -> Self {
        assert!(back_off_rate > 1.0, "back_off_rate must slow things down");
        Self {
            inner,
            timeout_classes,
            back_off_rate,
            speed_up_after,
            floor_delay: initial_delay,
            max_delay: Duration::from_secs(60),
            state: Mutex::new(AdaptiveState {
                delay: initial_delay,
                consecutive_successes: 0,
            }),
        }
    }
}

#[async_trait]
impl EdgeRunner for AdaptiveRateLimit {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn run(
        &self,
        id: RecordId,
        payload: Value,
        lineage: &Lineage,
    ) -> Result<Vec<EdgeOutcome>, BeakerError> {
        let delay = self.state.lock().await.delay;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let result = self.inner.run(id, payload, lineage).await;
        let mut state = self.state.lock().await;
        match &result {
            Err(err) if self.timeout_classes.contains(&err.class_name()) => {
                state.consecutive_successes = 0;
                state.delay = state.delay.mul_f64(self.back_off_rate).min(self.max_delay);
            }
            _ => {
                state.consecutive_successes += 1;
                if state.consecutive_successes >= self.speed_up_after && state.delay > self.floor_delay {
                    state.consecutive_successes = 0;
                    state.delay = state.delay.div_f64(self.back_off_rate).max(self.floor_delay);
                }
            }
        }
        result
    }
}
