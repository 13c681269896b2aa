//! Estrategias de recorrido del grafo: waterfall (amplitud por edge) y
//! river (profundidad por registro).

mod river;
mod waterfall;

use crate::errors::BeakerError;
use crate::pipeline::Pipeline;
use crate::report::{RunMode, RunReport};

/// Corre el grafo completo en modo waterfall, opcionalmente restringido a
/// un subconjunto de beakers de origen (equivalente a `only_beakers` en el
/// `RunReport` original).
pub async fn run_waterfall(
    pipeline: &Pipeline,
    only_beakers: Option<&[String]>,
) -> Result<RunReport, BeakerError> {
    waterfall::run(pipeline, only_beakers).await
}

/// Corre en modo river a partir de los registros actualmente presentes en
/// `start_beaker`.
pub async fn run_river(pipeline: &Pipeline, start_beaker: &str) -> Result<RunReport, BeakerError> {
    river::run(pipeline, start_beaker).await
}

/// Despacha según el modo solicitado. `start_beaker` sólo se usa en modo
/// river; en waterfall el recorrido siempre cubre el grafo completo (o
/// `only_beakers` si se especifica).
pub async fn run(
    pipeline: &Pipeline,
    mode: RunMode,
    start_beaker: Option<&str>,
    only_beakers: Option<&[String]>,
) -> Result<RunReport, BeakerError> {
    match mode {
        RunMode::Waterfall => run_waterfall(pipeline, only_beakers).await,
        RunMode::River => {
            let start = start_beaker.ok_or_else(|| {
                BeakerError::Internal("river mode requires a start beaker".to_string())
            })?;
            run_river(pipeline, start).await
        }
    }
}
