//! Modo waterfall: amplitud por edge. Cada edge del grafo, tomado en orden
//! topológico de sus beakers de origen, se ejecuta hasta agotar sus
//! registros pendientes antes de pasar al siguiente edge. Dentro de un
//! edge, los registros pendientes se procesan con un pool de workers de
//! concurrencia acotada vía `buffer_unordered`.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tokio::sync::Mutex;

use crate::edge::EdgeOutcome;
use crate::errors::BeakerError;
use crate::pipeline::Pipeline;
use crate::report::RunReport;

/// Cuántos registros de un mismo edge se procesan concurrentemente.
const EDGE_CONCURRENCY: usize = 8;

pub async fn run(
    pipeline: &Pipeline,
    only_beakers: Option<&[String]>,
) -> Result<RunReport, BeakerError> {
    let report = Arc::new(Mutex::new(RunReport::new(
        crate::report::RunMode::Waterfall,
        only_beakers.map(|s| s.to_vec()),
        None,
    )));

    for beaker_name in pipeline.graph().topo_order() {
        if let Some(only) = only_beakers {
            if !only.iter().any(|n| n == &beaker_name) {
                continue;
            }
        }
        let edges: Vec<_> = pipeline.graph().edges_from(&beaker_name).cloned().collect();
        for edge in &edges {
            run_edge(pipeline, edge, &report).await?;
        }
    }

    report.lock().await.finish();
    let report = Arc::try_unwrap(report)
        .map_err(|_| BeakerError::Internal("waterfall report still shared after run".into()))?
        .into_inner();
    Ok(report)
}

async fn run_edge(
    pipeline: &Pipeline,
    edge: &crate::graph::EdgeDecl,
    report: &Arc<Mutex<RunReport>>,
) -> Result<(), BeakerError> {
    let from = pipeline.beaker(&edge.from_beaker)?.clone();
    let runner = pipeline.edge_runner(edge)?.clone();

    let from_ids = from.id_set().await?;
    let already = pipeline.destinations_id_set(edge).await?;
    let pending: Vec<_> = from_ids.difference(&already).copied().collect();

    let skipped = from_ids.len() - pending.len();
    if skipped > 0 {
        log::debug!(
            "waterfall: edge '{}' skips {} already-processed record(s)",
            edge.name,
            skipped
        );
        report.lock().await.record_already_processed(&edge.from_beaker, skipped);
    }

    log::info!(
        "waterfall: edge '{}' ({} -> {:?}) processing {} record(s)",
        edge.name,
        edge.from_beaker,
        edge.to_beakers,
        pending.len()
    );

    // Cada tarea comete su propio resultado antes de que el stream resuelva,
    // para que el fallo de un registro no descarte los destinos ya escritos
    // por sus hermanos de lote.
    let results: Vec<Result<(), BeakerError>> = stream::iter(pending.into_iter().map(|id| {
        let from = from.clone();
        let runner = runner.clone();
        let report = report.clone();
        let from_beaker = edge.from_beaker.clone();
        async move {
            let payload = from
                .get(id)
                .await?
                .ok_or_else(|| BeakerError::ItemNotFound(id.to_string()))?;
            let lineage = pipeline.assemble_lineage(id).await?;
            let outcomes = runner.run(id, payload, &lineage).await?;
            for outcome in outcomes {
                apply_outcome(pipeline, &from_beaker, outcome, &report).await?;
            }
            Ok(())
        }
    }))
    .buffer_unordered(EDGE_CONCURRENCY)
    .collect()
    .await;

    for result in results {
        result?;
    }

    Ok(())
}

pub(crate) async fn apply_outcome(
    pipeline: &Pipeline,
    from_beaker: &str,
    outcome: EdgeOutcome,
    report: &Mutex<RunReport>,
) -> Result<(), BeakerError> {
    match outcome {
        EdgeOutcome::Write {
            destination,
            id,
            payload,
        } => {
            pipeline.beaker(&destination)?.put(id, payload).await?;
            report.lock().await.record(from_beaker, &destination, 1);
        }
        EdgeOutcome::Stop => {}
    }
    Ok(())
}
