//! Modo river: profundidad por registro. Cada registro de partida se
//! empuja tan lejos como sea posible a través del grafo, en paralelo con
//! los demás registros de partida, antes de que el siguiente arranque.
//! Cada nivel de fan-out recursivo se espera con una barrera conjunta.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::Mutex;

use crate::edge::EdgeOutcome;
use crate::errors::BeakerError;
use crate::graph::EdgeDecl;
use crate::pipeline::Pipeline;
use crate::record::RecordId;
use crate::report::RunReport;
use crate::runner::waterfall::apply_outcome;

pub async fn run(pipeline: &Pipeline, start_beaker: &str) -> Result<RunReport, BeakerError> {
    let report = Arc::new(Mutex::new(RunReport::new(
        crate::report::RunMode::River,
        None,
        Some(start_beaker.to_string()),
    )));
    let ids: Vec<RecordId> = pipeline
        .beaker(start_beaker)?
        .id_set()
        .await?
        .into_iter()
        .collect();

    log::info!(
        "river: starting {} record(s) from beaker '{}'",
        ids.len(),
        start_beaker
    );

    let tasks = ids
        .into_iter()
        .map(|id| run_one_item(pipeline, start_beaker.to_string(), id, report.clone()));
    let results = join_all(tasks).await;
    for result in results {
        result?;
    }

    report.lock().await.finish();
    let report = Arc::try_unwrap(report)
        .map_err(|_| BeakerError::Internal("river report still shared after join".into()))?
        .into_inner();
    Ok(report)
}

/// Empuja un único registro a través de todos los edges salientes de
/// `beaker_name`, recursando en cada destino. Implementado como función
/// boxed porque la recursión async directa no tiene tamaño conocido en
/// tiempo de compilación.
fn run_one_item<'a>(
    pipeline: &'a Pipeline,
    beaker_name: String,
    id: RecordId,
    report: Arc<Mutex<RunReport>>,
) -> Pin<Box<dyn Future<Output = Result<(), BeakerError>> + Send + 'a>> {
    Box::pin(async move {
        let edges: Vec<EdgeDecl> = pipeline.graph().edges_from(&beaker_name).cloned().collect();

        let branches = edges.iter().map(|edge| {
            let report = report.clone();
            let beaker_name = beaker_name.clone();
            async move { run_edge_for_item(pipeline, edge, &beaker_name, id, report).await }
        });

        for result in join_all(branches).await {
            result?;
        }
        Ok(())
    })
}

async fn run_edge_for_item(
    pipeline: &Pipeline,
    edge: &EdgeDecl,
    from_beaker: &str,
    id: RecordId,
    report: Arc<Mutex<RunReport>>,
) -> Result<(), BeakerError> {
    let already = pipeline.destinations_id_set(edge).await?;
    if already.contains(&id) {
        report.lock().await.record_already_processed(from_beaker, 1);
        return Ok(());
    }

    let payload = pipeline
        .beaker(from_beaker)?
        .get(id)
        .await?
        .ok_or_else(|| BeakerError::ItemNotFound(id.to_string()))?;
    let lineage = pipeline.assemble_lineage(id).await?;
    let outcomes = pipeline.edge_runner(edge)?.run(id, payload, &lineage).await?;

    let mut next_steps = Vec::new();
    for outcome in outcomes {
        match outcome {
            EdgeOutcome::Write {
                destination,
                id: next_id,
                payload,
            } => {
                apply_outcome(
                    pipeline,
                    from_beaker,
                    EdgeOutcome::Write {
                        destination: destination.clone(),
                        id: next_id,
                        payload,
                    },
                    &report,
                )
                .await?;
                next_steps.push((destination, next_id));
            }
            EdgeOutcome::Stop => {}
        }
    }

    let recurse = next_steps
        .into_iter()
        .map(|(destination, next_id)| run_one_item(pipeline, destination, next_id, report.clone()));
    for result in join_all(recurse).await {
        result?;
    }
    Ok(())
}
