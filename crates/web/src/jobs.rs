//! Background work: streaming generation jobs and the session sweep.
//!
//! A streaming job runs the generator on a blocking thread. Its observer
//! pushes progress into an unbounded channel so the worker never waits on
//! delivery; a forwarder task publishes each update through the notifier,
//! then the terminal event follows once the forwarder has drained.

use std::ops::ControlFlow;
use std::sync::Arc;

use netmotif_core::{ErrorKind, Result as CoreResult, ResultExt};
use netmotif_events::{JobTicket, ProgressNotifier, SessionId};
use netmotif_graph::{
    DirectedGraph, GeneratorConfig, GraphData, GraphGenerator, MetricsReport, Progress,
    compute_metrics,
};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::config::JobsConfig;

/// Register a job in `session_id` and start it in the background.
///
/// The job is registered before this returns, so a later request for the
/// same session always supersedes it.
pub async fn start_generation(
    notifier: Arc<ProgressNotifier>,
    session_id: SessionId,
    original: DirectedGraph,
    config: GeneratorConfig,
) -> JoinHandle<()> {
    let generator = GraphGenerator::new(config);
    let total = generator.target_edge_count(original.node_count(), original.edge_count());
    let ticket = notifier.begin_job(&session_id, total).await;

    tokio::spawn(run_generation(notifier, ticket, generator, original))
}

async fn run_generation(
    notifier: Arc<ProgressNotifier>,
    ticket: JobTicket,
    generator: GraphGenerator,
    original: DirectedGraph,
) {
    let (tx, mut rx) = mpsc::unbounded_channel::<Progress>();
    let forwarder = {
        let notifier = Arc::clone(&notifier);
        let ticket = ticket.clone();
        tokio::spawn(async move {
            while let Some(progress) = rx.recv().await {
                notifier.publish_progress(&ticket, progress).await;
            }
        })
    };

    let worker_ticket = ticket.clone();
    let outcome = tokio::task::spawn_blocking(move || {
        let mut observer = |progress: Progress| -> ControlFlow<()> {
            if worker_ticket.is_cancelled() || tx.send(progress).is_err() {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        };
        generate_with_metrics(&generator, &original, &mut observer)
    })
    .await;

    if let Err(e) = forwarder.await {
        warn!(session_id = %ticket.session_id(), "Progress forwarder failed: {}", e);
    }

    match outcome {
        Ok(Ok((graph, metrics))) => {
            notifier.complete(&ticket, graph, metrics).await;
        }
        Ok(Err(netmotif_core::Error::Cancelled)) if ticket.is_cancelled() => {
            debug!(session_id = %ticket.session_id(), epoch = ticket.epoch(), "Superseded job stopped");
        }
        Ok(Err(e)) => {
            notifier.fail(&ticket, e.to_string()).await;
        }
        Err(e) => {
            error!(session_id = %ticket.session_id(), "Generation worker panicked or was aborted: {}", e);
            notifier
                .fail(&ticket, format!("generation worker failed: {e}"))
                .await;
        }
    }
}

/// Generate a graph and compute its metrics; used by both generation modes.
///
/// # Errors
///
/// Propagates generator errors.
pub fn generate_with_metrics<O>(
    generator: &GraphGenerator,
    original: &DirectedGraph,
    observer: &mut O,
) -> CoreResult<(GraphData, MetricsReport)>
where
    O: netmotif_graph::ProgressObserver + ?Sized,
{
    let generated = generator.generate(original, observer).inspect_error(|e| {
        if e.kind() == ErrorKind::Cancelled {
            debug!("Generation cancelled by its observer");
        } else {
            error!(kind = ?e.kind(), "Graph generation failed: {}", e);
        }
    })?;
    let metrics = compute_metrics(&generated);
    Ok((GraphData::from(&generated), metrics))
}

/// Periodically remove idle sessions.
pub fn spawn_session_sweeper(
    notifier: Arc<ProgressNotifier>,
    config: &JobsConfig,
) -> JoinHandle<()> {
    let ttl = config.session_ttl();
    let period = config.sweep_interval();
    info!(ttl_secs = ttl.as_secs(), every_secs = period.as_secs(), "Starting session sweeper");

    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            let removed = notifier.sweep_expired(ttl).await;
            if removed > 0 {
                info!(removed, "Expired sessions removed");
            }
        }
    })
}
