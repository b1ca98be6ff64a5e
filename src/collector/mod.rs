// One collection round: list running containers, fetch a stats sample from
// each concurrently, merge the results.

mod reader;

pub use reader::{StatsMessage, collect_container, decode_stats};

use crate::error::CollectError;
use crate::models::ContainerMetrics;
use crate::runtime::{Connect, ContainerRuntimeClient};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, instrument, warn};

/// Round tuning.
#[derive(Debug, Clone, Copy, Default)]
pub struct RoundOptions {
    /// Deadline for the whole round; containers still pending when it expires
    /// are cancelled and reported as `Timeout`.
    pub timeout: Option<Duration>,
}

/// Outcome of a round that got past discovery.
#[derive(Debug, Default)]
pub struct Round {
    /// Valid samples, at most one per container.
    pub containers: Vec<ContainerMetrics>,
    /// Per-container failures, plus `NoContainers` when nothing was running.
    pub errors: Vec<CollectError>,
}

/// Run one round with a fresh client from `connector`.
///
/// Returns `Err` only when the client cannot be created or the container
/// listing fails; every other failure is reported in `Round::errors`.
#[instrument(skip_all, fields(operation = "collect_round"))]
pub async fn collect_round<C>(connector: &C, options: RoundOptions) -> Result<Round, CollectError>
where
    C: Connect,
{
    let client = connector.connect().map_err(CollectError::ClientInit)?;
    collect_round_with(client, options).await
}

/// Run one round with `client`, which is dropped when the round ends.
pub async fn collect_round_with<C>(client: C, options: RoundOptions) -> Result<Round, CollectError>
where
    C: ContainerRuntimeClient + 'static,
{
    let client = Arc::new(client);
    let containers = client.list_running_containers().await.map_err(|e| {
        warn!(error = %e, operation = "list_running_containers", "container listing failed");
        CollectError::Discovery(e)
    })?;

    let mut round = Round::default();
    if containers.is_empty() {
        debug!("no running containers");
        round.errors.push(CollectError::NoContainers);
        return Ok(round);
    }

    let (tx, mut rx) = mpsc::channel(containers.len());
    let mut pending = HashSet::with_capacity(containers.len());
    let mut tasks = JoinSet::new();
    for c in containers {
        pending.insert(c.id.clone());
        let client = Arc::clone(&client);
        let tx = tx.clone();
        tasks.spawn(async move { collect_container(client.as_ref(), c.id, c.name, tx).await });
    }
    // Only collectors hold senders now, so the channel closes if they all exit.
    drop(tx);

    let drained = match options.timeout {
        Some(limit) => tokio::time::timeout(limit, fan_in(&mut rx, &mut pending, &mut round))
            .await
            .is_ok(),
        None => {
            fan_in(&mut rx, &mut pending, &mut round).await;
            true
        }
    };
    tasks.abort_all();
    if !drained {
        drain_ready(&mut rx, &mut pending, &mut round);
    }

    let mut unfinished: Vec<String> = pending.into_iter().collect();
    unfinished.sort();
    for id in unfinished {
        warn!(container_id = %id, timed_out = !drained, "container did not report");
        round.errors.push(if drained {
            CollectError::Aborted { id }
        } else {
            CollectError::Timeout { id }
        });
    }

    debug!(
        containers = round.containers.len(),
        errors = round.errors.len(),
        "round complete"
    );
    Ok(round)
}

/// Drain `rx` until every container in `pending` has sent its terminal
/// message, or all senders are gone.
async fn fan_in(
    rx: &mut mpsc::Receiver<StatsMessage>,
    pending: &mut HashSet<String>,
    round: &mut Round,
) {
    while !pending.is_empty() {
        let Some(message) = rx.recv().await else {
            return;
        };
        accept(message, pending, round);
    }
}

/// Take messages already queued when the deadline expired.
fn drain_ready(
    rx: &mut mpsc::Receiver<StatsMessage>,
    pending: &mut HashSet<String>,
    round: &mut Round,
) {
    while !pending.is_empty() {
        let Ok(message) = rx.try_recv() else {
            return;
        };
        accept(message, pending, round);
    }
}

fn accept(message: StatsMessage, pending: &mut HashSet<String>, round: &mut Round) {
    let StatsMessage {
        mut metrics,
        terminal,
    } = message;
    if !pending.contains(&metrics.id) {
        warn!(container_id = %metrics.id, "dropping stats for a container that already reported");
        return;
    }
    if terminal {
        pending.remove(&metrics.id);
    }
    match metrics.error.take() {
        Some(e) => round.errors.push(e),
        None => round.containers.push(metrics),
    }
}
