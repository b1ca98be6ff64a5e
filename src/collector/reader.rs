// Stats stream decoding and the per-container collector task.

use crate::error::CollectError;
use crate::models::ContainerMetrics;
use crate::runtime::ContainerRuntimeClient;
use futures_util::io::{AsyncBufRead, AsyncBufReadExt};
use futures_util::{Stream, StreamExt, stream};
use std::pin::pin;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// A record on the round's shared channel. `terminal` marks the last message
/// a collector sends for its container.
#[derive(Debug)]
pub struct StatsMessage {
    pub metrics: ContainerMetrics,
    pub terminal: bool,
}

struct DecodeState<R> {
    reader: R,
    line: Vec<u8>,
    id: String,
    name: String,
    done: bool,
}

/// Decode a newline-delimited JSON stats feed into records stamped with
/// `id`/`name`, one per non-blank line, as they arrive.
///
/// A line that fails to decode yields an error record and decoding goes on.
/// A read error yields one error record and ends the sequence.
pub fn decode_stats<R>(reader: R, id: String, name: String) -> impl Stream<Item = ContainerMetrics>
where
    R: AsyncBufRead + Unpin,
{
    let state = DecodeState {
        reader,
        line: Vec::new(),
        id,
        name,
        done: false,
    };
    stream::unfold(state, |mut st| async move {
        if st.done {
            return None;
        }
        loop {
            st.line.clear();
            match st.reader.read_until(b'\n', &mut st.line).await {
                Ok(0) => return None,
                Ok(_) => {
                    let line = st.line.trim_ascii();
                    if line.is_empty() {
                        continue;
                    }
                    let metrics = decode_line(line, &st.id, &st.name);
                    return Some((metrics, st));
                }
                Err(source) => {
                    st.done = true;
                    let error = CollectError::StreamRead {
                        id: st.id.clone(),
                        source,
                    };
                    let metrics = ContainerMetrics::failed(&st.id, &st.name, error);
                    return Some((metrics, st));
                }
            }
        }
    })
}

// Raw bytes: a line that is not UTF-8 is a decode failure, not a read error.
fn decode_line(line: &[u8], id: &str, name: &str) -> ContainerMetrics {
    match serde_json::from_slice::<ContainerMetrics>(line) {
        Ok(mut metrics) => {
            metrics.id = id.to_string();
            metrics.name = name.to_string();
            metrics
        }
        Err(source) => ContainerMetrics::failed(
            id,
            name,
            CollectError::Decode {
                id: id.to_string(),
                source,
            },
        ),
    }
}

/// Collect one sample for a container and publish it on `tx`.
///
/// Always sends at least one message and exactly one terminal message: the
/// first valid sample, the open/read failure, or `NoSample` when the stream
/// ends without a valid sample. Decode failures before that are sent as
/// non-terminal error records.
pub async fn collect_container<C>(
    client: &C,
    id: String,
    name: String,
    tx: mpsc::Sender<StatsMessage>,
) where
    C: ContainerRuntimeClient,
{
    let stream = match client.open_stats_stream(&id).await {
        Ok(s) => s,
        Err(source) => {
            warn!(container_id = %id, error = %source, "failed to open stats stream");
            let metrics = ContainerMetrics::failed(
                &id,
                &name,
                CollectError::Connection {
                    id: id.clone(),
                    source,
                },
            );
            let _ = tx.send(StatsMessage { metrics, terminal: true }).await;
            return;
        }
    };

    let mut samples = pin!(decode_stats(stream, id.clone(), name.clone()));
    while let Some(metrics) = samples.next().await {
        let terminal = !matches!(metrics.error, Some(CollectError::Decode { .. }));
        if let Some(e) = &metrics.error {
            warn!(container_id = %id, error = %e, "stats sample failed");
        } else {
            debug!(container_id = %id, container_name = %name, "stats sample decoded");
        }
        // Receiver gone means the round was cancelled.
        if tx.send(StatsMessage { metrics, terminal }).await.is_err() || terminal {
            return;
        }
    }

    warn!(container_id = %id, "stats stream ended without a valid sample");
    let metrics = ContainerMetrics::failed(&id, &name, CollectError::NoSample { id: id.clone() });
    let _ = tx.send(StatsMessage { metrics, terminal: true }).await;
}
