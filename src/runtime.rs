// Capabilities the collector needs from a container runtime.

use crate::error::RuntimeError;
use futures_util::io::AsyncBufRead;
use std::future::Future;
use std::pin::Pin;

/// Newline-delimited JSON stats feed for one container.
pub type StatsStream = Pin<Box<dyn AsyncBufRead + Send>>;

/// A running container as reported by the runtime's listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunningContainer {
    pub id: String,
    pub name: String,
}

impl RunningContainer {
    /// Build from the runtime's id and reported names. Docker prefixes names
    /// with `/`; the first name is used, falling back to the id.
    pub fn from_names(id: String, names: Option<&[String]>) -> Self {
        let name = names
            .and_then(|n| n.first())
            .map(|n| n.trim_start_matches('/').to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| id.clone());
        Self { id, name }
    }
}

/// Client used for the duration of one collection round. Calls are issued
/// concurrently from every per-container collector, so implementations must
/// not rely on per-call mutable state.
pub trait ContainerRuntimeClient: Send + Sync {
    /// Containers currently in the running state. Stopped containers are
    /// excluded: the stats endpoint returns nothing useful for them.
    fn list_running_containers(
        &self,
    ) -> impl Future<Output = Result<Vec<RunningContainer>, RuntimeError>> + Send;

    fn open_stats_stream(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<StatsStream, RuntimeError>> + Send;
}

/// Creates a fresh client at the start of each round.
pub trait Connect: Send + Sync {
    type Client: ContainerRuntimeClient + 'static;

    fn connect(&self) -> Result<Self::Client, RuntimeError>;
}
