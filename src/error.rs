// Error taxonomy for a collection round.

/// Failure talking to the container runtime.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("docker: {0}")]
    Docker(#[from] bollard::errors::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum CollectError {
    /// No runtime client could be created. Fatal to the round.
    #[error("error creating runtime client: {0}")]
    ClientInit(#[source] RuntimeError),
    /// Listing running containers failed. Fatal to the round.
    #[error("error obtaining container listing: {0}")]
    Discovery(#[source] RuntimeError),
    /// Listing succeeded but nothing is running.
    #[error("no running containers returned by the runtime")]
    NoContainers,
    #[error("error obtaining container stats for {id}: {source}")]
    Connection {
        id: String,
        #[source]
        source: RuntimeError,
    },
    #[error("error reading stats stream for {id}: {source}")]
    StreamRead {
        id: String,
        #[source]
        source: std::io::Error,
    },
    #[error("could not decode stats sample for {id}: {source}")]
    Decode {
        id: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("stats stream for {id} ended without a valid sample")]
    NoSample { id: String },
    #[error("collector for {id} stopped without reporting")]
    Aborted { id: String },
    #[error("timed out waiting for stats from {id}")]
    Timeout { id: String },
}

impl CollectError {
    /// Container the error is attributed to, if it is a per-container failure.
    pub fn container_id(&self) -> Option<&str> {
        match self {
            CollectError::Connection { id, .. }
            | CollectError::StreamRead { id, .. }
            | CollectError::Decode { id, .. }
            | CollectError::NoSample { id }
            | CollectError::Aborted { id }
            | CollectError::Timeout { id } => Some(id.as_str()),
            CollectError::ClientInit(_) | CollectError::Discovery(_) | CollectError::NoContainers => {
                None
            }
        }
    }

    /// Whether the error aborts the whole round.
    pub fn is_fatal(&self) -> bool {
        matches!(self, CollectError::ClientInit(_) | CollectError::Discovery(_))
    }
}
