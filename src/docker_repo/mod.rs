// Docker runtime client via bollard

mod stats;

use crate::error::RuntimeError;
use crate::runtime::{Connect, ContainerRuntimeClient, RunningContainer, StatsStream};
use bollard::Docker;
use bollard::query_parameters::{ListContainersOptions, StatsOptions};
use futures_util::{StreamExt, TryStreamExt, stream};
use std::collections::HashMap;

/// Connects to the local Docker daemon (honours `DOCKER_HOST`).
#[derive(Debug, Clone, Copy, Default)]
pub struct DockerConnector;

impl Connect for DockerConnector {
    type Client = DockerRepo;

    fn connect(&self) -> Result<DockerRepo, RuntimeError> {
        DockerRepo::connect()
    }
}

pub struct DockerRepo {
    docker: Docker,
}

impl DockerRepo {
    pub fn connect() -> Result<Self, RuntimeError> {
        let docker = Docker::connect_with_local_defaults()?;
        Ok(Self { docker })
    }
}

impl ContainerRuntimeClient for DockerRepo {
    async fn list_running_containers(&self) -> Result<Vec<RunningContainer>, RuntimeError> {
        let mut filters = HashMap::new();
        filters.insert("status".to_string(), vec!["running".to_string()]);

        let filter = ListContainersOptions {
            all: false,
            filters: Some(filters),
            ..Default::default()
        };

        let containers = self.docker.list_containers(Some(filter)).await?;
        Ok(containers
            .into_iter()
            .filter_map(|c| {
                let id = c.id?;
                Some(RunningContainer::from_names(id, c.names.as_deref()))
            })
            .collect())
    }

    async fn open_stats_stream(&self, id: &str) -> Result<StatsStream, RuntimeError> {
        let options = StatsOptions {
            stream: false,
            ..Default::default()
        };
        let mut frames = self.docker.stats(id, Some(options));

        // bollard only issues the request on first poll; pull the first frame
        // here so a refused request is reported as an open failure.
        let first = match frames.next().await {
            Some(Ok(frame)) => frame,
            Some(Err(e)) => return Err(e.into()),
            None => return Ok(Box::pin(futures_util::io::empty())),
        };

        let lines = stream::iter(Some(Ok(first)))
            .chain(frames)
            .map_err(std::io::Error::other)
            .and_then(|frame| futures_util::future::ready(stats::encode_frame(&frame)));
        Ok(Box::pin(lines.into_async_read()))
    }
}
