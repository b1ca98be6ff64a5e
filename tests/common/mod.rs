// Shared test helpers: a scripted in-memory container runtime.
#![allow(dead_code)]

use container_stats::error::RuntimeError;
use container_stats::runtime::{Connect, ContainerRuntimeClient, RunningContainer, StatsStream};
use futures_util::{TryStreamExt, stream};
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

pub const SAMPLE: &str = r#"{"read":"2024-05-01T10:00:00Z","networks":{"eth0":{"rx_bytes":1500,"rx_dropped":1,"rx_errors":2,"rx_packets":30,"tx_bytes":900,"tx_dropped":3,"tx_errors":4,"tx_packets":12},"eth1":{"rx_bytes":5,"rx_dropped":0,"rx_errors":0,"rx_packets":1,"tx_bytes":6,"tx_dropped":0,"tx_errors":0,"tx_packets":1}},"memory_stats":{"usage":10485760,"limit":2147483648},"cpu_stats":{"cpu_usage":{"percpu_usage":[111,222,333],"usage_in_usermode":400,"total_usage":666,"usage_in_kernelmode":200},"system_cpu_usage":99000},"precpu_stats":{"cpu_usage":{"percpu_usage":[100,200,300],"usage_in_usermode":350,"total_usage":600,"usage_in_kernelmode":180},"system_cpu_usage":98000}}"#;

/// A sample whose only distinguishing value is the memory usage.
pub fn sample_with_usage(usage: u64) -> String {
    format!(r#"{{"memory_stats":{{"usage":{usage},"limit":1024}}}}"#)
}

#[derive(Debug, Clone)]
pub enum Behavior {
    /// Stream yields these bytes, then ends.
    Payload(String),
    OpenFails,
    /// Stream yields these bytes, then fails with a read error.
    ReadFailsAfter(String),
    Panic,
    Hang,
}

#[derive(Debug, Clone)]
pub struct FakeContainer {
    pub id: String,
    pub name: String,
    pub delay: Duration,
    pub behavior: Behavior,
}

impl FakeContainer {
    pub fn new(id: &str, behavior: Behavior) -> Self {
        Self {
            id: id.to_string(),
            name: format!("{id}-name"),
            delay: Duration::ZERO,
            behavior,
        }
    }

    pub fn healthy(id: &str) -> Self {
        Self::new(id, Behavior::Payload(format!("{SAMPLE}\n")))
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct FakeRuntime {
    pub containers: Vec<FakeContainer>,
    pub list_fails: bool,
    pub opened: Arc<AtomicUsize>,
}

impl FakeRuntime {
    pub fn new(containers: Vec<FakeContainer>) -> Self {
        Self {
            containers,
            ..Default::default()
        }
    }

    pub fn failing_discovery() -> Self {
        Self {
            list_fails: true,
            ..Default::default()
        }
    }

    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }
}

impl ContainerRuntimeClient for FakeRuntime {
    async fn list_running_containers(&self) -> Result<Vec<RunningContainer>, RuntimeError> {
        if self.list_fails {
            return Err(io::Error::new(io::ErrorKind::ConnectionRefused, "daemon down").into());
        }
        Ok(self
            .containers
            .iter()
            .map(|c| RunningContainer {
                id: c.id.clone(),
                name: c.name.clone(),
            })
            .collect())
    }

    async fn open_stats_stream(&self, id: &str) -> Result<StatsStream, RuntimeError> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        let container = self
            .containers
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such container"))?;
        tokio::time::sleep(container.delay).await;
        match container.behavior {
            Behavior::Payload(bytes) => Ok(Box::pin(futures_util::io::Cursor::new(
                bytes.into_bytes(),
            ))),
            Behavior::OpenFails => {
                Err(io::Error::new(io::ErrorKind::ConnectionRefused, "stats refused").into())
            }
            Behavior::ReadFailsAfter(bytes) => {
                let chunks: Vec<io::Result<Vec<u8>>> = vec![
                    Ok(bytes.into_bytes()),
                    Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset")),
                ];
                Ok(Box::pin(stream::iter(chunks).into_async_read()))
            }
            Behavior::Panic => panic!("collector crashed for {id}"),
            Behavior::Hang => std::future::pending().await,
        }
    }
}

/// Hands out clones of one `FakeRuntime`, or fails to connect.
#[derive(Debug, Clone, Default)]
pub struct FakeConnector {
    pub runtime: FakeRuntime,
    pub fail_connect: bool,
}

impl FakeConnector {
    pub fn new(runtime: FakeRuntime) -> Self {
        Self {
            runtime,
            fail_connect: false,
        }
    }
}

impl Connect for FakeConnector {
    type Client = FakeRuntime;

    fn connect(&self) -> Result<FakeRuntime, RuntimeError> {
        if self.fail_connect {
            return Err(io::Error::new(io::ErrorKind::NotFound, "no docker socket").into());
        }
        Ok(self.runtime.clone())
    }
}
