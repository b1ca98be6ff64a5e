// Per-container stats sample, decoded from the Docker stats API.

use crate::error::CollectError;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

/// Treat an explicit JSON `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Counters for one network interface inside the container.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkInterfaceStats {
    pub rx_bytes: u64,
    pub rx_dropped: u64,
    pub rx_errors: u64,
    pub rx_packets: u64,
    pub tx_bytes: u64,
    pub tx_dropped: u64,
    pub tx_errors: u64,
    pub tx_packets: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryStats {
    pub usage: u64,
    pub limit: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CpuUsage {
    /// Per-core usage, indexed by core number. Empty on cgroup v2 hosts.
    #[serde(deserialize_with = "null_as_default")]
    pub percpu_usage: Vec<u64>,
    pub usage_in_usermode: u64,
    pub total_usage: u64,
    pub usage_in_kernelmode: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CpuStats {
    #[serde(deserialize_with = "null_as_default")]
    pub cpu_usage: CpuUsage,
    pub system_cpu_usage: u64,
}

/// One raw stats sample for a container, or the reason none could be taken.
///
/// When `error` is set the numeric fields carry no meaning and must not be
/// reported. `id` and `name` are never part of the wire payload; the collector
/// stamps them on every record it publishes, including error records.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerMetrics {
    #[serde(skip_deserializing)]
    pub id: String,
    #[serde(skip_deserializing)]
    pub name: String,
    #[serde(skip)]
    pub error: Option<CollectError>,
    #[serde(rename = "networks", deserialize_with = "null_as_default")]
    pub network_interfaces: HashMap<String, NetworkInterfaceStats>,
    #[serde(rename = "memory_stats", deserialize_with = "null_as_default")]
    pub memory: MemoryStats,
    #[serde(rename = "cpu_stats", deserialize_with = "null_as_default")]
    pub cpu: CpuStats,
    #[serde(rename = "precpu_stats", deserialize_with = "null_as_default")]
    pub previous_cpu: CpuStats,
}

impl ContainerMetrics {
    /// An empty record for `id`/`name` that carries only `error`.
    pub fn failed(id: &str, name: &str, error: CollectError) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            error: Some(error),
            ..Default::default()
        }
    }
}
