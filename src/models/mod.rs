// Domain models

mod container;

pub use container::{ContainerMetrics, CpuStats, CpuUsage, MemoryStats, NetworkInterfaceStats};
