//! Records produced by the metric provider and the per-tick Snapshot built from them.

use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MemoryStat {
    pub used_percent: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DiskUsage {
    pub total: u64,
    pub used: u64,
    pub free: u64,
    pub used_percent: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HostInfo {
    pub hostname: String,
    pub platform: String,
    pub uptime_secs: u64,
}

/// Cumulative byte counters since boot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct NetCounters {
    pub bytes_sent: u64,
    pub bytes_recv: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessEntry {
    pub pid: i32,
    pub user: String,
    pub cpu_percent: f64,
    pub mem_percent: f32,
    pub command: String,
}

/// Name and first address of the interface shown in the network panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceInfo {
    pub name: String,
    pub local_ip: String,
}

impl Default for InterfaceInfo {
    fn default() -> Self {
        Self {
            name: "N/A".into(),
            local_ip: "N/A".into(),
        }
    }
}

/// One tick's worth of sampled metrics. Never mutated after the sampler returns it.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub taken_at: DateTime<Utc>,
    pub cpu_per_core: Vec<f64>,
    pub memory: MemoryStat,
    pub disk: DiskUsage,
    pub network: NetCounters,
    pub host: HostInfo,
    pub processes: Vec<ProcessEntry>,
}

impl Snapshot {
    /// Snapshot used before any provider read has succeeded.
    pub fn empty(taken_at: DateTime<Utc>) -> Self {
        Self {
            taken_at,
            cpu_per_core: Vec::new(),
            memory: MemoryStat::default(),
            disk: DiskUsage::default(),
            network: NetCounters::default(),
            host: HostInfo::default(),
            processes: Vec::new(),
        }
    }

    /// Mean of the per-core readings, 0 when no cores were reported.
    pub fn cpu_average(&self) -> f64 {
        if self.cpu_per_core.is_empty() {
            return 0.0;
        }
        self.cpu_per_core.iter().sum::<f64>() / self.cpu_per_core.len() as f64
    }
}
