//! Metric provider seam and its sysinfo-backed implementation.

use std::path::{Path, PathBuf};

use sysinfo::{
    CpuRefreshKind, Disks, MemoryRefreshKind, Networks, ProcessRefreshKind, ProcessesToUpdate,
    RefreshKind, System, UpdateKind, Users,
};

use crate::types::{DiskUsage, HostInfo, InterfaceInfo, MemoryStat, NetCounters, ProcessEntry};

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("{0} unavailable")]
    Unavailable(&'static str),
    #[error("no disk mounted at {}", .0.display())]
    NoDisk(PathBuf),
    #[error("provider panicked while reading {0}")]
    Panicked(&'static str),
}

/// Synchronous pull interface. Every call may fail on its own; callers decide how to degrade.
pub trait MetricProvider: Send {
    fn cpu_percents(&mut self) -> Result<Vec<f64>, ProviderError>;
    fn memory(&mut self) -> Result<MemoryStat, ProviderError>;
    fn disk(&mut self, path: &Path) -> Result<DiskUsage, ProviderError>;
    fn host(&mut self) -> Result<HostInfo, ProviderError>;
    fn net_counters(&mut self) -> Result<NetCounters, ProviderError>;
    fn processes(&mut self) -> Result<Vec<ProcessEntry>, ProviderError>;

    fn primary_interface(&mut self) -> Result<InterfaceInfo, ProviderError> {
        Err(ProviderError::Unavailable("interfaces"))
    }
}

/// Keeps the sysinfo handles alive between ticks so CPU and process deltas work.
pub struct SysinfoProvider {
    sys: System,
    disks: Disks,
    networks: Networks,
    users: Users,
}

impl SysinfoProvider {
    pub fn new() -> Self {
        let refresh_kind = RefreshKind::nothing()
            .with_cpu(CpuRefreshKind::nothing().with_cpu_usage())
            .with_memory(MemoryRefreshKind::nothing().with_ram());
        Self {
            sys: System::new_with_specifics(refresh_kind),
            disks: Disks::new_with_refreshed_list(),
            networks: Networks::new_with_refreshed_list(),
            users: Users::new_with_refreshed_list(),
        }
    }
}

impl Default for SysinfoProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricProvider for SysinfoProvider {
    fn cpu_percents(&mut self) -> Result<Vec<f64>, ProviderError> {
        self.sys.refresh_cpu_usage();
        let cores: Vec<f64> = self
            .sys
            .cpus()
            .iter()
            .map(|c| c.cpu_usage() as f64)
            .collect();
        if cores.is_empty() {
            return Err(ProviderError::Unavailable("cpu"));
        }
        Ok(cores)
    }

    fn memory(&mut self) -> Result<MemoryStat, ProviderError> {
        self.sys.refresh_memory();
        let total = self.sys.total_memory();
        if total == 0 {
            return Err(ProviderError::Unavailable("memory"));
        }
        let used = total.saturating_sub(self.sys.available_memory());
        Ok(MemoryStat {
            used_percent: used as f64 / total as f64 * 100.0,
        })
    }

    fn disk(&mut self, path: &Path) -> Result<DiskUsage, ProviderError> {
        self.disks.refresh(false);
        // Longest mount point that is a prefix of `path`, so "/" loses to "/home" for /home/x.
        let disk = self
            .disks
            .iter()
            .filter(|d| path.starts_with(d.mount_point()))
            .max_by_key(|d| d.mount_point().as_os_str().len())
            .ok_or_else(|| ProviderError::NoDisk(path.to_path_buf()))?;
        let total = disk.total_space();
        let free = disk.available_space();
        let used = total.saturating_sub(free);
        let used_percent = if total > 0 {
            used as f64 / total as f64 * 100.0
        } else {
            0.0
        };
        Ok(DiskUsage {
            total,
            used,
            free,
            used_percent,
        })
    }

    fn host(&mut self) -> Result<HostInfo, ProviderError> {
        let hostname = System::host_name().ok_or(ProviderError::Unavailable("hostname"))?;
        let platform = System::long_os_version()
            .or_else(System::name)
            .unwrap_or_else(|| std::env::consts::OS.to_string());
        Ok(HostInfo {
            hostname,
            platform,
            uptime_secs: System::uptime(),
        })
    }

    fn net_counters(&mut self) -> Result<NetCounters, ProviderError> {
        self.networks.refresh(true);
        if self.networks.is_empty() {
            return Err(ProviderError::Unavailable("network"));
        }
        // Single aggregate across interfaces, the same shape a non-per-NIC counter read returns.
        let mut totals = NetCounters::default();
        for (_, data) in self.networks.iter() {
            totals.bytes_recv = totals.bytes_recv.saturating_add(data.total_received());
            totals.bytes_sent = totals.bytes_sent.saturating_add(data.total_transmitted());
        }
        Ok(totals)
    }

    fn processes(&mut self) -> Result<Vec<ProcessEntry>, ProviderError> {
        self.sys.refresh_processes_specifics(
            ProcessesToUpdate::All,
            true,
            ProcessRefreshKind::nothing()
                .with_cpu()
                .with_memory()
                .with_user(UpdateKind::OnlyIfNotSet),
        );
        if self.sys.total_memory() == 0 {
            self.sys.refresh_memory();
        }
        let total_mem = self.sys.total_memory().max(1) as f64;

        let mut procs: Vec<ProcessEntry> = self
            .sys
            .processes()
            .values()
            .map(|p| {
                let user = p
                    .user_id()
                    .and_then(|uid| self.users.get_user_by_id(uid))
                    .map(|u| u.name().to_string())
                    .unwrap_or_default();
                ProcessEntry {
                    pid: p.pid().as_u32() as i32,
                    user,
                    cpu_percent: p.cpu_usage() as f64,
                    mem_percent: (p.memory() as f64 / total_mem * 100.0) as f32,
                    command: p.name().to_string_lossy().into_owned(),
                }
            })
            .collect();
        if procs.is_empty() {
            return Err(ProviderError::Unavailable("processes"));
        }
        // HashMap iteration order is arbitrary; pid order gives ranking ties a stable base.
        procs.sort_by_key(|p| p.pid);
        Ok(procs)
    }

    fn primary_interface(&mut self) -> Result<InterfaceInfo, ProviderError> {
        self.networks.refresh(true);
        let mut names: Vec<&String> = self.networks.keys().collect();
        names.sort();
        for name in names {
            let Some(data) = self.networks.get(name) else {
                continue;
            };
            let addr = data
                .ip_networks()
                .iter()
                .map(|n| n.addr)
                .find(|a| !a.is_loopback());
            if let Some(addr) = addr {
                return Ok(InterfaceInfo {
                    name: name.clone(),
                    local_ip: addr.to_string(),
                });
            }
        }
        Err(ProviderError::Unavailable("interfaces"))
    }
}
