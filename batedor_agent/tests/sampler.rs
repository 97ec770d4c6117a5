//! Sampler degradation: a failing category keeps its previous value.
use std::path::Path;

use batedor_agent::provider::{MetricProvider, ProviderError};
use batedor_agent::sampler::Sampler;
use batedor_agent::types::{DiskUsage, HostInfo, MemoryStat, NetCounters, ProcessEntry};

#[derive(Default)]
struct Scripted {
    tick: u32,
    fail_memory: bool,
    panic_disk: bool,
    empty_cpu: bool,
}

impl MetricProvider for Scripted {
    fn cpu_percents(&mut self) -> Result<Vec<f64>, ProviderError> {
        self.tick += 1;
        if self.empty_cpu {
            return Ok(Vec::new());
        }
        Ok(vec![self.tick as f64, 2.0 * self.tick as f64])
    }

    fn memory(&mut self) -> Result<MemoryStat, ProviderError> {
        if self.fail_memory {
            return Err(ProviderError::Unavailable("memory"));
        }
        Ok(MemoryStat {
            used_percent: 10.0 * self.tick as f64,
        })
    }

    fn disk(&mut self, _path: &Path) -> Result<DiskUsage, ProviderError> {
        if self.panic_disk {
            panic!("disk backend exploded");
        }
        Ok(DiskUsage {
            total: 100,
            used: self.tick as u64,
            free: 100 - self.tick as u64,
            used_percent: self.tick as f64,
        })
    }

    fn host(&mut self) -> Result<HostInfo, ProviderError> {
        Ok(HostInfo {
            hostname: "box".into(),
            platform: "test".into(),
            uptime_secs: self.tick as u64,
        })
    }

    fn net_counters(&mut self) -> Result<NetCounters, ProviderError> {
        Ok(NetCounters {
            bytes_sent: 100 * self.tick as u64,
            bytes_recv: 200 * self.tick as u64,
        })
    }

    fn processes(&mut self) -> Result<Vec<ProcessEntry>, ProviderError> {
        Ok(vec![ProcessEntry {
            pid: 1,
            user: "root".into(),
            cpu_percent: 1.0,
            mem_percent: 1.0,
            command: "init".into(),
        }])
    }
}

#[test]
fn first_tick_reads_everything() {
    let mut s = Sampler::new(Scripted::default(), "/");
    let snap = s.sample();
    assert_eq!(snap.cpu_per_core, vec![1.0, 2.0]);
    assert_eq!(snap.memory.used_percent, 10.0);
    assert_eq!(snap.disk.used, 1);
    assert_eq!(snap.host.hostname, "box");
    assert_eq!(snap.network.bytes_recv, 200);
    assert_eq!(snap.processes.len(), 1);
    assert_eq!(s.disk_path(), Path::new("/"));
}

#[test]
fn failing_categories_keep_previous_values() {
    let mut s = Sampler::new(Scripted::default(), "/");
    let first = s.sample();

    {
        let p = s.provider_mut();
        p.fail_memory = true;
        p.panic_disk = true;
        p.empty_cpu = true;
    }
    let second = s.sample();

    assert_eq!(second.memory, first.memory);
    assert_eq!(second.disk, first.disk);
    assert_eq!(second.cpu_per_core, first.cpu_per_core);
    // healthy categories still move
    assert_eq!(second.network.bytes_recv, 400);
    assert_eq!(second.host.uptime_secs, 2);
    assert!(second.taken_at >= first.taken_at);
    assert_eq!(s.last(), &second);
}

#[test]
fn failure_before_any_success_yields_defaults() {
    let provider = Scripted {
        fail_memory: true,
        panic_disk: true,
        ..Default::default()
    };
    let mut s = Sampler::new(provider, "/");
    let snap = s.sample();
    assert_eq!(snap.memory, MemoryStat::default());
    assert_eq!(snap.disk, DiskUsage::default());
    assert_eq!(snap.cpu_average(), 1.5);
}
