//! Assembles one Snapshot per tick from independent provider reads.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::warn;

use crate::provider::{MetricProvider, ProviderError};
use crate::types::Snapshot;

pub struct Sampler<P> {
    provider: P,
    disk_path: PathBuf,
    last: Snapshot,
}

impl<P: MetricProvider> Sampler<P> {
    pub fn new(provider: P, disk_path: impl Into<PathBuf>) -> Self {
        Self {
            provider,
            disk_path: disk_path.into(),
            last: Snapshot::empty(Utc::now()),
        }
    }

    pub fn disk_path(&self) -> &Path {
        &self.disk_path
    }

    pub fn provider_mut(&mut self) -> &mut P {
        &mut self.provider
    }

    /// Read every category; a failing one keeps the previous tick's value.
    pub fn sample(&mut self) -> Snapshot {
        let prev = &self.last;
        let provider = &mut self.provider;

        let cpu_per_core = read("cpu", || provider.cpu_percents())
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| prev.cpu_per_core.clone());
        let memory = read("memory", || provider.memory()).unwrap_or(prev.memory);
        let disk = read("disk", || provider.disk(&self.disk_path)).unwrap_or(prev.disk);
        let host = read("host", || provider.host()).unwrap_or_else(|| prev.host.clone());
        let network = read("network", || provider.net_counters()).unwrap_or(prev.network);
        let processes = read("processes", || provider.processes())
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| prev.processes.clone());

        let snapshot = Snapshot {
            taken_at: Utc::now(),
            cpu_per_core,
            memory,
            disk,
            network,
            host,
            processes,
        };
        self.last = snapshot.clone();
        snapshot
    }

    pub fn last(&self) -> &Snapshot {
        &self.last
    }
}

fn read<T>(category: &'static str, f: impl FnOnce() -> Result<T, ProviderError>) -> Option<T> {
    let res = catch_unwind(AssertUnwindSafe(f))
        .unwrap_or_else(|_| Err(ProviderError::Panicked(category)));
    match res {
        Ok(v) => Some(v),
        Err(e) => {
            warn!(category, "metric read failed, keeping previous value: {e}");
            None
        }
    }
}
