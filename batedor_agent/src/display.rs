//! Prepared values handed to the display surface.
//!
//! Every buffer has its own lock. The distributor is the only writer, once per fast tick;
//! the renderer only reads. A slow draw of one widget never holds up another buffer.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

use crate::history::RollingSeries;
use crate::state::{ProcessQuery, UNKNOWN_IP, UNREACHABLE_LATENCY};
use crate::types::{DiskUsage, HostInfo, ProcessEntry};

/// A rolling series plus the width the renderer would like it trimmed to.
pub struct SeriesPanel {
    series: RwLock<RollingSeries<f64>>,
    viewport: AtomicUsize,
}

impl SeriesPanel {
    pub fn new(cap: usize) -> Self {
        Self {
            series: RwLock::new(RollingSeries::new(cap)),
            viewport: AtomicUsize::new(0),
        }
    }

    /// Renderer side: ask for the series to be bound to `width` points. Applied on the next push.
    pub fn request_width(&self, width: usize) {
        self.viewport.store(width, Ordering::Relaxed);
    }

    pub(crate) fn push(&self, v: f64) {
        if let Ok(mut s) = self.series.write() {
            let wanted = self.viewport.load(Ordering::Relaxed);
            if wanted > 0 && wanted != s.capacity() {
                s.resize(wanted);
            }
            s.push(v);
        }
    }

    pub fn values(&self) -> Vec<f64> {
        self.series
            .read()
            .map(|s| s.values().copied().collect())
            .unwrap_or_default()
    }

    pub fn latest(&self) -> Option<f64> {
        self.series.read().ok().and_then(|s| s.latest().copied())
    }

    pub fn capacity(&self) -> usize {
        self.series.read().map(|s| s.capacity()).unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NetView {
    pub download_rate: String,
    pub upload_rate: String,
    pub session_down: String,
    pub session_up: String,
    pub public_ip: String,
    pub latency_ms: i64,
    pub interface_name: String,
    pub local_ip: String,
}

impl Default for NetView {
    fn default() -> Self {
        Self {
            download_rate: "0 B/s".into(),
            upload_rate: "0 B/s".into(),
            session_down: "0 B".into(),
            session_up: "0 B".into(),
            public_ip: UNKNOWN_IP.into(),
            latency_ms: UNREACHABLE_LATENCY,
            interface_name: "N/A".into(),
            local_ip: "N/A".into(),
        }
    }
}

/// Ranked process list and the query that produced it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessView {
    pub entries: Vec<ProcessEntry>,
    pub query: ProcessQuery,
}

pub struct Panels {
    cores: RwLock<Vec<f64>>,
    pub memory: SeriesPanel,
    pub cpu_avg: SeriesPanel,
    pub rx_kb: SeriesPanel,
    pub tx_kb: SeriesPanel,
    network: RwLock<NetView>,
    disk: RwLock<DiskUsage>,
    host: RwLock<HostInfo>,
    processes: RwLock<ProcessView>,
}

impl Panels {
    pub fn new(series_cap: usize) -> Self {
        Self {
            cores: RwLock::new(Vec::new()),
            memory: SeriesPanel::new(series_cap),
            cpu_avg: SeriesPanel::new(series_cap),
            rx_kb: SeriesPanel::new(series_cap),
            tx_kb: SeriesPanel::new(series_cap),
            network: RwLock::new(NetView::default()),
            disk: RwLock::new(DiskUsage::default()),
            host: RwLock::new(HostInfo::default()),
            processes: RwLock::new(ProcessView::default()),
        }
    }

    pub fn cores(&self) -> Vec<f64> {
        self.cores.read().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn network(&self) -> NetView {
        self.network.read().map(|n| n.clone()).unwrap_or_default()
    }

    pub fn disk(&self) -> DiskUsage {
        self.disk.read().map(|d| *d).unwrap_or_default()
    }

    pub fn host(&self) -> HostInfo {
        self.host.read().map(|h| h.clone()).unwrap_or_default()
    }

    pub fn processes(&self) -> ProcessView {
        self.processes.read().map(|p| p.clone()).unwrap_or_default()
    }

    pub(crate) fn set_cores(&self, cores: &[f64]) {
        if let Ok(mut c) = self.cores.write() {
            c.clear();
            c.extend_from_slice(cores);
        }
    }

    pub(crate) fn set_network(&self, view: NetView) {
        if let Ok(mut n) = self.network.write() {
            *n = view;
        }
    }

    pub(crate) fn set_disk(&self, disk: DiskUsage) {
        if let Ok(mut d) = self.disk.write() {
            *d = disk;
        }
    }

    pub(crate) fn set_host(&self, host: &HostInfo) {
        if let Ok(mut h) = self.host.write() {
            h.clone_from(host);
        }
    }

    pub(crate) fn set_processes(&self, view: ProcessView) {
        if let Ok(mut p) = self.processes.write() {
            *p = view;
        }
    }
}

impl Default for Panels {
    fn default() -> Self {
        Self::new(100)
    }
}
