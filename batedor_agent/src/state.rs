//! Process-wide state shared between the workers and the UI.
//!
//! Each mutable field has its own lock; none of them is held across an await.

use std::sync::RwLock;
use std::time::Instant;

use crate::types::{InterfaceInfo, NetCounters};

pub const UNKNOWN_IP: &str = "N/A";
pub const UNREACHABLE_LATENCY: i64 = -1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    Cpu,
    Mem,
    Pid,
}

impl SortKey {
    pub fn label(self) -> &'static str {
        match self {
            SortKey::Cpu => "CPU",
            SortKey::Mem => "MEM",
            SortKey::Pid => "PID",
        }
    }
}

/// How the process list is filtered and ranked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessQuery {
    pub sort_key: SortKey,
    pub filter: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeStatus {
    pub public_ip: String,
    pub latency_ms: i64,
    pub refreshed_at: Option<Instant>,
}

impl Default for ProbeStatus {
    fn default() -> Self {
        Self {
            public_ip: UNKNOWN_IP.into(),
            latency_ms: UNREACHABLE_LATENCY,
            refreshed_at: None,
        }
    }
}

/// Latest scalar readings persisted by the slow tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Summary {
    pub cpu_percent: f64,
    pub mem_percent: f64,
}

pub struct AppState {
    interface: InterfaceInfo,
    session_baseline: NetCounters,
    query: RwLock<ProcessQuery>,
    probe: RwLock<ProbeStatus>,
    summary: RwLock<Option<Summary>>,
}

impl AppState {
    pub fn new(interface: InterfaceInfo, session_baseline: NetCounters) -> Self {
        Self {
            interface,
            session_baseline,
            query: RwLock::new(ProcessQuery::default()),
            probe: RwLock::new(ProbeStatus::default()),
            summary: RwLock::new(None),
        }
    }

    pub fn interface(&self) -> &InterfaceInfo {
        &self.interface
    }

    /// Counters read at startup; session totals are measured from here.
    pub fn session_baseline(&self) -> NetCounters {
        self.session_baseline
    }

    pub fn query(&self) -> ProcessQuery {
        self.query.read().map(|q| q.clone()).unwrap_or_default()
    }

    pub fn set_sort_key(&self, key: SortKey) {
        if let Ok(mut q) = self.query.write() {
            q.sort_key = key;
        }
    }

    pub fn set_filter(&self, filter: impl Into<String>) {
        if let Ok(mut q) = self.query.write() {
            q.filter = filter.into();
        }
    }

    pub fn probe(&self) -> ProbeStatus {
        self.probe.read().map(|p| p.clone()).unwrap_or_default()
    }

    pub fn record_probe(&self, status: ProbeStatus) {
        if let Ok(mut p) = self.probe.write() {
            *p = status;
        }
    }

    /// None until the first fast tick has run.
    pub fn summary(&self) -> Option<Summary> {
        self.summary.read().ok().and_then(|s| *s)
    }

    pub fn record_summary(&self, summary: Summary) {
        if let Ok(mut s) = self.summary.write() {
            *s = Some(summary);
        }
    }
}
