//! Fans each Snapshot out to the display panels, the summary used for persistence,
//! and the broadcast hub. Pure hand-off: no I/O and nothing here waits.

use std::sync::Arc;
use std::time::Instant;

use tracing::warn;

use crate::display::{NetView, Panels, ProcessView};
use crate::hub::HubHandle;
use crate::proto::{CpuPayload, MemPayload, NetPayload, ProcPayload, PushMessage, MAX_PUSHED_PROCS};
use crate::rate::{format_bytes, format_rate, RateComputer, RateSample};
use crate::state::{AppState, ProbeStatus, ProcessQuery, SortKey, Summary};
use crate::types::{NetCounters, ProcessEntry, Snapshot};

pub struct Distributor {
    panels: Arc<Panels>,
    state: Arc<AppState>,
    hub: Option<HubHandle>,
    rate: RateComputer,
}

impl Distributor {
    pub fn new(
        panels: Arc<Panels>,
        state: Arc<AppState>,
        hub: Option<HubHandle>,
        initial: NetCounters,
        at: Instant,
    ) -> Self {
        Self {
            panels,
            state,
            hub,
            rate: RateComputer::new(initial, at),
        }
    }

    pub fn distribute(&mut self, snapshot: &Snapshot) -> RateSample {
        self.distribute_at(snapshot, Instant::now())
    }

    /// As [`Distributor::distribute`] with an explicit clock reading for the rate computation.
    pub fn distribute_at(&mut self, snap: &Snapshot, now: Instant) -> RateSample {
        let cpu_avg = snap.cpu_average();
        let mem = snap.memory.used_percent;

        self.panels.memory.push(mem);
        self.panels.cpu_avg.push(cpu_avg);
        self.panels.set_cores(&snap.cpu_per_core);

        let rate = self
            .rate
            .update(snap.network.bytes_sent, snap.network.bytes_recv, now);
        self.panels.rx_kb.push(rate.down_bytes_per_sec as f64 / 1024.0);
        self.panels.tx_kb.push(rate.up_bytes_per_sec as f64 / 1024.0);

        let query = self.state.query();
        let ranked = rank_processes(&snap.processes, &query);
        let probe = self.state.probe();

        let baseline = self.state.session_baseline();
        let iface = self.state.interface();
        self.panels.set_network(NetView {
            download_rate: format_rate(rate.down_bytes_per_sec),
            upload_rate: format_rate(rate.up_bytes_per_sec),
            session_down: format_bytes(snap.network.bytes_recv.saturating_sub(baseline.bytes_recv)),
            session_up: format_bytes(snap.network.bytes_sent.saturating_sub(baseline.bytes_sent)),
            public_ip: probe.public_ip.clone(),
            latency_ms: probe.latency_ms,
            interface_name: iface.name.clone(),
            local_ip: iface.local_ip.clone(),
        });
        self.panels.set_disk(snap.disk);
        self.panels.set_host(&snap.host);

        if let Some(hub) = &self.hub {
            let msg = build_push(snap, &rate, &probe, &ranked);
            match serde_json::to_string(&msg) {
                Ok(js) => {
                    hub.broadcast(js.into());
                }
                Err(e) => warn!("failed to serialize push message: {e}"),
            }
        }

        self.panels.set_processes(ProcessView {
            entries: ranked,
            query,
        });
        self.state.record_summary(Summary {
            cpu_percent: cpu_avg,
            mem_percent: mem,
        });
        rate
    }
}

/// Idle processes (no measurable CPU or memory) are left out of every view.
pub fn is_relevant(p: &ProcessEntry) -> bool {
    p.cpu_percent > 0.01 || p.mem_percent > 0.01
}

/// Filter by command substring (case-insensitive), drop idle entries, and sort by the
/// query's key. The sort is stable: ties keep the provider's order.
pub fn rank_processes(entries: &[ProcessEntry], query: &ProcessQuery) -> Vec<ProcessEntry> {
    let needle = query.filter.trim().to_lowercase();
    let mut out: Vec<ProcessEntry> = entries
        .iter()
        .filter(|p| needle.is_empty() || p.command.to_lowercase().contains(&needle))
        .filter(|p| is_relevant(p))
        .cloned()
        .collect();
    match query.sort_key {
        SortKey::Cpu => out.sort_by(|a, b| b.cpu_percent.total_cmp(&a.cpu_percent)),
        SortKey::Mem => out.sort_by(|a, b| b.mem_percent.total_cmp(&a.mem_percent)),
        SortKey::Pid => out.sort_by_key(|p| p.pid),
    }
    out
}

pub fn build_push(
    snap: &Snapshot,
    rate: &RateSample,
    probe: &ProbeStatus,
    ranked: &[ProcessEntry],
) -> PushMessage {
    PushMessage {
        cpu: CpuPayload {
            cores: snap.cpu_per_core.clone(),
        },
        mem: MemPayload {
            used_percent: snap.memory.used_percent,
        },
        net: NetPayload {
            download_rate: format_rate(rate.down_bytes_per_sec),
            upload_rate: format_rate(rate.up_bytes_per_sec),
            public_ip: probe.public_ip.clone(),
            latency: probe.latency_ms,
        },
        procs: ranked
            .iter()
            .take(MAX_PUSHED_PROCS)
            .map(|p| ProcPayload {
                pid: p.pid,
                user: p.user.clone(),
                cpu: p.cpu_percent,
                mem: p.mem_percent,
                command: p.command.clone(),
            })
            .collect(),
    }
}
