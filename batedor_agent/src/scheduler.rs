//! Periodic workers: fast sampling tick, slow persistence tick, and the probe.
//!
//! Every worker lives on the scheduler's task tracker and stops when the shared
//! cancellation token fires.

use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tokio::time::{interval, interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, warn};

use crate::distributor::Distributor;
use crate::probe::{self, ProbeTargets};
use crate::provider::MetricProvider;
use crate::sampler::Sampler;
use crate::state::AppState;
use crate::store::{HistoryStore, CPU_USAGE, MEM_USAGE};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cadence {
    pub fast: Duration,
    pub slow: Duration,
    pub probe: Duration,
}

impl Default for Cadence {
    fn default() -> Self {
        Self {
            fast: Duration::from_secs(1),
            slow: Duration::from_secs(60),
            probe: Duration::from_secs(30),
        }
    }
}

pub struct PeriodicScheduler {
    tracker: TaskTracker,
    cancel: CancellationToken,
}

impl PeriodicScheduler {
    pub fn new(cancel: CancellationToken) -> Self {
        Self {
            tracker: TaskTracker::new(),
            cancel,
        }
    }

    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Track an arbitrary task (hub, sidecar) alongside the tick workers.
    pub fn spawn<F>(&self, fut: F) -> JoinHandle<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.tracker.spawn(fut)
    }

    /// Sample on the blocking pool, then hand the snapshot to the distributor.
    pub fn spawn_fast_tick<P>(
        &self,
        sampler: Arc<Mutex<Sampler<P>>>,
        mut distributor: Distributor,
        period: Duration,
    ) -> JoinHandle<()>
    where
        P: MetricProvider + 'static,
    {
        let cancel = self.cancel.clone();
        self.tracker.spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {}
                }
                let s = Arc::clone(&sampler);
                let snap = tokio::task::spawn_blocking(move || {
                    s.lock().unwrap_or_else(PoisonError::into_inner).sample()
                })
                .await;
                match snap {
                    Ok(snap) => {
                        distributor.distribute(&snap);
                    }
                    Err(e) => warn!("sampling task failed: {e}"),
                }
            }
            debug!("fast tick stopped");
        })
    }

    /// First write happens one full period after start.
    pub fn spawn_persist_tick(
        &self,
        store: Arc<dyn HistoryStore>,
        state: Arc<AppState>,
        period: Duration,
    ) -> JoinHandle<()> {
        let cancel = self.cancel.clone();
        self.tracker.spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {
                        persist_once(store.as_ref(), &state, Utc::now()).await;
                    }
                }
            }
            debug!("persist tick stopped");
        })
    }

    /// Fires at startup, then every `period`.
    pub fn spawn_probe(
        &self,
        targets: ProbeTargets,
        state: Arc<AppState>,
        period: Duration,
    ) -> JoinHandle<()> {
        let cancel = self.cancel.clone();
        self.tracker.spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {}
                }
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    status = probe::refresh(&targets, &state) => {
                        debug!(ip = %status.public_ip, latency_ms = status.latency_ms, "probe refreshed");
                    }
                }
            }
            debug!("probe stopped");
        })
    }

    /// Cancel every worker and wait for all of them to finish.
    pub async fn shutdown(&self) {
        self.cancel.cancel();
        self.tracker.close();
        self.tracker.wait().await;
    }
}

/// Append the latest summary to the store. Returns how many points were written;
/// a failed write is logged and skipped.
pub async fn persist_once(store: &dyn HistoryStore, state: &AppState, at: DateTime<Utc>) -> usize {
    let Some(summary) = state.summary() else {
        return 0;
    };
    let mut written = 0;
    for (metric, value) in [(CPU_USAGE, summary.cpu_percent), (MEM_USAGE, summary.mem_percent)] {
        match store.append(metric, at, value).await {
            Ok(()) => written += 1,
            Err(e) => warn!(metric, "failed to persist metric: {e}"),
        }
    }
    written
}
