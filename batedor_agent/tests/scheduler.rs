//! Scheduler workers run on their cadence and stop on cancellation.
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use batedor_agent::display::Panels;
use batedor_agent::distributor::Distributor;
use batedor_agent::probe::ProbeTargets;
use batedor_agent::provider::{MetricProvider, ProviderError};
use batedor_agent::sampler::Sampler;
use batedor_agent::scheduler::{persist_once, PeriodicScheduler};
use batedor_agent::state::{AppState, Summary};
use batedor_agent::store::{HistoryStore, MemoryStore, CPU_USAGE, MEM_USAGE};
use batedor_agent::types::{
    DiskUsage, HostInfo, InterfaceInfo, MemoryStat, NetCounters, ProcessEntry,
};
use chrono::{Duration as ChronoDuration, Utc};
use tokio_util::sync::CancellationToken;

struct Steady;

impl MetricProvider for Steady {
    fn cpu_percents(&mut self) -> Result<Vec<f64>, ProviderError> {
        Ok(vec![25.0])
    }
    fn memory(&mut self) -> Result<MemoryStat, ProviderError> {
        Ok(MemoryStat { used_percent: 40.0 })
    }
    fn disk(&mut self, _path: &std::path::Path) -> Result<DiskUsage, ProviderError> {
        Ok(DiskUsage::default())
    }
    fn host(&mut self) -> Result<HostInfo, ProviderError> {
        Ok(HostInfo::default())
    }
    fn net_counters(&mut self) -> Result<NetCounters, ProviderError> {
        Ok(NetCounters::default())
    }
    fn processes(&mut self) -> Result<Vec<ProcessEntry>, ProviderError> {
        Err(ProviderError::Unavailable("processes"))
    }
}

fn state() -> Arc<AppState> {
    Arc::new(AppState::new(InterfaceInfo::default(), NetCounters::default()))
}

#[tokio::test]
async fn persist_writes_nothing_before_the_first_tick() {
    let store = MemoryStore::new();
    let state = state();
    assert_eq!(persist_once(&store, &state, Utc::now()).await, 0);

    state.record_summary(Summary {
        cpu_percent: 12.5,
        mem_percent: 60.0,
    });
    let at = Utc::now();
    assert_eq!(persist_once(&store, &state, at).await, 2);

    let since = at - ChronoDuration::seconds(1);
    let cpu = store.query_window(CPU_USAGE, since).await.unwrap();
    let mem = store.query_window(MEM_USAGE, since).await.unwrap();
    assert_eq!(cpu[0].value, 12.5);
    assert_eq!(mem[0].value, 60.0);
}

#[tokio::test]
async fn fast_and_slow_ticks_feed_panels_and_store() {
    let cancel = CancellationToken::new();
    let scheduler = PeriodicScheduler::new(cancel.clone());
    let panels = Arc::new(Panels::new(50));
    let state = state();
    let store = Arc::new(MemoryStore::new());

    let sampler = Arc::new(Mutex::new(Sampler::new(Steady, "/")));
    let distributor = Distributor::new(
        Arc::clone(&panels),
        Arc::clone(&state),
        None,
        NetCounters::default(),
        Instant::now(),
    );
    scheduler.spawn_fast_tick(sampler, distributor, Duration::from_millis(20));
    scheduler.spawn_persist_tick(
        Arc::clone(&store) as Arc<dyn HistoryStore>,
        Arc::clone(&state),
        Duration::from_millis(50),
    );

    tokio::time::sleep(Duration::from_millis(300)).await;
    scheduler.shutdown().await;

    assert!(panels.memory.values().len() >= 3);
    assert_eq!(panels.cpu_avg.latest(), Some(25.0));
    assert!(store.len() >= 2);

    // nothing moves after shutdown
    let n = panels.memory.values().len();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(panels.memory.values().len(), n);
}

#[tokio::test]
async fn shutdown_stops_every_worker() {
    let cancel = CancellationToken::new();
    let scheduler = PeriodicScheduler::new(cancel.clone());
    let state = state();
    let targets = ProbeTargets {
        latency_addr: "127.0.0.1:1".into(),
        latency_timeout: Duration::from_millis(200),
        ip_host: "127.0.0.1".into(),
        ip_port: 1,
        ip_timeout: Duration::from_millis(200),
    };
    let probe = scheduler.spawn_probe(targets, Arc::clone(&state), Duration::from_secs(3600));
    let persist = scheduler.spawn_persist_tick(
        Arc::new(MemoryStore::new()),
        Arc::clone(&state),
        Duration::from_secs(3600),
    );
    let token = scheduler.cancel_token();
    let waiter = scheduler.spawn(async move { token.cancelled().await });

    tokio::time::timeout(Duration::from_secs(5), scheduler.shutdown())
        .await
        .expect("workers should stop promptly");
    assert!(scheduler.is_cancelled());
    for handle in [probe, persist, waiter] {
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("task finished")
            .expect("task did not panic");
    }
}
