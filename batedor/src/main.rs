//! Entry point for batedor. Parses args, wires the pipeline, then runs the TUI or waits headless.

use std::env;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use anyhow::Context;
use batedor::app::App;
use batedor::cli::{parse_args, Command};
use batedor::config::{data_dir, Settings};
use batedor::logging::{self, LogTarget};
use batedor_agent::display::Panels;
use batedor_agent::provider::{MetricProvider, SysinfoProvider};
use batedor_agent::state::AppState;
use batedor_agent::store::{HistoryStore, SqliteStore};
use batedor_agent::types::InterfaceInfo;
use batedor_agent::{ws, BroadcastHub, Distributor, PeriodicScheduler, Sampler};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = match parse_args(env::args()) {
        Ok(Command::Run(a)) => a,
        Ok(Command::Help(text)) => {
            println!("{text}");
            return Ok(());
        }
        Err(msg) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
    };
    let settings = Settings::resolve(&args)?;

    let target = if settings.headless {
        LogTarget::Stderr
    } else {
        LogTarget::File(data_dir().join("batedor.log"))
    };
    logging::init(target)?;
    debug!(?settings, "resolved settings");

    // A missing history is not fatal: the live dashboard still works.
    let store = match SqliteStore::open(&settings.db_path).await {
        Ok(s) => Some(Arc::new(s)),
        Err(e) => {
            error!(
                path = %settings.db_path.display(),
                "history store unavailable, running without history: {e}"
            );
            None
        }
    };

    let mut provider = SysinfoProvider::new();
    let interface = provider.primary_interface().unwrap_or_else(|e| {
        warn!("no primary interface: {e}");
        InterfaceInfo::default()
    });
    let mut sampler = Sampler::new(provider, settings.disk_path.clone());
    let initial = sampler.sample();
    let started = Instant::now();
    info!(
        iface = %interface.name,
        cores = initial.cpu_per_core.len(),
        "batedor starting"
    );

    let state = Arc::new(AppState::new(interface, initial.network));
    let panels = Arc::new(Panels::new(settings.series_capacity));
    let cancel = CancellationToken::new();
    let scheduler = PeriodicScheduler::new(cancel.clone());

    let hub = if settings.web {
        let (hub, handle) = BroadcastHub::new(cancel.clone());
        scheduler.spawn(hub.run());
        let listener = ws::bind(settings.web_port)
            .await
            .with_context(|| format!("binding web port {}", settings.web_port))?;
        let root = settings.web_root.clone();
        let sidecar_hub = handle.clone();
        let sidecar_cancel = cancel.clone();
        scheduler.spawn(async move {
            if let Err(e) = ws::serve(listener, sidecar_hub, &root, sidecar_cancel).await {
                error!("web sidecar stopped: {e}");
            }
        });
        Some(handle)
    } else {
        None
    };

    let cadence = settings.cadence();
    let distributor = Distributor::new(
        Arc::clone(&panels),
        Arc::clone(&state),
        hub,
        initial.network,
        started,
    );
    scheduler.spawn_fast_tick(Arc::new(Mutex::new(sampler)), distributor, cadence.fast);
    if let Some(store) = &store {
        scheduler.spawn_persist_tick(
            Arc::clone(store) as Arc<dyn HistoryStore>,
            Arc::clone(&state),
            cadence.slow,
        );
    }
    scheduler.spawn_probe(settings.probe_targets(), Arc::clone(&state), cadence.probe);

    // Signals only cancel; the UI loop notices and restores the terminal itself.
    tokio::spawn(shutdown_signal(cancel.clone()));

    let res = if settings.headless {
        info!("running headless; Ctrl-C to stop");
        cancel.cancelled().await;
        Ok(())
    } else {
        let history = store.clone().map(|s| s as Arc<dyn HistoryStore>);
        let mut app = App::new(panels, Arc::clone(&state), history);
        app.run(cancel.clone()).await
    };

    scheduler.shutdown().await;
    if let Some(store) = store {
        store.close().await;
    }
    info!("batedor stopped");
    res
}

async fn shutdown_signal(token: CancellationToken) {
    let _guard = token.drop_guard();

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => {
                warn!("failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
