//! Startup orchestration.
//!
//! # Responsibilities
//! - Supervisor mode: start the worker pool and keep it alive
//! - Worker mode: bind, build the per-worker state, serve until signalled
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal for that process
//! - Workers resolve configuration themselves from the same file and
//!   environment the supervisor saw

use std::error::Error;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use crate::config::GatewayConfig;
use crate::http::GatewayServer;
use crate::lifecycle::signals::wait_for_shutdown_signal;
use crate::lifecycle::supervisor::{ExecLauncher, RestartPolicy, Supervisor};
use crate::lifecycle::Shutdown;
use crate::net;
use crate::observability::metrics;

/// Trigger `shutdown` when SIGINT or SIGTERM arrives.
fn spawn_signal_listener(shutdown: Arc<Shutdown>) {
    tokio::spawn(async move {
        wait_for_shutdown_signal().await;
        shutdown.trigger();
    });
}

/// Run one worker process: a single-threaded server with its own cache and
/// admission state.
pub async fn run_worker(config: GatewayConfig, slot: usize) -> Result<(), Box<dyn Error>> {
    let pid = std::process::id();
    tracing::info!(
        slot,
        pid,
        engine = ?config.engine.kind,
        rate_limit = config.rate_limit.max_requests,
        cache_ttl_secs = config.cache.ttl_secs,
        "Worker starting"
    );

    if config.observability.metrics_enabled {
        let port = config
            .observability
            .metrics_port
            .saturating_add(1)
            .saturating_add(u16::try_from(slot).unwrap_or(u16::MAX));
        metrics::init_metrics(SocketAddr::from(([0, 0, 0, 0], port)));
    }

    let listener = net::bind(&config.listener).await?;
    tracing::info!(slot, pid, address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Arc::new(Shutdown::new());
    spawn_signal_listener(shutdown.clone());

    GatewayServer::new(config).run(listener, &shutdown).await?;

    tracing::info!(slot, pid, "Worker stopped");
    Ok(())
}

/// Run the supervisor: one worker per slot, restarted with backoff.
pub async fn run_supervisor(config: GatewayConfig, config_path: Option<&Path>) -> Result<(), Box<dyn Error>> {
    let workers = config.workers.resolved_count();

    let mut args = Vec::new();
    if let Some(path) = config_path {
        args.push("--config".to_string());
        args.push(path.display().to_string());
    }
    let launcher = ExecLauncher::current_exe(args)?
        .env("PORT", config.listener.port.to_string());

    tracing::info!(
        workers,
        port = config.listener.port,
        pid = std::process::id(),
        "Searoute gateway starting"
    );

    if config.observability.metrics_enabled {
        metrics::init_metrics(SocketAddr::from(([0, 0, 0, 0], config.observability.metrics_port)));
    }

    let shutdown = Arc::new(Shutdown::new());
    spawn_signal_listener(shutdown.clone());

    let supervisor = Supervisor::new(
        workers,
        Arc::new(launcher),
        RestartPolicy::from_config(&config.workers),
    );
    supervisor.run(&shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
