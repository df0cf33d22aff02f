//! Worker process supervision.
//!
//! # States
//! - Starting: launching the worker process
//! - Running: worker process alive
//! - Backoff: worker exited, waiting before the next start
//! - Failed: too many consecutive crashes, slot abandoned
//!
//! # State Transitions
//! ```text
//! Starting → Running: spawn succeeded
//! Starting → Backoff: spawn failed (counts as a crash)
//! Running  → Backoff: process exited (crash counter reset first if it had
//!                     been up for at least `stable_after`)
//! Backoff  → Starting: delay elapsed
//! Backoff  → Failed: consecutive crashes > max_restarts
//! ```
//!
//! The supervisor owns process handles only. Workers share nothing with it or
//! with each other; an in-flight request on a crashed worker is lost.

use std::path::PathBuf;
use std::process::ExitStatus;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::process::{Child, Command};
use tokio::sync::broadcast;
use tokio::task::JoinSet;
use tokio::time::Instant;

use crate::config::WorkerConfig;
use crate::lifecycle::Shutdown;
use crate::observability::metrics;
use crate::resilience::BackoffPolicy;

#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error("all {0} worker slots failed permanently")]
    AllWorkersFailed(usize),
    #[error("supervisor needs at least one worker")]
    NoWorkers,
}

/// Lifecycle state of one worker slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Starting,
    Running,
    Backoff,
    Failed,
}

/// When and how often a slot may be restarted.
#[derive(Debug, Clone, Copy)]
pub struct RestartPolicy {
    pub backoff: BackoffPolicy,
    pub max_restarts: u32,
    pub stable_after: Duration,
}

impl RestartPolicy {
    pub fn from_config(config: &WorkerConfig) -> Self {
        Self {
            backoff: BackoffPolicy::from_config(config),
            max_restarts: config.max_restarts,
            stable_after: Duration::from_secs(config.stable_after_secs),
        }
    }
}

/// What to do after a worker stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotAction {
    RestartAfter(Duration),
    GiveUp,
}

/// Bookkeeping for one worker slot.
#[derive(Debug, Clone)]
pub struct WorkerSlot {
    pub slot: usize,
    pub state: WorkerState,
    pub pid: Option<u32>,
    /// Consecutive crashes since the last stable run.
    pub crashes: u32,
    started_at: Option<Instant>,
}

impl WorkerSlot {
    pub fn new(slot: usize) -> Self {
        Self {
            slot,
            state: WorkerState::Starting,
            pid: None,
            crashes: 0,
            started_at: None,
        }
    }

    pub fn on_spawned(&mut self, pid: Option<u32>, now: Instant) {
        self.state = WorkerState::Running;
        self.pid = pid;
        self.started_at = Some(now);
    }

    pub fn on_exit(&mut self, now: Instant, policy: &RestartPolicy) -> SlotAction {
        let stable = self
            .started_at
            .map(|t| now.saturating_duration_since(t) >= policy.stable_after)
            .unwrap_or(false);
        if stable {
            self.crashes = 0;
        }
        self.pid = None;
        self.started_at = None;
        self.record_crash(policy)
    }

    pub fn on_spawn_failed(&mut self, policy: &RestartPolicy) -> SlotAction {
        self.pid = None;
        self.started_at = None;
        self.record_crash(policy)
    }

    fn record_crash(&mut self, policy: &RestartPolicy) -> SlotAction {
        self.crashes = self.crashes.saturating_add(1);
        if self.crashes > policy.max_restarts {
            self.state = WorkerState::Failed;
            SlotAction::GiveUp
        } else {
            self.state = WorkerState::Backoff;
            SlotAction::RestartAfter(policy.backoff.delay(self.crashes))
        }
    }
}

/// Starts one worker process for a slot.
pub trait WorkerLauncher: Send + Sync + 'static {
    fn launch(&self, slot: usize) -> std::io::Result<Child>;
}

/// Launches workers by re-executing a binary with `worker --slot <n>`.
pub struct ExecLauncher {
    program: PathBuf,
    args: Vec<String>,
    envs: Vec<(String, String)>,
}

impl ExecLauncher {
    /// `args` come before the `worker` subcommand (e.g. `--config <path>`).
    pub fn new(program: PathBuf, args: Vec<String>) -> Self {
        Self {
            program,
            args,
            envs: Vec::new(),
        }
    }

    /// Launch the currently running executable.
    pub fn current_exe(args: Vec<String>) -> std::io::Result<Self> {
        Ok(Self::new(std::env::current_exe()?, args))
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }
}

impl WorkerLauncher for ExecLauncher {
    fn launch(&self, slot: usize) -> std::io::Result<Child> {
        Command::new(&self.program)
            .args(&self.args)
            .arg("worker")
            .arg("--slot")
            .arg(slot.to_string())
            .envs(self.envs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .kill_on_drop(true)
            .spawn()
    }
}

/// Keeps a fixed pool of worker processes alive.
pub struct Supervisor {
    workers: usize,
    launcher: Arc<dyn WorkerLauncher>,
    policy: RestartPolicy,
    shutdown_grace: Duration,
}

impl Supervisor {
    pub fn new(workers: usize, launcher: Arc<dyn WorkerLauncher>, policy: RestartPolicy) -> Self {
        Self {
            workers,
            launcher,
            policy,
            shutdown_grace: Duration::from_secs(10),
        }
    }

    /// How long a worker may take to exit on shutdown before it is killed.
    pub fn with_shutdown_grace(mut self, grace: Duration) -> Self {
        self.shutdown_grace = grace;
        self
    }

    /// Run until shutdown is triggered or every slot has failed.
    pub async fn run(self, shutdown: &Shutdown) -> Result<Vec<WorkerSlot>, SupervisorError> {
        if self.workers == 0 {
            return Err(SupervisorError::NoWorkers);
        }

        tracing::info!(workers = self.workers, "Supervisor starting worker pool");

        let mut tasks = JoinSet::new();
        for slot in 0..self.workers {
            let launcher = self.launcher.clone();
            let rx = shutdown.subscribe();
            let policy = self.policy;
            let grace = self.shutdown_grace;
            tasks.spawn(supervise_slot(slot, launcher, policy, grace, rx));
        }

        let mut slots = Vec::with_capacity(self.workers);
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(slot) => slots.push(slot),
                Err(e) => tracing::error!(error = %e, "Worker slot task aborted"),
            }
        }
        slots.sort_by_key(|s| s.slot);

        if !slots.is_empty() && slots.iter().all(|s| s.state == WorkerState::Failed) {
            return Err(SupervisorError::AllWorkersFailed(self.workers));
        }

        tracing::info!("Supervisor stopped");
        Ok(slots)
    }
}

async fn supervise_slot(
    index: usize,
    launcher: Arc<dyn WorkerLauncher>,
    policy: RestartPolicy,
    grace: Duration,
    mut shutdown: broadcast::Receiver<()>,
) -> WorkerSlot {
    let mut slot = WorkerSlot::new(index);

    loop {
        slot.state = WorkerState::Starting;
        let action = match launcher.launch(index) {
            Ok(mut child) => {
                slot.on_spawned(child.id(), Instant::now());
                tracing::info!(slot = index, pid = ?slot.pid, "Worker started");

                let status = tokio::select! {
                    status = child.wait() => status,
                    _ = shutdown.recv() => {
                        stop_child(index, &mut child, grace).await;
                        return slot;
                    }
                };

                let pid = slot.pid;
                let action = slot.on_exit(Instant::now(), &policy);
                log_exit(index, pid, status, &slot, action);
                action
            }
            Err(e) => {
                let action = slot.on_spawn_failed(&policy);
                tracing::error!(slot = index, error = %e, crashes = slot.crashes, "Failed to launch worker");
                action
            }
        };

        match action {
            SlotAction::GiveUp => {
                tracing::error!(
                    slot = index,
                    crashes = slot.crashes,
                    "Worker keeps crashing, giving up on slot"
                );
                return slot;
            }
            SlotAction::RestartAfter(delay) => {
                metrics::record_worker_restart(index);
                tokio::select! {
                    _ = tokio::time::sleep(delay) => {}
                    _ = shutdown.recv() => return slot,
                }
            }
        }
    }
}

fn log_exit(
    index: usize,
    pid: Option<u32>,
    status: std::io::Result<ExitStatus>,
    slot: &WorkerSlot,
    action: SlotAction,
) {
    let delay = match action {
        SlotAction::RestartAfter(d) => Some(d),
        SlotAction::GiveUp => None,
    };
    match status {
        Ok(status) => tracing::warn!(
            slot = index,
            pid = ?pid,
            status = %status,
            crashes = slot.crashes,
            restart_in = ?delay,
            "Worker exited"
        ),
        Err(e) => tracing::warn!(
            slot = index,
            pid = ?pid,
            error = %e,
            crashes = slot.crashes,
            restart_in = ?delay,
            "Lost track of worker"
        ),
    }
}

/// Ask the worker to stop with SIGTERM, give it `grace` to drain, then kill it.
async fn stop_child(index: usize, child: &mut Child, grace: Duration) {
    request_stop(index, child);
    if tokio::time::timeout(grace, child.wait()).await.is_ok() {
        tracing::info!(slot = index, "Worker stopped");
        return;
    }
    tracing::warn!(slot = index, "Worker did not stop in time, killing");
    if let Err(e) = child.start_kill() {
        tracing::error!(slot = index, error = %e, "Failed to kill worker");
        return;
    }
    let _ = child.wait().await;
}

#[cfg(unix)]
fn request_stop(index: usize, child: &Child) {
    use nix::sys::signal::{kill, Signal};
    use nix::unistd::Pid;

    let Some(pid) = child.id().and_then(|id| i32::try_from(id).ok()) else {
        return;
    };
    if let Err(e) = kill(Pid::from_raw(pid), Signal::SIGTERM) {
        tracing::warn!(slot = index, pid, error = %e, "Failed to send SIGTERM to worker");
    }
}

#[cfg(not(unix))]
fn request_stop(_index: usize, _child: &Child) {}
