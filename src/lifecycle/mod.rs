//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Supervisor process (startup.rs → supervisor.rs):
//!     Resolve config → Spawn N workers → Restart on exit with backoff
//!
//! Worker process (startup.rs):
//!     Resolve config → Bind (SO_REUSEPORT) → Serve → Drain on signal
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → shutdown.rs broadcast → every long-running task
//! ```
//!
//! # Design Decisions
//! - Worker count is fixed at startup
//! - Crash loops are throttled and eventually abandoned per slot
//! - Shutdown has a grace period, then workers are killed

pub mod shutdown;
pub mod signals;
pub mod startup;
pub mod supervisor;

pub use shutdown::Shutdown;
pub use supervisor::{
    ExecLauncher, RestartPolicy, SlotAction, Supervisor, SupervisorError, WorkerLauncher,
    WorkerSlot, WorkerState,
};
