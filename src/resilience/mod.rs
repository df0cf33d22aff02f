//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Worker exit observed by the supervisor:
//!     → backoff.rs (delay before the next start, grows with consecutive crashes)
//!
//! Route computation:
//!     → engine::adapter (bounded wait on the engine)
//! ```
//!
//! # Design Decisions
//! - Jittered backoff keeps crashing workers from restarting in lockstep
//! - No retries and no circuit breaker for computations: a failing engine
//!   answers 500 on every request

pub mod backoff;

pub use backoff::{calculate_backoff, BackoffPolicy};
