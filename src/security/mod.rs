//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Validated request:
//!     → rate_limit.rs (fixed-window per-client admission)
//!     → cache / engine
//! ```
//!
//! # Design Decisions
//! - Admission runs after validation: malformed requests are not counted
//! - A rejected request never touches the cache
//! - Body size limits are enforced by tower-http before handlers run

pub mod rate_limit;

pub use rate_limit::{client_key, Admission, RateLimiter};
