//! Route result caching.
//!
//! # Data Flow
//! ```text
//! validated RouteRequest → CacheKey
//!     → route_cache.rs get (expired entries count as absent)
//!     → on miss: engine computes, handler puts the built envelope
//! periodic sweeper → drops expired entries
//! ```
//!
//! # Design Decisions
//! - One cache per worker process; nothing is shared across workers
//! - No stampede protection: concurrent misses compute independently
//! - Failures are never cached

pub mod route_cache;

pub use route_cache::{CachedEntry, RouteCache};
