//! Searoute Gateway Library
//!
//! HTTP front-end that turns two geographic points into a maritime route,
//! delegating path-finding to a route engine and keeping that delegation fast
//! under load with per-worker caching and admission control.
//!
//! # Architecture Overview
//!
//! ```text
//!   supervisor process ── spawns/restarts ──▶ worker 0 … worker N-1
//!                                               │ (SO_REUSEPORT, one port)
//!   POST /route                                 ▼
//!     → route::validate → security::rate_limit → cache ──hit──▶ envelope
//!                                                  │miss
//!                                                  ▼
//!                                  engine::adapter → RouteEngine
//!                                                  │
//!                                  cache put ◀─────┘ → route::envelope
//! ```

pub mod cache;
pub mod config;
pub mod engine;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod resilience;
pub mod route;
pub mod security;

pub use config::GatewayConfig;
pub use http::GatewayServer;
pub use lifecycle::Shutdown;
