//! Route computation subsystem.
//!
//! # Data Flow
//! ```text
//! RouteRequest
//!     → adapter.rs (one suspension point, bounded wait, endpoint splice)
//!     → RouteEngine::route on the blocking pool
//!         great_circle.rs  built-in network
//!         command.rs       external routing program over stdin/stdout
//!     → RouteResult
//! ```
//!
//! # Design Decisions
//! - Engines are synchronous; the adapter moves them off the worker's scheduler
//! - Engines return only the oceanic segment; the adapter owns the endpoints
//! - A timed-out computation keeps running to completion, its result is dropped

pub mod adapter;
pub mod command;
pub mod great_circle;

use std::sync::Arc;

use thiserror::Error;

use crate::config::{EngineConfig, EngineKind};
use crate::route::{Coordinate, DistanceUnit};

pub use adapter::{ComputationError, RouteComputer};
pub use command::CommandEngine;
pub use great_circle::GreatCircleEngine;

/// Oceanic segment produced by an engine.
#[derive(Debug, Clone, PartialEq)]
pub struct OceanicRoute {
    /// Path between (not necessarily including) the request endpoints.
    pub coordinates: Vec<Coordinate>,
    /// Total route length in the requested unit.
    pub length: f64,
}

/// Full route with the request endpoints spliced on.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteResult {
    pub coordinates: Vec<Coordinate>,
    pub distance: f64,
}

/// Failure reported by an engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The engine refused the input (unreachable or invalid points).
    #[error("{0}")]
    Rejected(String),
    #[error("failed to run route engine: {0}")]
    Io(#[from] std::io::Error),
    #[error("route engine returned invalid output: {0}")]
    Protocol(String),
}

/// A path-finding primitive over a nautical network.
///
/// Implementations may block; callers go through [`RouteComputer`].
pub trait RouteEngine: Send + Sync + 'static {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Compute the oceanic segment between two points.
    fn route(
        &self,
        origin: Coordinate,
        destination: Coordinate,
        units: DistanceUnit,
    ) -> Result<OceanicRoute, EngineError>;
}

/// Build the engine selected by configuration.
pub fn from_config(config: &EngineConfig) -> Arc<dyn RouteEngine> {
    match config.kind {
        EngineKind::GreatCircle => Arc::new(GreatCircleEngine::new(config.great_circle_points)),
        EngineKind::Command => Arc::new(CommandEngine::new(
            config.program.clone().unwrap_or_default(),
            config.args.clone(),
        )),
    }
}
