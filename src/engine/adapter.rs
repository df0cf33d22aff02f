//! Route computation adapter.
//!
//! # Responsibilities
//! - Turn a blocking engine call into a single awaited operation
//! - Bound the wait with a timeout
//! - Splice the request endpoints onto the engine's oceanic segment
//!
//! # Design Decisions
//! - Engine runs on tokio's blocking pool, so the worker keeps serving
//! - No cancellation: on timeout or client disconnect the engine call
//!   still runs to completion and its result is discarded
//! - Results are all-or-nothing; a non-finite length is a failure

use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::engine::{EngineError, OceanicRoute, RouteEngine, RouteResult};
use crate::observability::metrics;
use crate::route::{Coordinate, DistanceUnit};

/// Why a route could not be computed.
#[derive(Debug, Error)]
pub enum ComputationError {
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error("route computation timed out after {0:?}")]
    Timeout(Duration),
    #[error("route engine panicked: {0}")]
    Panicked(String),
    #[error("route engine returned an invalid length: {0}")]
    InvalidLength(f64),
}

/// Uniform async front for a [`RouteEngine`].
#[derive(Clone)]
pub struct RouteComputer {
    engine: Arc<dyn RouteEngine>,
    timeout: Duration,
}

impl RouteComputer {
    pub fn new(engine: Arc<dyn RouteEngine>, timeout: Duration) -> Self {
        Self { engine, timeout }
    }

    /// Name of the underlying engine.
    pub fn engine_name(&self) -> &'static str {
        self.engine.name()
    }

    /// Compute a route, suspending until the engine answers or the timeout hits.
    pub async fn compute(
        &self,
        origin: Coordinate,
        destination: Coordinate,
        units: DistanceUnit,
    ) -> Result<RouteResult, ComputationError> {
        let start = Instant::now();
        let engine = self.engine.clone();
        let task = tokio::task::spawn_blocking(move || engine.route(origin, destination, units));

        let outcome = match tokio::time::timeout(self.timeout, task).await {
            Err(_) => Err(ComputationError::Timeout(self.timeout)),
            Ok(Err(join_error)) => Err(ComputationError::Panicked(join_error.to_string())),
            Ok(Ok(Err(engine_error))) => Err(ComputationError::Engine(engine_error)),
            Ok(Ok(Ok(oceanic))) => splice(origin, destination, oceanic),
        };

        metrics::record_computation(start.elapsed(), outcome.is_ok());
        outcome
    }
}

fn splice(
    origin: Coordinate,
    destination: Coordinate,
    oceanic: OceanicRoute,
) -> Result<RouteResult, ComputationError> {
    if !oceanic.length.is_finite() || oceanic.length < 0.0 {
        return Err(ComputationError::InvalidLength(oceanic.length));
    }

    let mut coordinates = Vec::with_capacity(oceanic.coordinates.len() + 2);
    coordinates.push(origin);
    coordinates.extend(oceanic.coordinates);
    coordinates.push(destination);

    Ok(RouteResult {
        coordinates,
        distance: oceanic.length,
    })
}
