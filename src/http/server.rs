//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Build the per-worker state (cache, admission counters, engine adapter)
//! - Create the Axum router with its handlers
//! - Wire up middleware (tracing, request ID, timeout, body limit, CORS)
//! - Run the background timers that belong to the worker state
//! - Serve until shutdown, then drain

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::extract::DefaultBodyLimit;
use axum::http::{Request, StatusCode};
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::cache::RouteCache;
use crate::config::GatewayConfig;
use crate::engine::{self, RouteComputer, RouteEngine};
use crate::http::handlers;
use crate::http::request::{request_id, UuidRequestId};
use crate::lifecycle::Shutdown;
use crate::security::RateLimiter;

/// Worker-local state injected into handlers.
///
/// Each worker process builds exactly one; nothing in it is shared across
/// processes.
#[derive(Clone)]
pub struct AppState {
    pub cache: Option<RouteCache>,
    pub limiter: Option<RateLimiter>,
    pub computer: RouteComputer,
    pub trust_forwarded_for: bool,
}

impl AppState {
    /// Build state around an explicit engine.
    pub fn with_engine(config: &GatewayConfig, engine: Arc<dyn RouteEngine>) -> Self {
        Self {
            cache: config
                .cache
                .enabled
                .then(|| RouteCache::from_config(&config.cache)),
            limiter: config
                .rate_limit
                .enabled
                .then(|| RateLimiter::from_config(&config.rate_limit)),
            computer: RouteComputer::new(engine, Duration::from_secs(config.engine.timeout_secs)),
            trust_forwarded_for: config.rate_limit.trust_forwarded_for,
        }
    }
}

/// HTTP server for one worker.
pub struct GatewayServer {
    router: Router,
    state: AppState,
    config: GatewayConfig,
}

impl GatewayServer {
    /// Create a server using the engine selected in the configuration.
    pub fn new(config: GatewayConfig) -> Self {
        let engine = engine::from_config(&config.engine);
        Self::with_engine(config, engine)
    }

    /// Create a server around an explicit engine.
    pub fn with_engine(config: GatewayConfig, engine: Arc<dyn RouteEngine>) -> Self {
        let state = AppState::with_engine(&config, engine);
        let router = Self::build_router(&config, state.clone());
        Self {
            router,
            state,
            config,
        }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        let router = Router::new()
            .route("/route", post(handlers::route))
            .route("/health", get(handlers::health))
            .with_state(state)
            .layer(DefaultBodyLimit::max(config.http.max_body_size))
            .layer(TimeoutLayer::with_status_code(
                StatusCode::REQUEST_TIMEOUT,
                Duration::from_secs(config.http.request_timeout_secs),
            ))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    path = %request.uri().path(),
                    request_id = %request_id(request.headers()),
                )
            }))
            .layer(SetRequestIdLayer::x_request_id(UuidRequestId));

        if config.http.cors_enabled {
            router.layer(CorsLayer::permissive())
        } else {
            router
        }
    }

    /// The router, for driving the server without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// The worker state behind the router.
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Spawn the cache sweep and rate-window reset timers.
    pub fn spawn_background(&self, shutdown: &Shutdown) {
        if let Some(cache) = &self.state.cache {
            cache.spawn_sweeper(
                Duration::from_secs(self.config.cache.sweep_interval_secs),
                shutdown.subscribe(),
            );
        }
        if let Some(limiter) = &self.state.limiter {
            limiter.spawn_reset(shutdown.subscribe());
        }
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener, shutdown: &Shutdown) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            engine = self.state.computer.engine_name(),
            "HTTP server starting"
        );

        self.spawn_background(shutdown);

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();
        let mut stop = shutdown.subscribe();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = stop.recv().await;
                tracing::info!("Shutdown signal received, draining connections");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
