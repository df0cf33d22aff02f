//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{Request, Response};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use searoute_gateway::engine::{EngineError, OceanicRoute, RouteEngine};
use searoute_gateway::route::{Coordinate, DistanceUnit};
use searoute_gateway::GatewayConfig;

pub const BOSTON: [f64; 2] = [-71.0589, 42.3601];
pub const LONDON: [f64; 2] = [-0.1278, 51.5074];

/// Engine with a canned answer that counts how often it is called.
pub struct CountingEngine {
    calls: AtomicUsize,
    path: Vec<Coordinate>,
    length: f64,
    failure: Option<String>,
    delay: Duration,
}

impl CountingEngine {
    pub fn new(path: Vec<Coordinate>, length: f64) -> Arc<Self> {
        Arc::new(Self::answering(path, length))
    }

    /// A transatlantic oceanic segment of 2846.5 units.
    pub fn atlantic() -> Arc<Self> {
        Arc::new(Self::atlantic_segment())
    }

    /// Holds every computation for `delay` before answering.
    pub fn slow(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            delay,
            ..Self::atlantic_segment()
        })
    }

    fn answering(path: Vec<Coordinate>, length: f64) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            path,
            length,
            failure: None,
            delay: Duration::ZERO,
        }
    }

    fn atlantic_segment() -> Self {
        Self::answering(
            vec![
                Coordinate::new(-69.5, 41.8),
                Coordinate::new(-50.0, 45.0),
                Coordinate::new(-20.0, 49.0),
                Coordinate::new(-5.5, 49.9),
            ],
            2846.5,
        )
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            path: Vec::new(),
            length: 0.0,
            failure: Some(message.to_string()),
            delay: Duration::ZERO,
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl RouteEngine for CountingEngine {
    fn name(&self) -> &'static str {
        "counting"
    }

    fn route(
        &self,
        _origin: Coordinate,
        _destination: Coordinate,
        _units: DistanceUnit,
    ) -> Result<OceanicRoute, EngineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        match &self.failure {
            Some(message) => Err(EngineError::Rejected(message.clone())),
            None => Ok(OceanicRoute {
                coordinates: self.path.clone(),
                length: self.length,
            }),
        }
    }
}

/// Defaults with a small admission ceiling and no CORS noise.
pub fn test_config() -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.rate_limit.max_requests = 5;
    config.http.cors_enabled = false;
    config
}

pub fn peer(ip: [u8; 4]) -> SocketAddr {
    SocketAddr::from((ip, 40000))
}

/// POST a JSON body to `/route` as if it came from `peer`.
pub async fn post_route(router: &Router, body: &Value, peer: SocketAddr) -> Response<Body> {
    post_raw(router, body.to_string(), peer).await
}

pub async fn post_raw(router: &Router, body: String, peer: SocketAddr) -> Response<Body> {
    let mut request = Request::builder()
        .method("POST")
        .uri("/route")
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap();
    request.extensions_mut().insert(ConnectInfo(peer));
    router.clone().oneshot(request).await.unwrap()
}

pub async fn get(router: &Router, uri: &str) -> Response<Body> {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    router.clone().oneshot(request).await.unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

/// Find a free local port by binding to port 0 and releasing it.
pub async fn free_port() -> u16 {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap().port()
}
