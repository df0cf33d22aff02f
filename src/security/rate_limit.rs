//! Fixed-window admission control.
//!
//! Every client of a worker shares the same window boundaries: the whole
//! counter table is cleared on each tick rather than expiring per key.
//! Counters are worker-local, so across `n` workers one client may be
//! admitted up to `n × max_requests` times per window.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::http::HeaderMap;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};

use crate::config::RateLimitConfig;
use crate::observability::metrics;

/// Outcome of an admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Admit,
    Reject,
}

/// Per-worker request counters.
#[derive(Clone)]
pub struct RateLimiter {
    counts: Arc<Mutex<HashMap<String, u32>>>,
    max_requests: u32,
    window: Duration,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            counts: Arc::new(Mutex::new(HashMap::new())),
            max_requests,
            window,
        }
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(config.max_requests, Duration::from_millis(config.window_ms))
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Count a request from `client` and decide whether to admit it.
    pub fn check(&self, client: &str) -> Admission {
        let mut counts = self.counts.lock().expect("rate limiter mutex poisoned");
        let count = match counts.get_mut(client) {
            Some(count) => {
                *count = count.saturating_add(1);
                *count
            }
            None => {
                counts.insert(client.to_string(), 1);
                1
            }
        };

        if count > self.max_requests {
            metrics::record_rate_limited();
            Admission::Reject
        } else {
            Admission::Admit
        }
    }

    /// Requests counted for `client` in the current window.
    pub fn count(&self, client: &str) -> u32 {
        let counts = self.counts.lock().expect("rate limiter mutex poisoned");
        counts.get(client).copied().unwrap_or(0)
    }

    /// Start a new window for every client.
    pub fn reset(&self) {
        self.counts.lock().expect("rate limiter mutex poisoned").clear();
    }

    /// Spawn the window reset timer on the current runtime.
    pub fn spawn_reset(&self, mut shutdown: broadcast::Receiver<()>) -> JoinHandle<()> {
        let limiter = self.clone();
        let period = self.window;
        tokio::spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + period, period);
            loop {
                tokio::select! {
                    _ = ticker.tick() => limiter.reset(),
                    _ = shutdown.recv() => break,
                }
            }
        })
    }
}

/// Identify the calling client.
///
/// Uses the peer IP, or the first `X-Forwarded-For` hop when the gateway sits
/// behind a trusted proxy.
pub fn client_key(peer: Option<SocketAddr>, headers: &HeaderMap, trust_forwarded_for: bool) -> String {
    if trust_forwarded_for {
        let forwarded = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty());
        if let Some(ip) = forwarded {
            return ip.to_string();
        }
    }

    peer.map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
