//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the route gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (host, port).
    pub listener: ListenerConfig,

    /// Worker pool size and restart policy.
    pub workers: WorkerConfig,

    /// Per-client admission control.
    pub rate_limit: RateLimitConfig,

    /// Route result cache.
    pub cache: CacheConfig,

    /// Route computation collaborator.
    pub engine: EngineConfig,

    /// HTTP limits and middleware toggles.
    pub http: HttpConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Interface to bind (e.g., "0.0.0.0").
    pub host: String,

    /// TCP port. Overridden by the `PORT` environment variable.
    pub port: u16,

    /// Set `SO_REUSEPORT` so sibling workers can share the port.
    pub reuse_port: bool,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            reuse_port: true,
        }
    }
}

impl ListenerConfig {
    /// The `host:port` string to bind.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Worker pool configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// Number of worker processes. `None` means one per available core.
    pub count: Option<usize>,

    /// Consecutive crashes tolerated before a slot is abandoned.
    pub max_restarts: u32,

    /// Base restart delay in milliseconds.
    pub restart_base_delay_ms: u64,

    /// Maximum restart delay in milliseconds.
    pub restart_max_delay_ms: u64,

    /// Uptime after which a worker's crash counter resets.
    pub stable_after_secs: u64,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            count: None,
            max_restarts: 10,
            restart_base_delay_ms: 100,
            restart_max_delay_ms: 30_000,
            stable_after_secs: 30,
        }
    }
}

impl WorkerConfig {
    /// Resolve the worker count, falling back to the host's core count.
    pub fn resolved_count(&self) -> usize {
        self.count.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
    }
}

/// Fixed-window admission control configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Enable admission control.
    pub enabled: bool,

    /// Requests admitted per client per window.
    pub max_requests: u32,

    /// Window length in milliseconds.
    pub window_ms: u64,

    /// Identify clients by the first `X-Forwarded-For` entry.
    pub trust_forwarded_for: bool,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_requests: 200,
            window_ms: 1000,
            trust_forwarded_for: false,
        }
    }
}

/// Route cache configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Enable the route cache.
    pub enabled: bool,

    /// Entry time-to-live in seconds.
    pub ttl_secs: u64,

    /// Interval between expiry sweeps in seconds.
    pub sweep_interval_secs: u64,

    /// Maximum number of entries held by one worker.
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_secs: 3600,
            sweep_interval_secs: 600,
            max_entries: 10_000,
        }
    }
}

/// Which route engine backs the computation adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineKind {
    /// Built-in great-circle network.
    GreatCircle,
    /// External routing program spoken to over stdin/stdout.
    Command,
}

/// Route engine configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Engine implementation.
    pub kind: EngineKind,

    /// Program to run for the `command` engine.
    pub program: Option<String>,

    /// Arguments passed to `program`.
    pub args: Vec<String>,

    /// Upper bound on waiting for one computation, in seconds.
    pub timeout_secs: u64,

    /// Intermediate points produced by the great-circle engine.
    pub great_circle_points: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            kind: EngineKind::GreatCircle,
            program: None,
            args: Vec::new(),
            timeout_secs: 30,
            great_circle_points: 64,
        }
    }
}

/// HTTP layer configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Maximum request body size in bytes.
    pub max_body_size: usize,

    /// Whole-request timeout in seconds.
    pub request_timeout_secs: u64,

    /// Allow cross-origin requests from any origin.
    pub cors_enabled: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            max_body_size: 64 * 1024,
            request_timeout_secs: 60,
            cors_enabled: true,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log format: "text" or "json".
    pub log_format: String,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Supervisor metrics port; worker `n` listens on `metrics_port + 1 + n`.
    pub metrics_port: u16,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "text".to_string(),
            metrics_enabled: false,
            metrics_port: 9090,
        }
    }
}
