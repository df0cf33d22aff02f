//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → environment overrides (PORT, WORKERS)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig (validated, immutable)
//!     → supervisor passes the file path to every worker, which resolves it again
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, resolve_config, ConfigError};
pub use schema::{
    CacheConfig, EngineConfig, EngineKind, GatewayConfig, HttpConfig, ListenerConfig,
    ObservabilityConfig, RateLimitConfig, WorkerConfig,
};
pub use validation::ValidationError;
