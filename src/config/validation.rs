//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (windows > 0, ttl > 0, delays ordered)
//! - Check that the selected engine has what it needs
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use thiserror::Error;

use crate::config::schema::{EngineKind, GatewayConfig};

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: &'static str,
    /// What is wrong with it.
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Validate a parsed configuration, collecting every error.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.host.trim().is_empty() {
        errors.push(ValidationError::new("listener.host", "must not be empty"));
    }

    if config.workers.count == Some(0) {
        errors.push(ValidationError::new("workers.count", "must be at least 1"));
    }
    if config.workers.restart_base_delay_ms > config.workers.restart_max_delay_ms {
        errors.push(ValidationError::new(
            "workers.restart_base_delay_ms",
            "must not exceed workers.restart_max_delay_ms",
        ));
    }

    if config.rate_limit.enabled {
        if config.rate_limit.max_requests == 0 {
            errors.push(ValidationError::new("rate_limit.max_requests", "must be at least 1"));
        }
        if config.rate_limit.window_ms == 0 {
            errors.push(ValidationError::new("rate_limit.window_ms", "must be greater than 0"));
        }
    }

    if config.cache.enabled {
        if config.cache.ttl_secs == 0 {
            errors.push(ValidationError::new("cache.ttl_secs", "must be greater than 0"));
        }
        if config.cache.sweep_interval_secs == 0 {
            errors.push(ValidationError::new(
                "cache.sweep_interval_secs",
                "must be greater than 0",
            ));
        }
        if config.cache.max_entries == 0 {
            errors.push(ValidationError::new("cache.max_entries", "must be at least 1"));
        }
    }

    if config.engine.timeout_secs == 0 {
        errors.push(ValidationError::new("engine.timeout_secs", "must be greater than 0"));
    }
    match config.engine.kind {
        EngineKind::Command => {
            let missing = config
                .engine
                .program
                .as_deref()
                .map(|p| p.trim().is_empty())
                .unwrap_or(true);
            if missing {
                errors.push(ValidationError::new(
                    "engine.program",
                    "required when engine.kind = \"command\"",
                ));
            }
        }
        EngineKind::GreatCircle => {
            if config.engine.great_circle_points == 0 {
                errors.push(ValidationError::new(
                    "engine.great_circle_points",
                    "must be at least 1",
                ));
            }
        }
    }

    if config.http.max_body_size == 0 {
        errors.push(ValidationError::new("http.max_body_size", "must be greater than 0"));
    }
    if config.http.request_timeout_secs == 0 {
        errors.push(ValidationError::new(
            "http.request_timeout_secs",
            "must be greater than 0",
        ));
    }
    if config.engine.timeout_secs >= config.http.request_timeout_secs {
        errors.push(ValidationError::new(
            "engine.timeout_secs",
            format!(
                "must be less than http.request_timeout_secs ({})",
                config.http.request_timeout_secs
            ),
        ));
    }

    match config.observability.log_format.as_str() {
        "text" | "json" => {}
        other => errors.push(ValidationError::new(
            "observability.log_format",
            format!("unknown format {:?}, expected \"text\" or \"json\"", other),
        )),
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
