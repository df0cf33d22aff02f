//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::GatewayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid value for {name}: {value:?}")]
    Env { name: &'static str, value: String },
    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<GatewayConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: GatewayConfig = toml::from_str(&content)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Resolve the effective configuration: file (or defaults), then environment.
///
/// `PORT` and `WORKERS` override the corresponding file values.
pub fn resolve_config(path: Option<&Path>) -> Result<GatewayConfig, ConfigError> {
    let config = match path {
        Some(path) => load_config(path)?,
        None => GatewayConfig::default(),
    };
    apply_env_overrides(config, |name| std::env::var(name).ok())
}

/// Apply environment overrides using the given variable lookup.
pub fn apply_env_overrides<F>(mut config: GatewayConfig, lookup: F) -> Result<GatewayConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = lookup("PORT") {
        config.listener.port = value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Env { name: "PORT", value })?;
    }

    if let Some(value) = lookup("WORKERS") {
        let count: usize = value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Env { name: "WORKERS", value })?;
        config.workers.count = Some(count);
    }

    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_port_override() {
        let config = apply_env_overrides(GatewayConfig::default(), env(&[("PORT", "8088")])).unwrap();
        assert_eq!(config.listener.port, 8088);
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        let err = apply_env_overrides(GatewayConfig::default(), env(&[("PORT", "harbour")])).unwrap_err();
        assert!(matches!(err, ConfigError::Env { name: "PORT", .. }));
    }

    #[test]
    fn test_invalid_workers_reports_raw_value() {
        let err = apply_env_overrides(GatewayConfig::default(), env(&[("WORKERS", " many ")])).unwrap_err();
        match err {
            ConfigError::Env { name, value } => {
                assert_eq!(name, "WORKERS");
                assert_eq!(value, " many ");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_zero_workers_fails_validation() {
        let err = apply_env_overrides(GatewayConfig::default(), env(&[("WORKERS", "0")])).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("workers.count"));
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!("searoute-gateway-{}.toml", std::process::id()));
        fs::write(&path, "[listener]\nport = 4100\n\n[cache]\nttl_secs = 60\n").unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.listener.port, 4100);
        assert_eq!(config.cache.ttl_secs, 60);

        fs::remove_file(&path).unwrap_or_default();
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_config(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
