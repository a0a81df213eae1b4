use std::path::Path;
use crate::errors::CoordError;
use super::types::AppConfig;
use super::schema::CONFIG_SCHEMA;
use tracing::{debug, warn};

pub const DEFAULT_CONFIG_FILE: &str = "agricoord.yaml";

/// Load the configuration for a command. An explicitly named file must
/// exist; otherwise `agricoord.yaml` in the working directory is used when
/// present and defaults apply when it is not.
pub async fn load_config(path: Option<&Path>) -> Result<AppConfig, CoordError> {
    match path {
        Some(p) => parse_config(p).await,
        None => {
            let fallback = Path::new(DEFAULT_CONFIG_FILE);
            if fallback.exists() {
                parse_config(fallback).await
            } else {
                debug!("No config file found, using defaults");
                Ok(AppConfig::default())
            }
        }
    }
}

pub async fn parse_config(path: &Path) -> Result<AppConfig, CoordError> {
    if !path.exists() {
        return Err(CoordError::Config(format!("Config file not found: {}", path.display())));
    }

    let metadata = tokio::fs::metadata(path).await?;
    if metadata.len() > 1_048_576 {
        return Err(CoordError::Config("Config file exceeds 1MB limit".into()));
    }

    let content = tokio::fs::read_to_string(path).await?;
    parse_config_str(&content)
}

pub fn parse_config_str(content: &str) -> Result<AppConfig, CoordError> {
    let yaml: serde_yaml::Value = serde_yaml::from_str(content)?;
    if yaml.is_null() {
        return Ok(AppConfig::default());
    }

    // JSON Schema validation
    validate_schema(&yaml)?;

    // Parse into typed config
    let config: AppConfig = serde_yaml::from_value(yaml)?;

    // Semantic conflict detection
    validate_conflicts(&config)?;

    Ok(config)
}

/// Validate config against the JSON schema for structural correctness.
fn validate_schema(yaml: &serde_yaml::Value) -> Result<(), CoordError> {
    let json_value = serde_json::to_value(yaml)
        .map_err(|e| CoordError::Config(format!("Config conversion error: {}", e)))?;

    let compiled = jsonschema::JSONSchema::compile(&CONFIG_SCHEMA)
        .map_err(|e| CoordError::Config(format!("Schema compilation error: {}", e)))?;

    if let Err(errors) = compiled.validate(&json_value) {
        // Advisory: typed parsing below is the hard gate
        for e in errors {
            warn!(validation_error = %format!("{} at {}", e, e.instance_path), "Config schema warning");
        }
    }

    Ok(())
}

/// Detect semantic conflicts in the parsed configuration.
fn validate_conflicts(config: &AppConfig) -> Result<(), CoordError> {
    if let Some(coord) = &config.coordinator {
        if let (Some(base_ms), Some(max_secs)) = (coord.backoff_base_ms, coord.backoff_max_secs) {
            if base_ms > max_secs.saturating_mul(1000) {
                return Err(CoordError::Config(format!(
                    "backoff_base_ms ({}) exceeds backoff_max_secs ({})", base_ms, max_secs
                )));
            }
        }
        if coord.sweep_batch_size == Some(0) {
            return Err(CoordError::Config("sweep_batch_size must be at least 1".into()));
        }
        if coord.default_max_retries.is_some_and(|n| n > 10) {
            return Err(CoordError::Config("default_max_retries must not exceed 10".into()));
        }
    }

    if let Some(inference) = &config.inference {
        let provider = inference.provider.as_deref().unwrap_or("openai");
        let has_key = inference.api_key.as_ref().is_some_and(|k| !k.is_empty());
        if provider == "openai" && !has_key {
            warn!("OpenAI inference configured without api_key");
        }
    }

    if let Some(notify) = &config.notifications {
        if notify.endpoint.is_some() && notify.server_key.is_none() {
            warn!("Push endpoint configured without server_key");
        }
    }

    Ok(())
}
