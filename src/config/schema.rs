use serde_json::{json, Value};
use std::sync::LazyLock;

pub static CONFIG_SCHEMA: LazyLock<Value> = LazyLock::new(|| {
    json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "type": "object",
        "additionalProperties": false,
        "properties": {
            "database": {
                "type": "object",
                "properties": {
                    "path": { "type": "string" }
                }
            },
            "coordinator": {
                "type": "object",
                "properties": {
                    "default_max_retries": { "type": "integer", "minimum": 0, "maximum": 10 },
                    "backoff_base_ms": { "type": "integer", "minimum": 1 },
                    "backoff_max_secs": { "type": "integer", "minimum": 1 },
                    "backoff_jitter": { "type": "boolean" },
                    "executor_timeout_secs": { "type": "integer", "minimum": 0 },
                    "sweep_batch_size": { "type": "integer", "minimum": 1 },
                    "sweep_interval_secs": { "type": "integer", "minimum": 1 },
                    "weather_lead_secs": { "type": "integer", "minimum": 0 },
                    "weather_check_interval_secs": { "type": "integer", "minimum": 1 },
                    "metrics_window": { "type": "integer", "minimum": 1 }
                }
            },
            "inference": {
                "type": "object",
                "properties": {
                    "provider": { "type": "string", "enum": ["openai", "local"] },
                    "model": { "type": "string" },
                    "api_key": { "type": "string" },
                    "base_url": { "type": "string", "format": "uri" }
                }
            },
            "notifications": {
                "type": "object",
                "properties": {
                    "endpoint": { "type": "string", "format": "uri" },
                    "server_key": { "type": "string" }
                }
            },
            "server": {
                "type": "object",
                "properties": {
                    "host": { "type": "string" },
                    "port": { "type": "integer", "minimum": 1, "maximum": 65535 }
                }
            }
        }
    })
});
