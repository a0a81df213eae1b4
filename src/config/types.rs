use std::time::Duration;
use serde::{Deserialize, Serialize};
use crate::coordinator::{CoordinatorConfig, PeriodicIntervals};
use crate::errors::BackoffPolicy;
use crate::models::DEFAULT_MAX_RETRIES;

pub const DEFAULT_DB_PATH: &str = "./data/agricoord.db";
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct AppConfig {
    pub database: Option<DatabaseConfig>,
    pub coordinator: Option<CoordinatorSection>,
    pub inference: Option<InferenceConfig>,
    pub notifications: Option<NotificationConfig>,
    pub server: Option<ServerConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct DatabaseConfig {
    pub path: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct CoordinatorSection {
    pub default_max_retries: Option<u32>,
    pub backoff_base_ms: Option<u64>,
    pub backoff_max_secs: Option<u64>,
    pub backoff_jitter: Option<bool>,
    /// 0 disables the executor timeout.
    pub executor_timeout_secs: Option<u64>,
    pub sweep_batch_size: Option<usize>,
    pub sweep_interval_secs: Option<u64>,
    pub weather_lead_secs: Option<u64>,
    pub weather_check_interval_secs: Option<u64>,
    pub metrics_window: Option<usize>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct InferenceConfig {
    pub provider: Option<String>,
    pub model: Option<String>,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct NotificationConfig {
    pub endpoint: Option<String>,
    pub server_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct ServerConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
}

impl AppConfig {
    pub fn database_path(&self) -> String {
        self.database.as_ref()
            .and_then(|d| d.path.clone())
            .unwrap_or_else(|| DEFAULT_DB_PATH.to_string())
    }

    pub fn bind_address(&self) -> (String, u16) {
        let server = self.server.clone().unwrap_or_default();
        (
            server.host.unwrap_or_else(|| DEFAULT_HOST.to_string()),
            server.port.unwrap_or(DEFAULT_PORT),
        )
    }

    pub fn coordinator_config(&self) -> CoordinatorConfig {
        let section = self.coordinator.clone().unwrap_or_default();
        let defaults = CoordinatorConfig::default();
        CoordinatorConfig {
            default_max_retries: section.default_max_retries.unwrap_or(DEFAULT_MAX_RETRIES),
            backoff: BackoffPolicy {
                base: section.backoff_base_ms.map(Duration::from_millis).unwrap_or(defaults.backoff.base),
                max: section.backoff_max_secs.map(Duration::from_secs).unwrap_or(defaults.backoff.max),
                jitter: section.backoff_jitter.unwrap_or(defaults.backoff.jitter),
            },
            executor_timeout: match section.executor_timeout_secs {
                Some(0) => None,
                Some(secs) => Some(Duration::from_secs(secs)),
                None => defaults.executor_timeout,
            },
            sweep_batch_size: section.sweep_batch_size.unwrap_or(defaults.sweep_batch_size),
            weather_lead: section.weather_lead_secs.map(Duration::from_secs).unwrap_or(defaults.weather_lead),
            metrics_window: section.metrics_window.unwrap_or(defaults.metrics_window),
        }
    }

    pub fn periodic_intervals(&self) -> PeriodicIntervals {
        let section = self.coordinator.clone().unwrap_or_default();
        PeriodicIntervals {
            sweep: Duration::from_secs(section.sweep_interval_secs.unwrap_or(60).max(1)),
            weather: Duration::from_secs(section.weather_check_interval_secs.unwrap_or(21_600).max(1)),
        }
    }
}
