use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};
use crate::agents::ExecutorRegistry;
use crate::config::{load_config, resolve_credential, AppConfig};
use crate::coordinator::Coordinator;
use crate::db::{Database, DocumentStore, ProfileStore};
use crate::errors::CoordError;
use crate::llm::{self, InferenceService};
use crate::notify::{LogNotifier, NotificationService, PushNotifier};

/// Everything a command needs, wired from the configuration.
pub struct Runtime {
    pub config: AppConfig,
    pub coordinator: Arc<Coordinator>,
}

pub async fn build_runtime(config_path: Option<&Path>, db_override: Option<&str>) -> Result<Runtime, CoordError> {
    let config = load_config(config_path).await?;

    let db_path = db_override.map(str::to_string).unwrap_or_else(|| config.database_path());
    let db = Database::new(&db_path)?;
    info!(path = %db_path, "Database opened");
    let store: Arc<dyn DocumentStore> = Arc::new(db);

    let inference = build_inference(&config)?;
    let notifier = build_notifier(&config, ProfileStore::new(store.clone()));
    let executors = ExecutorRegistry::with_inference(inference, notifier);

    let coordinator = Coordinator::new(store, executors, config.coordinator_config());
    Ok(Runtime { config, coordinator })
}

fn build_inference(config: &AppConfig) -> Result<Arc<dyn InferenceService>, CoordError> {
    let section = config.inference.clone().unwrap_or_default();
    let provider = section.provider.as_deref().unwrap_or("local");
    let api_key = section.api_key.as_deref()
        .map(resolve_credential)
        .or_else(|| (provider == "openai").then(|| std::env::var("OPENAI_API_KEY").ok()).flatten())
        .unwrap_or_default();

    let service = llm::create_provider(provider, &api_key, section.model.as_deref(), section.base_url.as_deref())?;
    info!(provider = service.provider_name(), model = service.model_name(), "Inference service ready");
    Ok(service)
}

fn build_notifier(config: &AppConfig, profiles: ProfileStore) -> Arc<dyn NotificationService> {
    let section = config.notifications.clone().unwrap_or_default();
    match section.endpoint {
        Some(endpoint) => {
            let key = section.server_key.as_deref().map(resolve_credential).unwrap_or_default();
            if key.is_empty() {
                warn!("Push endpoint has no server key; requests will likely be rejected");
            }
            Arc::new(PushNotifier::new(&endpoint, &key, profiles))
        }
        None => {
            info!("No push endpoint configured, notifications go to the log");
            Arc::new(LogNotifier)
        }
    }
}
