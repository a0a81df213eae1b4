use std::sync::Arc;
use crate::errors::CoordError;
use super::provider::InferenceService;
use super::openai::OpenAIProvider;

pub const LOCAL_BASE_URL: &str = "http://localhost:11434/v1";

pub fn create_provider(
    provider_name: &str,
    api_key: &str,
    model: Option<&str>,
    base_url: Option<&str>,
) -> Result<Arc<dyn InferenceService>, CoordError> {
    match provider_name {
        "openai" => {
            if api_key.is_empty() {
                return Err(CoordError::Config("openai provider requires an api_key".into()));
            }
            match base_url {
                Some(url) => Ok(Arc::new(OpenAIProvider::with_base_url(
                    api_key, model.unwrap_or("gpt-4o"), url, "openai",
                ))),
                None => Ok(Arc::new(OpenAIProvider::new(api_key, model))),
            }
        }
        "local" => Ok(Arc::new(OpenAIProvider::with_base_url(
            api_key,
            model.unwrap_or("llava"),
            base_url.unwrap_or(LOCAL_BASE_URL),
            "local",
        ))),
        _ => Err(CoordError::Config(format!("Unknown inference provider: {}", provider_name))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_providers() {
        let p = create_provider("openai", "sk-test", Some("gpt-4o-mini"), None).unwrap();
        assert_eq!(p.provider_name(), "openai");
        assert_eq!(p.model_name(), "gpt-4o-mini");

        let p = create_provider("local", "", None, None).unwrap();
        assert_eq!(p.provider_name(), "local");
        assert_eq!(p.model_name(), "llava");
    }

    #[test]
    fn test_provider_errors() {
        assert!(matches!(create_provider("openai", "", None, None), Err(CoordError::Config(_))));
        assert!(matches!(create_provider("gemini", "k", None, None), Err(CoordError::Config(_))));
    }
}
