pub mod provider;
pub mod openai;
pub mod router;
pub mod types;

pub use provider::InferenceService;
pub use router::create_provider;
pub use types::InferenceRequest;
