use std::sync::Arc;
use crate::llm::InferenceService;
use crate::models::AgentType;
use crate::notify::NotificationService;
use super::diagnostic::DiagnosticExecutor;
use super::executor::AgentExecutor;
use super::image::ImageProcessingExecutor;
use super::marketplace::MarketplaceExecutor;
use super::treatment::TreatmentPlanExecutor;
use super::weather::WeatherAlertExecutor;

/// One executor per agent type. Lookup is an exhaustive match, so adding an
/// `AgentType` variant will not compile until it has an executor here.
#[derive(Clone)]
pub struct ExecutorRegistry {
    diagnostic: Arc<dyn AgentExecutor>,
    treatment_plan: Arc<dyn AgentExecutor>,
    weather_alert: Arc<dyn AgentExecutor>,
    marketplace: Arc<dyn AgentExecutor>,
    image_processing: Arc<dyn AgentExecutor>,
}

impl ExecutorRegistry {
    /// The production set, all backed by the same inference service.
    pub fn with_inference(
        llm: Arc<dyn InferenceService>,
        notifier: Arc<dyn NotificationService>,
    ) -> Self {
        Self {
            diagnostic: Arc::new(DiagnosticExecutor::new(llm.clone())),
            treatment_plan: Arc::new(TreatmentPlanExecutor::new(llm.clone())),
            weather_alert: Arc::new(WeatherAlertExecutor::new(llm.clone(), notifier)),
            marketplace: Arc::new(MarketplaceExecutor::new(llm.clone())),
            image_processing: Arc::new(ImageProcessingExecutor::new(llm)),
        }
    }

    /// The same executor for every agent type.
    pub fn uniform(executor: Arc<dyn AgentExecutor>) -> Self {
        Self {
            diagnostic: executor.clone(),
            treatment_plan: executor.clone(),
            weather_alert: executor.clone(),
            marketplace: executor.clone(),
            image_processing: executor,
        }
    }

    /// Replace the executor for one agent type.
    pub fn with(mut self, agent_type: AgentType, executor: Arc<dyn AgentExecutor>) -> Self {
        match agent_type {
            AgentType::Diagnostic => self.diagnostic = executor,
            AgentType::TreatmentPlan => self.treatment_plan = executor,
            AgentType::WeatherAlert => self.weather_alert = executor,
            AgentType::Marketplace => self.marketplace = executor,
            AgentType::ImageProcessing => self.image_processing = executor,
        }
        self
    }

    pub fn get(&self, agent_type: AgentType) -> &Arc<dyn AgentExecutor> {
        match agent_type {
            AgentType::Diagnostic => &self.diagnostic,
            AgentType::TreatmentPlan => &self.treatment_plan,
            AgentType::WeatherAlert => &self.weather_alert,
            AgentType::Marketplace => &self.marketplace,
            AgentType::ImageProcessing => &self.image_processing,
        }
    }
}
