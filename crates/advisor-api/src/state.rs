use crate::config::{has_usable_api_key, ServiceConfig};
use crate::metrics::ApiMetrics;
use advisor_core::{AdvisorError, ProviderError};
use advisor_out::{OutError, PromptRenderer};
use advisor_policy::ModerationGate;
use advisor_provider::OpenAiClient;
use advisor_stages::PipelineOrchestrator;
use advisor_usage::UsageTracker;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StartupError {
    #[error("metrics registry: {0}")]
    Metrics(#[from] prometheus::Error),

    #[error("provider client: {0}")]
    Provider(#[from] ProviderError),

    #[error("pipeline: {0}")]
    Pipeline(#[from] AdvisorError),

    #[error("prompt templates: {0}")]
    Templates(#[from] OutError),
}

/// Shared handler state; cheap to clone
#[derive(Clone)]
pub struct AppState {
    /// `None` when no usable provider key is configured
    pub orchestrator: Option<Arc<PipelineOrchestrator>>,
    pub usage: Arc<UsageTracker>,
    pub metrics: Arc<ApiMetrics>,
    pub api_key: Arc<str>,
    pub daily_budget: f64,
}

impl AppState {
    /// Wire the pipeline against the configured provider
    pub fn from_config(config: &ServiceConfig) -> Result<Self, StartupError> {
        let usage = Arc::new(UsageTracker::with_prices(config.price_table()));

        let orchestrator = if has_usable_api_key(&config.provider.api_key) {
            let client = Arc::new(
                OpenAiClient::new(config.provider.api_key.clone())?
                    .with_base_url(config.provider.base_url.clone())
                    .with_timeout(Duration::from_secs(config.provider.timeout_secs)),
            );
            let gate = ModerationGate::new(client.clone(), client.clone())
                .with_config(config.moderation.clone())
                .with_usage_tracker(usage.clone());
            let mut orchestrator = PipelineOrchestrator::new(gate, client, usage.clone())?
                .with_config(config.pipeline.clone());
            if let Some(path) = &config.templates {
                tracing::info!(path = %path, "loading prompt templates");
                orchestrator = orchestrator.with_renderer(PromptRenderer::load(path)?);
            }
            Some(Arc::new(orchestrator))
        } else {
            tracing::warn!("no usable OpenAI API key configured, chat will answer with a notice");
            None
        };

        Self::new(orchestrator, usage, config)
    }

    /// State around an already built orchestrator
    pub fn new(
        orchestrator: Option<Arc<PipelineOrchestrator>>,
        usage: Arc<UsageTracker>,
        config: &ServiceConfig,
    ) -> Result<Self, StartupError> {
        Ok(Self {
            orchestrator,
            usage,
            metrics: Arc::new(ApiMetrics::new()?),
            api_key: Arc::from(config.provider.api_key.trim()),
            daily_budget: config.budget.daily_budget,
        })
    }
}
