//! Pipeline orchestrator
//!
//! ```text
//! InputModeration ──unsafe──► SafetyTerminal
//!       │
//! ContextAugmentation → analyze → rank → plan → safety → Generation
//!       │                                                    │
//!       └────────────── any error ──► Fallback ◄─────────────┤
//!                                                            │
//!                                   OutputModeration ──unsafe──► rephrase
//!                                          │
//!                                        Done
//! ```
//!
//! Every request returns a well-formed [`PipelineResult`]; errors never reach
//! the caller, and a panic between augmentation and output moderation ends in
//! the fallback like any other error. No step is retried.

use crate::analysis::AnalyzeStage;
use crate::config::PipelineConfig;
use crate::planner::PlanResponseStage;
use crate::ranker::{ContextRanker, RankContextStage};
use crate::safety_pass::SafetyValidationStage;
use advisor_core::{
    AdvisorError, ChatMessage, ContextDocument, EmptyHistory, GenerationRequest, Generator,
    HistoryStore, PipelineOutcome, PipelineResult, PipelineState, ProviderError, RequestContext,
    ResponseMetadata, Retriever, StageRunner, StageTrace, Usage,
};
use advisor_out::{messages, PromptRenderer};
use advisor_policy::ModerationGate;
use advisor_usage::UsageTracker;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;

pub struct PipelineOrchestrator {
    gate: ModerationGate,
    generator: Arc<dyn Generator>,
    retriever: Option<Arc<dyn Retriever>>,
    history: Arc<dyn HistoryStore>,
    usage: Arc<UsageTracker>,
    renderer: PromptRenderer,
    planning: StageRunner,
    config: PipelineConfig,
}

impl PipelineOrchestrator {
    pub fn new(
        gate: ModerationGate,
        generator: Arc<dyn Generator>,
        usage: Arc<UsageTracker>,
    ) -> Result<Self, AdvisorError> {
        let renderer = PromptRenderer::builtin().map_err(|e| AdvisorError::Config(e.to_string()))?;
        let config = PipelineConfig::default();

        Ok(Self {
            gate,
            generator,
            retriever: None,
            history: Arc::new(EmptyHistory),
            usage,
            renderer,
            planning: planning_stages(&config),
            config,
        })
    }

    pub fn with_config(mut self, config: PipelineConfig) -> Self {
        self.planning = planning_stages(&config);
        self.config = config;
        self
    }

    pub fn with_retriever(mut self, retriever: Arc<dyn Retriever>) -> Self {
        self.retriever = Some(retriever);
        self
    }

    pub fn with_history(mut self, history: Arc<dyn HistoryStore>) -> Self {
        self.history = history;
        self
    }

    pub fn with_renderer(mut self, renderer: PromptRenderer) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn usage(&self) -> &Arc<UsageTracker> {
        &self.usage
    }

    /// Process a message, loading history for `ctx.conversation_id` if set
    pub async fn process(&self, message: &str, ctx: &RequestContext) -> PipelineResult {
        let span = tracing::info_span!("pipeline", trace_id = %ctx.trace_id);

        async {
            let history = match ctx.conversation_id {
                Some(id) => self.history.history(id).await,
                None => Ok(Vec::new()),
            };

            match history {
                Ok(history) => self.execute(PipelineState::new(message, history), ctx).await,
                Err(error) => {
                    let state = self.begin(PipelineState::new(message, Vec::new()), ctx);
                    fallback(state.metadata, error)
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Process a message against an already loaded history
    pub async fn process_with_history(
        &self,
        message: &str,
        history: Vec<ChatMessage>,
        ctx: &RequestContext,
    ) -> PipelineResult {
        let span = tracing::info_span!("pipeline", trace_id = %ctx.trace_id);
        self.execute(PipelineState::new(message, history), ctx)
            .instrument(span)
            .await
    }

    fn begin(&self, mut state: PipelineState, ctx: &RequestContext) -> PipelineState {
        state.metadata.trace_id = ctx.trace_id.clone();
        tracing::info!(
            digest = %state.metadata.message_digest,
            conversation_id = ?ctx.conversation_id,
            history = state.conversation_history.len(),
            "pipeline started"
        );
        state
    }

    async fn execute(&self, state: PipelineState, ctx: &RequestContext) -> PipelineResult {
        let started = Instant::now();
        let mut state = self.begin(state, ctx);

        let step = Instant::now();
        let verdict = self.gate.check_input(state.user_message()).await;
        record(&mut state, "moderate.input.v1", step);

        if !verdict.is_safe {
            tracing::info!(reason = %verdict.reason, "input blocked by moderation");
            state.response = messages::SAFETY_REFUSAL.to_string();
            state.is_safe = false;
            state.metadata.moderation_reason = Some(verdict.reason);
            state.metadata.outcome = PipelineOutcome::BlockedInput;
            return state.into_result();
        }

        let base = state.metadata.clone();
        let outcome = AssertUnwindSafe(self.run_stages(state))
            .catch_unwind()
            .await
            .unwrap_or_else(|payload| Err(AdvisorError::from_panic(payload)));
        let result = match outcome {
            Ok(state) => state.into_result(),
            Err(error) => fallback(base, error),
        };

        tracing::info!(
            outcome = result.metadata.outcome.as_str(),
            is_safe = result.is_safe,
            latency_ms = started.elapsed().as_millis() as u64,
            "pipeline finished"
        );
        result
    }

    /// Steps 2 to 5; any error here ends in the fallback reply
    async fn run_stages(&self, state: PipelineState) -> Result<PipelineState, AdvisorError> {
        let state = self.augment(state).await?;
        let state = self.planning.run(state)?;
        let state = self.compose_prompt(state)?;
        let state = self.generate(state).await?;
        Ok(self.moderate_output(state).await)
    }

    async fn augment(&self, mut state: PipelineState) -> Result<PipelineState, AdvisorError> {
        let step = Instant::now();

        if let Some(retriever) = &self.retriever {
            let documents = retriever
                .search(state.user_message(), self.config.retrieval_top_k)
                .await
                .map_err(|e| match e {
                    AdvisorError::Retrieval(_) => e,
                    other => AdvisorError::Retrieval(other.to_string()),
                })?;
            tracing::debug!(retrieved = documents.len(), "context retrieved");
            state.retrieved_context = documents.into_iter().map(ContextDocument::from).collect();
        }
        state.system_context = self.config.system_prompt.clone();

        record(&mut state, "augment.context.v1", step);
        Ok(state)
    }

    fn compose_prompt(&self, mut state: PipelineState) -> Result<PipelineState, AdvisorError> {
        state.system_context = self
            .renderer
            .system_context(
                &state.system_context,
                &state.retrieved_context,
                state.response_plan.as_ref(),
                state.analysis.as_ref(),
            )
            .map_err(|e| AdvisorError::Config(e.to_string()))?;
        Ok(state)
    }

    async fn generate(&self, mut state: PipelineState) -> Result<PipelineState, AdvisorError> {
        let step = Instant::now();

        let mut messages = Vec::with_capacity(self.config.history_window + 2);
        messages.push(ChatMessage::system(state.system_context.clone()));
        messages.extend_from_slice(state.recent_history(self.config.history_window));
        messages.push(ChatMessage::user(state.user_message()));

        let request = GenerationRequest {
            messages,
            model: self.config.model.clone(),
            max_tokens: Some(self.config.max_tokens),
            temperature: self.config.temperature,
        };

        let generation = self.generator.generate(request).await?;
        if generation.text.trim().is_empty() {
            return Err(ProviderError::Malformed("empty completion".to_string()).into());
        }

        let usage = Usage::new(generation.usage.prompt_tokens, generation.usage.completion_tokens);
        let cost = self
            .usage
            .track_chat_completion(usage.input_tokens, usage.output_tokens, &self.config.model);

        state.response = generation.text;
        state.metadata.usage = Some(usage);
        state.metadata.cost_usd = Some(cost);
        state.metadata.model = Some(if generation.model.is_empty() {
            self.config.model.clone()
        } else {
            generation.model
        });

        if state.response_plan.as_ref().is_some_and(|p| p.include_sources) {
            state.metadata.sources = state
                .retrieved_context
                .iter()
                .map(|doc| doc.source.clone())
                .collect();
        }

        tracing::debug!(
            input_tokens = usage.input_tokens,
            output_tokens = usage.output_tokens,
            cost_usd = cost,
            "response generated"
        );
        record(&mut state, "generate.response.v1", step);
        Ok(state)
    }

    async fn moderate_output(&self, mut state: PipelineState) -> PipelineState {
        let step = Instant::now();
        let verdict = self.gate.check_output(&state.response).await;
        record(&mut state, "moderate.output.v1", step);

        if !verdict.is_safe {
            tracing::info!(reason = %verdict.reason, "generated response blocked by moderation");
            state.response = messages::OUTPUT_REPHRASE.to_string();
            state.is_safe = false;
            state.metadata.moderation_reason = Some(verdict.reason);
            state.metadata.outcome = PipelineOutcome::BlockedOutput;
        }
        state
    }
}

fn planning_stages(config: &PipelineConfig) -> StageRunner {
    let ranker = ContextRanker::new(config.relevance_threshold, config.max_context_documents);

    StageRunner::new(vec![
        Box::new(AnalyzeStage::default()),
        Box::new(RankContextStage::new(ranker)),
        Box::new(PlanResponseStage::default()),
        Box::new(SafetyValidationStage),
    ])
}

fn record(state: &mut PipelineState, id: &str, started: Instant) {
    state.metadata.stages.push(StageTrace {
        id: id.to_string(),
        latency_ms: started.elapsed().as_millis() as u64,
    });
}

fn fallback(mut metadata: ResponseMetadata, error: AdvisorError) -> PipelineResult {
    tracing::error!(%error, "pipeline failed, returning fallback response");

    metadata.outcome = PipelineOutcome::Fallback;
    metadata.error = Some(error.to_string());
    metadata.error_kind = Some(error.failure_kind());

    PipelineResult {
        response: messages::FALLBACK.to_string(),
        is_safe: true,
        metadata,
    }
}
