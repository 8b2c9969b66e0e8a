use advisor_core::mock::{
    generation, ScriptedClassifier, ScriptedGenerator, StaticHistory, StaticRetriever,
};
use advisor_core::{
    AdvisorError, ChatMessage, FailureKind, Generation, GenerationRequest, Generator,
    HistoryStore, PipelineOutcome, ProviderError, RequestContext, ResponseStrategy,
    RetrievedDocument, Retriever, Role,
};
use advisor_out::messages;
use advisor_policy::ModerationGate;
use advisor_stages::{PipelineConfig, PipelineOrchestrator};
use advisor_usage::UsageTracker;
use async_trait::async_trait;
use std::sync::Arc;

const QUESTION: &str = "My 3 year old won't sleep, what routine helps?";

struct Harness {
    classifier: Arc<ScriptedClassifier>,
    judge: Arc<ScriptedGenerator>,
    generator: Arc<ScriptedGenerator>,
    usage: Arc<UsageTracker>,
}

impl Harness {
    fn new(classifier: ScriptedClassifier, generator: ScriptedGenerator) -> Self {
        Self {
            classifier: Arc::new(classifier),
            judge: Arc::new(ScriptedGenerator::replying("SAFE")),
            generator: Arc::new(generator),
            usage: Arc::new(UsageTracker::new()),
        }
    }

    fn with_judge(mut self, judge: ScriptedGenerator) -> Self {
        self.judge = Arc::new(judge);
        self
    }

    fn orchestrator(&self) -> PipelineOrchestrator {
        let gate = ModerationGate::new(self.classifier.clone(), self.judge.clone());
        PipelineOrchestrator::new(gate, self.generator.clone(), self.usage.clone()).unwrap()
    }
}

fn sleep_docs() -> Vec<RetrievedDocument> {
    vec![
        RetrievedDocument {
            content: "A predictable bedtime routine helps toddlers sleep".to_string(),
            source: "Sleep Guide".to_string(),
        },
        RetrievedDocument {
            content: "Quick weeknight pasta recipes".to_string(),
            source: "Cookbook".to_string(),
        },
    ]
}

/// History store whose lookups always fail
struct BrokenHistory;

#[async_trait]
impl HistoryStore for BrokenHistory {
    async fn history(&self, _conversation_id: i64) -> Result<Vec<ChatMessage>, AdvisorError> {
        Err(AdvisorError::History("database unavailable".to_string()))
    }
}

/// Retriever whose searches always fail
struct BrokenRetriever;

#[async_trait]
impl Retriever for BrokenRetriever {
    async fn search(&self, _query: &str, _top_k: usize) -> Result<Vec<RetrievedDocument>, AdvisorError> {
        Err(AdvisorError::Config("index not built".to_string()))
    }
}

/// Generator with a bug
struct PanickingGenerator;

#[async_trait]
impl Generator for PanickingGenerator {
    async fn generate(&self, _request: GenerationRequest) -> Result<Generation, ProviderError> {
        panic!("generator bug")
    }
}

#[tokio::test]
async fn test_completed_run_populates_result() {
    let harness = Harness::new(
        ScriptedClassifier::clean(),
        ScriptedGenerator::replying("Try a consistent wind-down routine."),
    );
    let ctx = RequestContext::new();

    let result = harness.orchestrator().process(QUESTION, &ctx).await;

    assert!(result.is_safe);
    assert_eq!(result.response, "Try a consistent wind-down routine.");
    assert_eq!(result.metadata.outcome, PipelineOutcome::Completed);
    assert_eq!(result.metadata.trace_id, ctx.trace_id);
    assert_eq!(result.metadata.model.as_deref(), Some("scripted"));
    assert!(result.metadata.error.is_none());

    let usage = result.metadata.usage.unwrap();
    assert_eq!(usage.input_tokens, 100);
    assert_eq!(usage.output_tokens, 50);
    assert_eq!(usage.total_tokens, usage.input_tokens + usage.output_tokens);

    // gpt-4: 0.1 * 0.03 + 0.05 * 0.06
    let cost = result.metadata.cost_usd.unwrap();
    assert!((cost - 0.006).abs() < 1e-9);
    assert_eq!(harness.usage.session_summary().total_calls, 1);

    let analysis = result.metadata.analysis.unwrap();
    assert_eq!(analysis.child_age.as_deref(), Some("3"));

    let stages: Vec<&str> = result.metadata.stages.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(
        stages,
        vec![
            "moderate.input.v1",
            "augment.context.v1",
            "analyze.query.v1",
            "rank.context.v1",
            "plan.response.v1",
            "policy.safety.v1",
            "generate.response.v1",
            "moderate.output.v1",
        ]
    );
}

#[tokio::test]
async fn test_result_serializes_to_three_fields() {
    let harness = Harness::new(ScriptedClassifier::clean(), ScriptedGenerator::replying("Hi."));
    let result = harness.orchestrator().process(QUESTION, &RequestContext::new()).await;

    let json = serde_json::to_value(&result).unwrap();
    let mut keys: Vec<&String> = json.as_object().unwrap().keys().collect();
    keys.sort();
    assert_eq!(keys, vec!["is_safe", "metadata", "response"]);
}

#[tokio::test]
async fn test_flagged_input_never_reaches_generator() {
    let harness = Harness::new(ScriptedClassifier::flagging(), ScriptedGenerator::replying("unused"));

    let result = harness.orchestrator().process("something awful", &RequestContext::new()).await;

    assert!(!result.is_safe);
    assert_eq!(result.response, messages::SAFETY_REFUSAL);
    assert_eq!(result.metadata.outcome, PipelineOutcome::BlockedInput);
    assert_eq!(result.metadata.moderation_reason.as_deref(), Some("flagged by moderation"));
    assert_eq!(harness.generator.calls(), 0);
    assert_eq!(harness.judge.calls(), 0);
    assert!(result.metadata.usage.is_none());
    assert_eq!(harness.usage.session_summary().total_calls, 0);
}

#[tokio::test]
async fn test_judgment_can_block_input() {
    let harness = Harness::new(ScriptedClassifier::clean(), ScriptedGenerator::replying("unused"))
        .with_judge(ScriptedGenerator::replying("UNSAFE: not a parenting question"));

    let result = harness.orchestrator().process("write my essay", &RequestContext::new()).await;

    assert!(!result.is_safe);
    assert_eq!(result.metadata.moderation_reason.as_deref(), Some("not a parenting question"));
    assert_eq!(harness.generator.calls(), 0);
}

#[tokio::test]
async fn test_moderation_failure_fails_open() {
    let harness = Harness::new(
        ScriptedClassifier::failing(ProviderError::Unavailable("timeout".into())),
        ScriptedGenerator::replying("Keep naps short."),
    );

    let result = harness.orchestrator().process(QUESTION, &RequestContext::new()).await;

    assert!(result.is_safe);
    assert_eq!(result.response, "Keep naps short.");
    assert_eq!(result.metadata.outcome, PipelineOutcome::Completed);
    assert_eq!(harness.generator.calls(), 1);
    assert_eq!(harness.classifier.calls(), 2);
}

#[tokio::test]
async fn test_generation_failure_returns_fallback() {
    let harness = Harness::new(
        ScriptedClassifier::clean(),
        ScriptedGenerator::failing(ProviderError::Auth("invalid api key".into())),
    );

    let result = harness.orchestrator().process(QUESTION, &RequestContext::new()).await;

    assert!(result.is_safe);
    assert_eq!(result.response, messages::FALLBACK);
    assert_eq!(result.metadata.outcome, PipelineOutcome::Fallback);
    assert_eq!(result.metadata.error_kind, Some(FailureKind::Auth));
    assert!(result.metadata.error.unwrap().contains("invalid api key"));
    assert_eq!(harness.generator.calls(), 1);
    // no output check after a failed generation
    assert_eq!(harness.classifier.calls(), 1);
}

#[tokio::test]
async fn test_empty_completion_returns_fallback() {
    let harness = Harness::new(ScriptedClassifier::clean(), ScriptedGenerator::replying("   "));

    let result = harness.orchestrator().process(QUESTION, &RequestContext::new()).await;

    assert_eq!(result.response, messages::FALLBACK);
    assert_eq!(result.metadata.error_kind, Some(FailureKind::Other));
    assert!(!result.response.is_empty());
}

#[tokio::test]
async fn test_flagged_output_is_replaced() {
    let harness = Harness::new(
        ScriptedClassifier::flag_containing("forbidden"),
        ScriptedGenerator::replying("Some forbidden advice"),
    );

    let result = harness.orchestrator().process(QUESTION, &RequestContext::new()).await;

    assert!(!result.is_safe);
    assert_eq!(result.response, messages::OUTPUT_REPHRASE);
    assert_eq!(result.metadata.outcome, PipelineOutcome::BlockedOutput);
    assert_eq!(result.metadata.moderation_reason.as_deref(), Some("flagged"));
    assert!(result.metadata.usage.is_some());
}

#[tokio::test]
async fn test_generation_request_shape_and_history_window() {
    let harness = Harness::new(ScriptedClassifier::clean(), ScriptedGenerator::replying("ok"));
    let history: Vec<ChatMessage> = (0..8)
        .map(|i| {
            if i % 2 == 0 {
                ChatMessage::user(format!("turn {}", i))
            } else {
                ChatMessage::assistant(format!("turn {}", i))
            }
        })
        .collect();

    harness
        .orchestrator()
        .process_with_history(QUESTION, history, &RequestContext::new())
        .await;

    let requests = harness.generator.requests();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.model, "gpt-4");
    assert_eq!(request.max_tokens, Some(800));
    assert_eq!(request.temperature, 0.7);

    let messages = &request.messages;
    assert_eq!(messages.len(), 7);
    assert_eq!(messages[0].role, Role::System);
    assert!(messages[0].content.contains("No specific context found in parenting resources."));
    assert_eq!(messages[1].content, "turn 3");
    assert_eq!(messages[5].content, "turn 7");
    assert_eq!(messages[6].role, Role::User);
    assert_eq!(messages[6].content, QUESTION);
}

#[tokio::test]
async fn test_retrieved_context_is_ranked_and_cited() {
    let harness = Harness::new(ScriptedClassifier::clean(), ScriptedGenerator::replying("ok"));
    let orchestrator = harness
        .orchestrator()
        .with_retriever(Arc::new(StaticRetriever::new(sleep_docs())));

    let result = orchestrator
        .process("bedtime routine so toddlers sleep", &RequestContext::new())
        .await;

    assert_eq!(result.metadata.sources, vec!["Sleep Guide".to_string()]);
    let plan = result.metadata.response_plan.unwrap();
    assert!(plan.include_sources);

    let system = &harness.generator.requests()[0].messages[0].content;
    assert!(system.contains("(Source: Sleep Guide)"));
    assert!(!system.contains("Cookbook"));
}

#[tokio::test]
async fn test_history_is_loaded_for_conversation() {
    let harness = Harness::new(ScriptedClassifier::clean(), ScriptedGenerator::replying("ok"));
    let history = StaticHistory::new().with_conversation(
        42,
        vec![
            ChatMessage::user("My daughter is 2"),
            ChatMessage::assistant("Thanks for sharing."),
        ],
    );
    let orchestrator = harness.orchestrator().with_history(Arc::new(history));

    let ctx = RequestContext::new().with_conversation(Some(42));
    orchestrator.process(QUESTION, &ctx).await;

    let messages = &harness.generator.requests()[0].messages;
    assert_eq!(messages.len(), 4);
    assert_eq!(messages[1].content, "My daughter is 2");
}

#[tokio::test]
async fn test_history_failure_returns_fallback() {
    let harness = Harness::new(ScriptedClassifier::clean(), ScriptedGenerator::replying("ok"));
    let orchestrator = harness.orchestrator().with_history(Arc::new(BrokenHistory));

    let ctx = RequestContext::new().with_conversation(Some(7));
    let result = orchestrator.process(QUESTION, &ctx).await;

    assert_eq!(result.response, messages::FALLBACK);
    assert!(result.metadata.error.unwrap().starts_with("HISTORY/"));
    assert_eq!(harness.generator.calls(), 0);
}

#[tokio::test]
async fn test_urgent_message_plans_immediate_support() {
    let harness = Harness::new(ScriptedClassifier::clean(), ScriptedGenerator::replying("ok"));

    let result = harness
        .orchestrator()
        .process("Please help, my baby swallowed something, this is an emergency", &RequestContext::new())
        .await;

    let plan = result.metadata.response_plan.unwrap();
    assert_eq!(plan.strategy, ResponseStrategy::ImmediateSupport);
    assert!(plan.include_professional_referral);

    let system = &harness.generator.requests()[0].messages[0].content;
    assert!(system.contains("Recommend appropriate professional help"));
}

#[tokio::test]
async fn test_config_controls_generation() {
    let harness = Harness::new(
        ScriptedClassifier::clean(),
        ScriptedGenerator::replying("ok").then(Ok(generation("ok", 1000, 1000))),
    );
    let config = PipelineConfig {
        model: "gpt-3.5-turbo".to_string(),
        history_window: 1,
        ..PipelineConfig::default()
    };
    let orchestrator = harness.orchestrator().with_config(config);

    let history = vec![ChatMessage::user("first"), ChatMessage::user("second")];
    let result = orchestrator
        .process_with_history(QUESTION, history, &RequestContext::new())
        .await;

    let request = &harness.generator.requests()[0];
    assert_eq!(request.model, "gpt-3.5-turbo");
    assert_eq!(request.messages.len(), 3);
    assert_eq!(request.messages[1].content, "second");

    // gpt-3.5-turbo: 1.0 * 0.001 + 1.0 * 0.002
    assert!((result.metadata.cost_usd.unwrap() - 0.003).abs() < 1e-9);
}

#[tokio::test]
async fn test_generator_panic_returns_fallback() {
    let classifier = Arc::new(ScriptedClassifier::clean());
    let gate = ModerationGate::new(classifier.clone(), Arc::new(ScriptedGenerator::replying("SAFE")));
    let orchestrator =
        PipelineOrchestrator::new(gate, Arc::new(PanickingGenerator), Arc::new(UsageTracker::new()))
            .unwrap();

    let joined = tokio::spawn(async move {
        orchestrator.process(QUESTION, &RequestContext::new()).await
    })
    .await;

    let result = joined.expect("panic escaped the orchestrator");
    assert!(result.is_safe);
    assert_eq!(result.response, messages::FALLBACK);
    assert_eq!(result.metadata.outcome, PipelineOutcome::Fallback);
    assert_eq!(result.metadata.error.as_deref(), Some("PANIC/generator bug"));
    assert_eq!(result.metadata.error_kind, Some(FailureKind::Other));
    assert_eq!(classifier.calls(), 1);
}

#[tokio::test]
async fn test_blank_message_ends_in_fallback() {
    let harness = Harness::new(ScriptedClassifier::clean(), ScriptedGenerator::replying("ok"));

    let result = harness.orchestrator().process("   ", &RequestContext::new()).await;

    assert!(result.is_safe);
    assert_eq!(result.response, messages::FALLBACK);
    assert_eq!(result.metadata.outcome, PipelineOutcome::Fallback);
    assert!(result
        .metadata
        .error
        .unwrap()
        .starts_with("STAGE/analyze.query.v1"));
    assert_eq!(harness.generator.calls(), 0);
}

#[tokio::test]
async fn test_retrieval_failure_ends_in_fallback() {
    let harness = Harness::new(ScriptedClassifier::clean(), ScriptedGenerator::replying("ok"));
    let orchestrator = harness.orchestrator().with_retriever(Arc::new(BrokenRetriever));

    let result = orchestrator.process(QUESTION, &RequestContext::new()).await;

    assert_eq!(result.response, messages::FALLBACK);
    assert_eq!(
        result.metadata.error.as_deref(),
        Some("RETRIEVAL/CONFIG/index not built")
    );
    assert_eq!(harness.generator.calls(), 0);
    let stages: Vec<&str> = result.metadata.stages.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(stages, vec!["moderate.input.v1"]);
}
