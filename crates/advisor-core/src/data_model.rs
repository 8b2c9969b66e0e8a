//! Data Model: PipelineState, analysis and plan records, PipelineResult
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }
}

/// A retrieved snippet, scored once the ranker has seen it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextDocument {
    pub content: String,
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relevance_score: Option<f64>,
}

impl ContextDocument {
    pub fn new(content: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            source: source.into(),
            relevance_score: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryType {
    Behavioral,
    Developmental,
    Educational,
    Routine,
    General,
}

impl QueryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryType::Behavioral => "behavioral",
            QueryType::Developmental => "developmental",
            QueryType::Educational => "educational",
            QueryType::Routine => "routine",
            QueryType::General => "general",
        }
    }
}

impl fmt::Display for QueryType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Complexity {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Normal,
    High,
}

/// Signals derived from the raw user message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryAnalysis {
    pub query_type: QueryType,
    pub complexity: Complexity,
    pub urgency: Urgency,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub child_age: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseStrategy {
    Comprehensive,
    ImmediateSupport,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    #[default]
    Empathetic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Normal,
    High,
}

/// How the generated answer should be shaped
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponsePlan {
    pub strategy: ResponseStrategy,
    pub include_sources: bool,
    pub tone: Tone,
    pub suggest_followup: bool,
    #[serde(default)]
    pub include_professional_referral: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
}

/// Token accounting for one generation call.
///
/// `total_tokens` is always `input_tokens + output_tokens`; build it with
/// [`Usage::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub total_tokens: u64,
}

impl Usage {
    pub fn new(input_tokens: u64, output_tokens: u64) -> Self {
        Self {
            input_tokens,
            output_tokens,
            total_tokens: input_tokens + output_tokens,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageTrace {
    pub id: String,
    pub latency_ms: u64,
}

/// Which terminal state a pipeline run ended in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineOutcome {
    #[default]
    Completed,
    BlockedInput,
    BlockedOutput,
    Fallback,
}

impl PipelineOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineOutcome::Completed => "completed",
            PipelineOutcome::BlockedInput => "blocked_input",
            PipelineOutcome::BlockedOutput => "blocked_output",
            PipelineOutcome::Fallback => "fallback",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Auth,
    RateLimited,
    Unavailable,
    Other,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseMetadata {
    pub trace_id: String,
    pub message_digest: String,
    pub outcome: PipelineOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost_usd: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<QueryAnalysis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_plan: Option<ResponsePlan>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<String>,
    #[serde(default)]
    pub stages: Vec<StageTrace>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub moderation_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<FailureKind>,
}

/// The single record carried through every stage of one request.
///
/// `user_message` is fixed at construction; everything else is filled in as
/// the stages run.
#[derive(Debug, Clone)]
pub struct PipelineState {
    user_message: String,
    pub conversation_history: Vec<ChatMessage>,
    pub retrieved_context: Vec<ContextDocument>,
    pub system_context: String,
    pub analysis: Option<QueryAnalysis>,
    pub response_plan: Option<ResponsePlan>,
    pub response: String,
    pub is_safe: bool,
    pub metadata: ResponseMetadata,
}

impl PipelineState {
    pub fn new(user_message: impl Into<String>, conversation_history: Vec<ChatMessage>) -> Self {
        let user_message = user_message.into();
        let metadata = ResponseMetadata {
            message_digest: crate::message_digest(&user_message),
            ..ResponseMetadata::default()
        };

        Self {
            user_message,
            conversation_history,
            retrieved_context: Vec::new(),
            system_context: String::new(),
            analysis: None,
            response_plan: None,
            response: String::new(),
            is_safe: true,
            metadata,
        }
    }

    pub fn user_message(&self) -> &str {
        &self.user_message
    }

    /// Attach retrieved documents (unscored) to the state
    pub fn with_context(mut self, documents: Vec<ContextDocument>) -> Self {
        self.retrieved_context = documents;
        self
    }

    /// The last `window` history entries, oldest first
    pub fn recent_history(&self, window: usize) -> &[ChatMessage] {
        let start = self.conversation_history.len().saturating_sub(window);
        &self.conversation_history[start..]
    }

    pub fn into_result(self) -> PipelineResult {
        let mut metadata = self.metadata;
        metadata.analysis = self.analysis;
        metadata.response_plan = self.response_plan;

        PipelineResult {
            response: self.response,
            is_safe: self.is_safe,
            metadata,
        }
    }
}

/// What the pipeline hands back to its caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineResult {
    pub response: String,
    pub is_safe: bool,
    pub metadata: ResponseMetadata,
}
