//! Advisor Core: pipeline state, stage contract and provider interfaces
//!
//! Generic core shared by every crate in the advice pipeline. It owns the
//! single state record threaded through the stages, the `Stage` contract for
//! pure stages, the runner that chains them, and the traits the pipeline
//! uses to talk to its external collaborators (generator, classifier,
//! history store, retrieval).

pub mod context;
pub mod data_model;
pub mod error;
pub mod mock;
pub mod provider;
pub mod runner;
pub mod stage;

pub use context::RequestContext;
pub use data_model::{
    ChatMessage, Complexity, ContextDocument, FailureKind, PipelineOutcome, PipelineResult,
    PipelineState, Priority, QueryAnalysis, QueryType, ResponseMetadata, ResponsePlan,
    ResponseStrategy, Role, StageTrace, Tone, Urgency, Usage,
};
pub use error::{AdvisorError, ProviderError};
pub use provider::{
    Classification, Classifier, EmptyHistory, Generation, GenerationRequest, Generator,
    HistoryStore, RetrievedDocument, Retriever, TokenUsage,
};
pub use runner::StageRunner;
pub use stage::{Stage, StageError};

/// Engine version reported by the health endpoint
pub const ADVISOR_VERSION: &str = "1.0.0";

/// blake3 digest used to correlate a message across logs without logging it
pub fn message_digest(text: &str) -> String {
    format!("blake3:{}", blake3::hash(text.as_bytes()))
}
