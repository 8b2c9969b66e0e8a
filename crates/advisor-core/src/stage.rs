//! Stage Trait: single contract for the pure pipeline stages
use crate::data_model::PipelineState;

/// A pure pipeline stage.
///
/// A stage takes the state by value and hands back the updated state, so
/// exactly one owner mutates it at any time.
pub trait Stage: Send + Sync {
    /// Unique stage id (e.g. "rank.context.v1")
    fn id(&self) -> &'static str;

    /// Execute the stage
    fn run(&self, state: PipelineState) -> Result<PipelineState, StageError>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum StageError {
    ValidationFailed(String),
    MissingField { field: &'static str },
    ExecutionFailed(String),
}

impl std::fmt::Display for StageError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::ValidationFailed(msg) => write!(f, "VALIDATION: {}", msg),
            Self::MissingField { field } => write!(f, "MISSING: state field `{}` not set", field),
            Self::ExecutionFailed(msg) => write!(f, "EXEC: {}", msg),
        }
    }
}

impl std::error::Error for StageError {}
