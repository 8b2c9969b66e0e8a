use advisor_core::{PipelineState, Stage, StageError};
use advisor_in::QueryAnalyzer;

/// Writes `state.analysis` from the user message
#[derive(Default)]
pub struct AnalyzeStage {
    analyzer: QueryAnalyzer,
}

impl AnalyzeStage {
    pub fn new(analyzer: QueryAnalyzer) -> Self {
        Self { analyzer }
    }
}

impl Stage for AnalyzeStage {
    fn id(&self) -> &'static str {
        "analyze.query.v1"
    }

    fn run(&self, mut state: PipelineState) -> Result<PipelineState, StageError> {
        if state.user_message().trim().is_empty() {
            return Err(StageError::ValidationFailed("empty user message".to_string()));
        }

        state.analysis = Some(self.analyzer.analyze(state.user_message()));
        Ok(state)
    }
}
