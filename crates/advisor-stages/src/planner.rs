use advisor_core::{
    Complexity, ContextDocument, PipelineState, QueryAnalysis, ResponsePlan, ResponseStrategy,
    Stage, StageError, Tone, Urgency,
};

/// Turns analysis and ranked context into a response plan
#[derive(Debug, Default, Clone, Copy)]
pub struct ResponsePlanner;

impl ResponsePlanner {
    pub fn new() -> Self {
        Self
    }

    pub fn plan(&self, analysis: &QueryAnalysis, ranked_context: &[ContextDocument]) -> ResponsePlan {
        let mut plan = ResponsePlan {
            strategy: ResponseStrategy::Comprehensive,
            include_sources: !ranked_context.is_empty(),
            tone: Tone::Empathetic,
            suggest_followup: analysis.complexity == Complexity::High,
            include_professional_referral: false,
            priority: None,
        };

        if analysis.urgency == Urgency::High {
            plan.strategy = ResponseStrategy::ImmediateSupport;
            plan.include_professional_referral = true;
        }

        plan
    }
}

/// Writes `state.response_plan`; needs `state.analysis`
#[derive(Default)]
pub struct PlanResponseStage {
    planner: ResponsePlanner,
}

impl Stage for PlanResponseStage {
    fn id(&self) -> &'static str {
        "plan.response.v1"
    }

    fn run(&self, mut state: PipelineState) -> Result<PipelineState, StageError> {
        let analysis = state
            .analysis
            .as_ref()
            .ok_or(StageError::MissingField { field: "analysis" })?;

        state.response_plan = Some(self.planner.plan(analysis, &state.retrieved_context));
        Ok(state)
    }
}
