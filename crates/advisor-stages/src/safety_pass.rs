use advisor_core::{PipelineState, Priority, ResponsePlan, Stage, StageError};
use advisor_policy::sensitive_topics;

/// Escalate `plan` when `message` touches a sensitive topic.
///
/// Only ever raises the plan: a referral once set stays set, and priority
/// never drops. Applying it twice gives the same plan as applying it once.
pub fn escalate_for_sensitive_topics(message: &str, mut plan: ResponsePlan) -> ResponsePlan {
    let topics = sensitive_topics(message);
    if !topics.is_empty() {
        tracing::info!(?topics, "sensitive topic detected, escalating plan");
        plan.include_professional_referral = true;
        plan.priority = Some(Priority::High);
    }
    plan
}

/// Last planning stage; needs `state.response_plan`
#[derive(Default)]
pub struct SafetyValidationStage;

impl Stage for SafetyValidationStage {
    fn id(&self) -> &'static str {
        "policy.safety.v1"
    }

    fn run(&self, mut state: PipelineState) -> Result<PipelineState, StageError> {
        let plan = state
            .response_plan
            .take()
            .ok_or(StageError::MissingField { field: "response_plan" })?;

        state.response_plan = Some(escalate_for_sensitive_topics(state.user_message(), plan));
        Ok(state)
    }
}
