//! API Handlers
use crate::config::{has_usable_api_key, key_preview};
use crate::metrics;
use crate::state::AppState;
use advisor_core::{
    FailureKind, PipelineOutcome, PipelineResult, RequestContext, ResponseMetadata, Usage,
    ADVISOR_VERSION,
};
use advisor_out::messages;
use advisor_usage::{BudgetReport, DailySummary, SessionSummary};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Instant;

/// Model name reported when no pipeline is wired
pub const UNCONFIGURED_MODEL: &str = "fallback";
/// Model name reported when the provider failed
pub const ERROR_MODEL: &str = "error-fallback";

type ApiError = (StatusCode, Json<Value>);

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub content: String,
    #[serde(default)]
    pub conversation_id: Option<i64>,
    #[serde(default)]
    pub user_id: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub content: String,
    pub role: String,
    pub conversation_id: Option<i64>,
    pub user_id: Option<i64>,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
    pub is_safe: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ResponseMetadata>,
}

impl ChatResponse {
    fn assistant(request: &ChatRequest, content: &str, model: &str) -> Self {
        Self {
            content: content.to_string(),
            role: "assistant".to_string(),
            conversation_id: request.conversation_id,
            user_id: request.user_id,
            model: model.to_string(),
            usage: None,
            is_safe: true,
            metadata: None,
        }
    }
}

pub async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    if request.content.trim().is_empty() {
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "error": "content must not be empty" })),
        ));
    }

    let Some(orchestrator) = state.orchestrator.as_ref() else {
        state.metrics.observe_unconfigured();
        return Ok(Json(ChatResponse::assistant(
            &request,
            messages::NOT_CONFIGURED,
            UNCONFIGURED_MODEL,
        )));
    };

    let ctx = RequestContext::new()
        .with_conversation(request.conversation_id)
        .with_user(request.user_id);

    let started = Instant::now();
    let result = orchestrator.process(&request.content, &ctx).await;
    state.metrics.observe(&result, started.elapsed());

    for alert in state.usage.check_budget_alerts(state.daily_budget).messages() {
        tracing::warn!(alert = %alert, "budget alert");
    }

    Ok(Json(into_response(&request, result, &orchestrator.config().model)))
}

/// Shape a pipeline result for the client, translating provider failures
fn into_response(request: &ChatRequest, result: PipelineResult, default_model: &str) -> ChatResponse {
    let metadata = result.metadata;

    let (content, model) = match (metadata.outcome, metadata.error_kind) {
        (PipelineOutcome::Fallback, Some(FailureKind::Auth)) => {
            (messages::AUTH_ISSUE.to_string(), ERROR_MODEL.to_string())
        }
        (PipelineOutcome::Fallback, Some(FailureKind::RateLimited)) => {
            (messages::HIGH_DEMAND.to_string(), ERROR_MODEL.to_string())
        }
        (PipelineOutcome::Fallback, _) => (result.response, ERROR_MODEL.to_string()),
        _ => (
            result.response,
            metadata
                .model
                .clone()
                .unwrap_or_else(|| default_model.to_string()),
        ),
    };

    ChatResponse {
        content,
        role: "assistant".to_string(),
        conversation_id: request.conversation_id,
        user_id: request.user_id,
        model,
        usage: metadata.usage,
        is_safe: result.is_safe,
        metadata: Some(metadata),
    }
}

/// Key diagnostics without revealing the key
pub async fn chat_status(State(state): State<AppState>) -> Json<Value> {
    let key = state.api_key.as_ref();
    Json(json!({
        "key_configured": !key.is_empty(),
        "key_format_valid": has_usable_api_key(key),
        "key_length": key.chars().count(),
        "key_preview": key_preview(key),
        "pipeline_ready": state.orchestrator.is_some(),
    }))
}

pub async fn health() -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "version": ADVISOR_VERSION,
            "timestamp": chrono::Utc::now().to_rfc3339(),
        })),
    )
}

pub async fn usage_session(State(state): State<AppState>) -> Json<SessionSummary> {
    Json(state.usage.session_summary())
}

#[derive(Debug, Deserialize)]
pub struct DailyQuery {
    pub date: Option<NaiveDate>,
}

pub async fn usage_daily(
    State(state): State<AppState>,
    Query(query): Query<DailyQuery>,
) -> Json<DailySummary> {
    Json(state.usage.daily_summary(query.date))
}

#[derive(Debug, Deserialize)]
pub struct AlertsQuery {
    pub budget: Option<f64>,
}

pub async fn usage_alerts(
    State(state): State<AppState>,
    Query(query): Query<AlertsQuery>,
) -> Result<Json<BudgetReport>, ApiError> {
    let budget = query.budget.unwrap_or(state.daily_budget);
    if budget.is_nan() || budget <= 0.0 {
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "error": "budget must be positive" })),
        ));
    }
    Ok(Json(state.usage.check_budget_alerts(budget)))
}

pub async fn export_metrics(State(state): State<AppState>) -> Result<String, (StatusCode, String)> {
    metrics::encode(state.metrics.registry())
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
}
