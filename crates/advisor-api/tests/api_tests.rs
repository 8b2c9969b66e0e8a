use advisor_api::{create_app, AppState, ServiceConfig};
use advisor_core::mock::{ScriptedClassifier, ScriptedGenerator};
use advisor_core::ProviderError;
use advisor_out::messages;
use advisor_policy::ModerationGate;
use advisor_stages::PipelineOrchestrator;
use advisor_usage::UsageTracker;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn app_with(generator: ScriptedGenerator, classifier: ScriptedClassifier) -> Router {
    let config = ServiceConfig::default();
    let usage = Arc::new(UsageTracker::new());
    let gate = ModerationGate::new(
        Arc::new(classifier),
        Arc::new(ScriptedGenerator::replying("SAFE")),
    );
    let orchestrator = PipelineOrchestrator::new(gate, Arc::new(generator), usage.clone())
        .unwrap()
        .with_config(config.pipeline.clone());

    let state = AppState::new(Some(Arc::new(orchestrator)), usage, &config).unwrap();
    create_app(state)
}

fn app() -> Router {
    app_with(
        ScriptedGenerator::replying("Try a consistent bedtime routine."),
        ScriptedClassifier::clean(),
    )
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn post_chat(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/v1/chat")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_health() {
    let (status, body) = send(app(), get("/v1/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], "1.0.0");
}

#[tokio::test]
async fn test_chat_returns_generated_reply() {
    let (status, body) = send(
        app(),
        post_chat(json!({
            "content": "My 3 year old won't sleep, what routine helps?",
            "conversation_id": 5,
            "user_id": 9
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["content"], "Try a consistent bedtime routine.");
    assert_eq!(body["role"], "assistant");
    assert_eq!(body["conversation_id"], 5);
    assert_eq!(body["user_id"], 9);
    assert_eq!(body["is_safe"], true);
    assert_eq!(body["model"], "scripted");
    assert_eq!(body["usage"]["total_tokens"], 150);
    assert_eq!(body["metadata"]["outcome"], "completed");
    assert_eq!(body["metadata"]["analysis"]["child_age"], "3");
}

#[tokio::test]
async fn test_chat_rejects_empty_content() {
    let (status, body) = send(app(), post_chat(json!({ "content": "   " }))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "content must not be empty");
}

#[tokio::test]
async fn test_chat_without_provider_key_answers_notice() {
    let config = ServiceConfig::default();
    let state = AppState::from_config(&config).unwrap();
    assert!(state.orchestrator.is_none());

    let (status, body) = send(create_app(state), post_chat(json!({ "content": "hello" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["content"], messages::NOT_CONFIGURED);
    assert_eq!(body["model"], "fallback");
}

#[tokio::test]
async fn test_chat_translates_auth_failure() {
    let app = app_with(
        ScriptedGenerator::failing(ProviderError::Auth("invalid_api_key".into())),
        ScriptedClassifier::clean(),
    );
    let (_, body) = send(app, post_chat(json!({ "content": "tantrum tips" }))).await;

    assert_eq!(body["content"], messages::AUTH_ISSUE);
    assert_eq!(body["model"], "error-fallback");
    assert_eq!(body["metadata"]["error_kind"], "auth");
}

#[tokio::test]
async fn test_chat_translates_quota_failure() {
    let app = app_with(
        ScriptedGenerator::failing(ProviderError::RateLimited("insufficient_quota".into())),
        ScriptedClassifier::clean(),
    );
    let (_, body) = send(app, post_chat(json!({ "content": "tantrum tips" }))).await;

    assert_eq!(body["content"], messages::HIGH_DEMAND);
    assert_eq!(body["model"], "error-fallback");
}

#[tokio::test]
async fn test_chat_keeps_generic_fallback_for_other_failures() {
    let app = app_with(
        ScriptedGenerator::failing(ProviderError::Unavailable("timeout".into())),
        ScriptedClassifier::clean(),
    );
    let (status, body) = send(app, post_chat(json!({ "content": "tantrum tips" }))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["content"], messages::FALLBACK);
    assert_eq!(body["is_safe"], true);
    assert!(body["metadata"]["error"].as_str().unwrap().contains("timeout"));
}

#[tokio::test]
async fn test_chat_reports_blocked_input() {
    let app = app_with(
        ScriptedGenerator::replying("unused"),
        ScriptedClassifier::flagging(),
    );
    let (_, body) = send(app, post_chat(json!({ "content": "something awful" }))).await;

    assert_eq!(body["is_safe"], false);
    assert_eq!(body["content"], messages::SAFETY_REFUSAL);
    assert_eq!(body["model"], "gpt-4");
    assert_eq!(body["metadata"]["moderation_reason"], "flagged by moderation");
}

#[tokio::test]
async fn test_usage_endpoints_reflect_chat() {
    let app = app();
    send(app.clone(), post_chat(json!({ "content": "picky eating at dinner" }))).await;

    let (status, session) = send(app.clone(), get("/v1/usage/session")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(session["total_calls"], 1);
    assert_eq!(session["total_tokens"], 150);

    let (_, daily) = send(app.clone(), get("/v1/usage/daily")).await;
    assert_eq!(daily["total_calls"], 1);

    let (_, old) = send(app.clone(), get("/v1/usage/daily?date=2020-01-01")).await;
    assert_eq!(old["total_calls"], 0);
    assert_eq!(old["date"], "2020-01-01");

    let (_, report) = send(app.clone(), get("/v1/usage/alerts?budget=0.001")).await;
    assert_eq!(report["alerts"].as_array().unwrap().len(), 2);
    assert_eq!(report["budget_remaining"], 0.0);

    let (status, _) = send(app, get("/v1/usage/alerts?budget=0")).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_chat_status_hides_key() {
    let mut config = ServiceConfig::default();
    config.provider.api_key = "sk-abcdefghijklmnopqrstuvwxyz".to_string();
    let state = AppState::new(None, Arc::new(UsageTracker::new()), &config).unwrap();

    let (_, body) = send(create_app(state), get("/v1/chat/status")).await;
    assert_eq!(body["key_configured"], true);
    assert_eq!(body["key_format_valid"], true);
    assert_eq!(body["key_preview"], "sk-abcdefg...wxyz");
    assert_eq!(body["pipeline_ready"], false);
}

#[tokio::test]
async fn test_metrics_exposition() {
    let app = app();
    send(app.clone(), post_chat(json!({ "content": "bedtime" }))).await;

    let response = app.oneshot(get("/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains("advisor_chat_requests_total{outcome=\"completed\"} 1"));
}
