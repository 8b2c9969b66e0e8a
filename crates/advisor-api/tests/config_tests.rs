use advisor_api::{AppState, ServiceConfig, StartupError};

const FIXTURE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../testing/fixtures/advisor.yaml");

#[test]
fn test_fixture_config_loads_and_validates() {
    let config = ServiceConfig::from_file(FIXTURE).unwrap();
    config.validate().unwrap();

    assert_eq!(config.server.addr, "127.0.0.1:8787");
    assert_eq!(config.provider.base_url, "http://localhost:4010/v1");
    assert_eq!(config.provider.timeout_secs, 10);
    assert!(config.provider.api_key.is_empty());
    assert_eq!(config.pipeline.model, "gpt-4o-mini");
    assert_eq!(config.pipeline.max_tokens, 600);
    assert_eq!(config.moderation.max_tokens, 50);
    assert_eq!(config.budget.daily_budget, 2.0);

    let prices = config.price_table();
    assert!(prices.get("local-llama").is_some());
    assert!(prices.get("gpt-4").is_some());
}

#[test]
fn test_missing_file_is_reported() {
    let err = ServiceConfig::from_file("/nonexistent/advisor.yaml").unwrap_err();
    assert!(err.to_string().contains("/nonexistent/advisor.yaml"));
}

fn keyed_config() -> ServiceConfig {
    let mut config = ServiceConfig::default();
    config.provider.api_key = "sk-abcdefghijklmnopqrstuvwxyz".to_string();
    config
}

#[test]
fn test_custom_templates_are_loaded() {
    let path = std::env::temp_dir().join(format!("advisor-prompts-{}.yaml", std::process::id()));
    std::fs::write(
        &path,
        "version: \"1.0\"\ntemplates:\n  system_context:\n    description: terse\n    template: \"{{base}}\"\n",
    )
    .unwrap();

    let mut config = keyed_config();
    config.templates = Some(path.to_string_lossy().to_string());
    let state = AppState::from_config(&config).unwrap();
    assert!(state.orchestrator.is_some());

    std::fs::remove_file(&path).unwrap();
}

#[test]
fn test_unreadable_templates_fail_startup() {
    let mut config = keyed_config();
    config.templates = Some("/nonexistent/prompts.yaml".to_string());

    let err = AppState::from_config(&config).err().unwrap();
    assert!(matches!(err, StartupError::Templates(_)));
    assert!(err.to_string().contains("/nonexistent/prompts.yaml"));
}
