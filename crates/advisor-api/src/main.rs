//! Binary entrypoint for the Advisor API server.
use advisor_api::{init_tracing, run, AppState, ServiceConfig};
use anyhow::Context;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing().map_err(|e| anyhow::anyhow!("tracing init failed: {e}"))?;

    let config = ServiceConfig::load().context("loading configuration")?;
    tracing::info!(
        addr = %config.server.addr,
        model = %config.pipeline.model,
        daily_budget = config.budget.daily_budget,
        "configuration loaded"
    );

    let state = AppState::from_config(&config).context("building application state")?;
    run(&config.server.addr, state)
        .await
        .with_context(|| format!("serving on {}", config.server.addr))
}
