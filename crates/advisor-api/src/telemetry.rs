use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber.
///
/// `LOG_FORMAT=json` selects structured JSON lines; anything else gives
/// human-readable output. Filtering follows `RUST_LOG`, defaulting to
/// `info`.
///
/// Fails if a global subscriber is already installed.
pub fn init_tracing() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());
    let filter = || EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match format.as_str() {
        "json" => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter())
            .with_current_span(true)
            .with_span_list(true)
            .try_init(),
        _ => tracing_subscriber::fmt()
            .pretty()
            .with_env_filter(filter())
            .try_init(),
    }
}
