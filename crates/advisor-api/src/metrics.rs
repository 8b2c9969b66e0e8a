//! Prometheus registry for `/metrics`
use advisor_core::PipelineResult;
use prometheus::{
    Counter, Encoder, Histogram, HistogramOpts, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::time::Duration;

pub struct ApiMetrics {
    registry: Registry,
    requests: IntCounterVec,
    tokens: IntCounterVec,
    cost: Counter,
    latency: Histogram,
}

impl ApiMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new_custom(Some("advisor".to_string()), None)?;

        let requests = IntCounterVec::new(
            Opts::new("chat_requests_total", "Chat requests by pipeline outcome"),
            &["outcome"],
        )?;
        let tokens = IntCounterVec::new(
            Opts::new("tokens_total", "Generation tokens by direction"),
            &["direction"],
        )?;
        let cost = Counter::new("cost_usd_total", "Accumulated generation cost in USD")?;
        let latency = Histogram::with_opts(
            HistogramOpts::new("chat_latency_seconds", "End-to-end chat pipeline latency")
                .buckets(vec![0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        )?;

        registry.register(Box::new(requests.clone()))?;
        registry.register(Box::new(tokens.clone()))?;
        registry.register(Box::new(cost.clone()))?;
        registry.register(Box::new(latency.clone()))?;

        Ok(Self {
            registry,
            requests,
            tokens,
            cost,
            latency,
        })
    }

    /// Record one finished pipeline run
    pub fn observe(&self, result: &PipelineResult, elapsed: Duration) {
        let metadata = &result.metadata;

        self.requests
            .with_label_values(&[metadata.outcome.as_str()])
            .inc();
        if let Some(usage) = metadata.usage {
            self.tokens.with_label_values(&["input"]).inc_by(usage.input_tokens);
            self.tokens.with_label_values(&["output"]).inc_by(usage.output_tokens);
        }
        if let Some(cost) = metadata.cost_usd {
            self.cost.inc_by(cost);
        }
        self.latency.observe(elapsed.as_secs_f64());
    }

    /// Count a request answered without running the pipeline
    pub fn observe_unconfigured(&self) {
        self.requests.with_label_values(&["not_configured"]).inc();
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

pub fn encode(registry: &Registry) -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder.encode(&registry.gather(), &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).to_string())
}
