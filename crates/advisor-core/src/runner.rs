//! Stage Runner: chains pure stages and records per-stage latency
use crate::data_model::{PipelineState, StageTrace};
use crate::error::AdvisorError;
use crate::stage::Stage;
use std::time::Instant;

pub struct StageRunner {
    stages: Vec<Box<dyn Stage>>,
    pipeline_id: String,
}

impl StageRunner {
    pub fn new(stages: Vec<Box<dyn Stage>>) -> Self {
        let pipeline_id = stages
            .iter()
            .map(|s| s.id().split('.').next().unwrap_or("?"))
            .collect::<Vec<_>>()
            .join("→");

        Self { stages, pipeline_id }
    }

    /// Run every stage in order, stopping at the first failure
    pub fn run(&self, state: PipelineState) -> Result<PipelineState, AdvisorError> {
        let mut current = state;

        for stage in &self.stages {
            let start = Instant::now();

            current = stage
                .run(current)
                .map_err(|e| AdvisorError::stage(stage.id(), e))?;

            let latency_ms = start.elapsed().as_millis() as u64;
            tracing::debug!(stage = stage.id(), latency_ms, "stage finished");

            current.metadata.stages.push(StageTrace {
                id: stage.id().to_string(),
                latency_ms,
            });
        }

        Ok(current)
    }

    pub fn pipeline_id(&self) -> &str {
        &self.pipeline_id
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}
