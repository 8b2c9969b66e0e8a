use advisor_out::messages::ADVISOR_SYSTEM_PROMPT;
use serde::{Deserialize, Serialize};

/// Generation and context settings for one orchestrator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Model used for generation, and for pricing it
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    /// History entries passed to the generator, most recent last
    pub history_window: usize,
    /// Documents requested from the retriever
    pub retrieval_top_k: usize,
    /// Documents kept after ranking
    pub max_context_documents: usize,
    /// Documents scoring at or below this are dropped
    pub relevance_threshold: f64,
    pub system_prompt: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4".to_string(),
            max_tokens: 800,
            temperature: 0.7,
            history_window: 5,
            retrieval_top_k: 5,
            max_context_documents: 3,
            relevance_threshold: 0.3,
            system_prompt: ADVISOR_SYSTEM_PROMPT.to_string(),
        }
    }
}
