//! Provider interfaces for the pipeline's external collaborators
//!
//! - `Generator`: chat-completion style text generation
//! - `Classifier`: content classification (flagged / not flagged)
//! - `HistoryStore`: read-only conversation history lookup
//! - `Retriever`: ranked-context search
//!
//! All traits are object safe so they can be shared as `Arc<dyn _>` across
//! concurrent requests.

use crate::data_model::{ChatMessage, ContextDocument};
use crate::error::{AdvisorError, ProviderError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub messages: Vec<ChatMessage>,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    pub temperature: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Generation {
    pub text: String,
    pub usage: TokenUsage,
    pub model: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Classification {
    pub flagged: bool,
    /// Categories the provider reported; informational only
    #[serde(default)]
    pub categories: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedDocument {
    pub content: String,
    pub source: String,
}

impl From<RetrievedDocument> for ContextDocument {
    fn from(doc: RetrievedDocument) -> Self {
        ContextDocument::new(doc.content, doc.source)
    }
}

#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, request: GenerationRequest) -> Result<Generation, ProviderError>;
}

#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(&self, text: &str) -> Result<Classification, ProviderError>;
}

#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Ordered history for a conversation, oldest first; possibly empty
    async fn history(&self, conversation_id: i64) -> Result<Vec<ChatMessage>, AdvisorError>;
}

#[async_trait]
pub trait Retriever: Send + Sync {
    async fn search(&self, query: &str, top_k: usize)
        -> Result<Vec<RetrievedDocument>, AdvisorError>;
}

/// History store for deployments without conversation storage
#[derive(Debug, Default, Clone, Copy)]
pub struct EmptyHistory;

#[async_trait]
impl HistoryStore for EmptyHistory {
    async fn history(&self, _conversation_id: i64) -> Result<Vec<ChatMessage>, AdvisorError> {
        Ok(Vec::new())
    }
}
