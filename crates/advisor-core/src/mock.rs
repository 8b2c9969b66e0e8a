//! Scripted in-process providers
//!
//! Deterministic stand-ins for the remote collaborators. They count calls and
//! remember what they were asked, so pipeline behaviour can be exercised
//! without a network connection (tests, local demos).

use crate::data_model::ChatMessage;
use crate::error::{AdvisorError, ProviderError};
use crate::provider::{
    Classification, Classifier, Generation, GenerationRequest, Generator, HistoryStore,
    RetrievedDocument, Retriever, TokenUsage,
};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Build a generation result with consistent token accounting
pub fn generation(text: impl Into<String>, prompt_tokens: u64, completion_tokens: u64) -> Generation {
    Generation {
        text: text.into(),
        usage: TokenUsage {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        },
        model: "scripted".to_string(),
    }
}

/// Generator that replays queued results, then repeats a default one
pub struct ScriptedGenerator {
    script: Mutex<VecDeque<Result<Generation, ProviderError>>>,
    default: Result<Generation, ProviderError>,
    requests: Mutex<Vec<GenerationRequest>>,
    calls: AtomicUsize,
}

impl ScriptedGenerator {
    pub fn replying(text: impl Into<String>) -> Self {
        Self::with_default(Ok(generation(text, 100, 50)))
    }

    pub fn failing(error: ProviderError) -> Self {
        Self::with_default(Err(error))
    }

    fn with_default(default: Result<Generation, ProviderError>) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            default,
            requests: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Queue a result to be returned before the default
    pub fn then(self, result: Result<Generation, ProviderError>) -> Self {
        self.script
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(result);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl Generator for ScriptedGenerator {
    async fn generate(&self, request: GenerationRequest) -> Result<Generation, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request);

        let queued = self
            .script
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front();
        queued.unwrap_or_else(|| self.default.clone())
    }
}

type Rule = Box<dyn Fn(&str) -> Result<Classification, ProviderError> + Send + Sync>;

/// Classifier driven by a rule over the input text
pub struct ScriptedClassifier {
    rule: Rule,
    seen: Mutex<Vec<String>>,
    calls: AtomicUsize,
}

impl ScriptedClassifier {
    pub fn new(rule: impl Fn(&str) -> Result<Classification, ProviderError> + Send + Sync + 'static) -> Self {
        Self {
            rule: Box::new(rule),
            seen: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Never flags anything
    pub fn clean() -> Self {
        Self::new(|_| Ok(Classification::default()))
    }

    /// Flags everything
    pub fn flagging() -> Self {
        Self::new(|_| {
            Ok(Classification {
                flagged: true,
                categories: vec!["harassment".to_string()],
            })
        })
    }

    /// Flags any text containing `needle` (case-insensitive)
    pub fn flag_containing(needle: &str) -> Self {
        let needle = needle.to_lowercase();
        Self::new(move |text| {
            Ok(Classification {
                flagged: text.to_lowercase().contains(&needle),
                categories: Vec::new(),
            })
        })
    }

    /// Every call fails with `error`
    pub fn failing(error: ProviderError) -> Self {
        Self::new(move |_| Err(error.clone()))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn seen(&self) -> Vec<String> {
        self.seen.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl Classifier for ScriptedClassifier {
    async fn classify(&self, text: &str) -> Result<Classification, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(text.to_string());
        (self.rule)(text)
    }
}

/// Retriever returning a fixed document list, truncated to `top_k`
#[derive(Debug, Default)]
pub struct StaticRetriever {
    documents: Vec<RetrievedDocument>,
}

impl StaticRetriever {
    pub fn new(documents: Vec<RetrievedDocument>) -> Self {
        Self { documents }
    }
}

#[async_trait]
impl Retriever for StaticRetriever {
    async fn search(&self, _query: &str, top_k: usize) -> Result<Vec<RetrievedDocument>, AdvisorError> {
        Ok(self.documents.iter().take(top_k).cloned().collect())
    }
}

/// History store backed by a fixed map
#[derive(Debug, Default)]
pub struct StaticHistory {
    conversations: HashMap<i64, Vec<ChatMessage>>,
}

impl StaticHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_conversation(mut self, conversation_id: i64, messages: Vec<ChatMessage>) -> Self {
        self.conversations.insert(conversation_id, messages);
        self
    }
}

#[async_trait]
impl HistoryStore for StaticHistory {
    async fn history(&self, conversation_id: i64) -> Result<Vec<ChatMessage>, AdvisorError> {
        Ok(self
            .conversations
            .get(&conversation_id)
            .cloned()
            .unwrap_or_default())
    }
}
