use crate::wire::{
    classify_status, parse_chat_completion, parse_moderation, ChatCompletionRequest,
    ModerationRequest,
};
use advisor_core::{
    Classification, Classifier, Generation, GenerationRequest, Generator, ProviderError,
};
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for an OpenAI-compatible API.
///
/// Implements both [`Generator`] (chat completions) and [`Classifier`]
/// (moderations). Nothing is retried; a failed call surfaces as a
/// [`ProviderError`] for the caller's policy to handle.
///
/// ## Example
///
/// ```no_run
/// use advisor_provider::OpenAiClient;
/// use std::time::Duration;
///
/// let client = OpenAiClient::new(std::env::var("OPENAI_API_KEY").unwrap_or_default())
///     .unwrap()
///     .with_timeout(Duration::from_secs(10));
/// ```
#[derive(Clone)]
pub struct OpenAiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    timeout: Duration,
}

impl std::fmt::Debug for OpenAiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiClient")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl OpenAiClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self, ProviderError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(ProviderError::Auth("no API key configured".to_string()));
        }

        Ok(Self {
            http: reqwest::Client::new(),
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post<T: Serialize + ?Sized>(&self, path: &str, payload: &T) -> Result<String, ProviderError> {
        let url = format!("{}/{}", self.base_url, path);

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .timeout(self.timeout)
            .json(payload)
            .send()
            .await
            .map_err(|e| ProviderError::Unavailable(format!("{} request failed: {}", path, e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::Unavailable(format!("{} body unreadable: {}", path, e)))?;

        if !status.is_success() {
            let error = classify_status(status.as_u16(), &body);
            tracing::warn!(path, status = status.as_u16(), %error, "provider call failed");
            return Err(error);
        }

        Ok(body)
    }
}

#[async_trait]
impl Generator for OpenAiClient {
    async fn generate(&self, request: GenerationRequest) -> Result<Generation, ProviderError> {
        let payload = ChatCompletionRequest {
            model: &request.model,
            messages: &request.messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        };

        let body = self.post("chat/completions", &payload).await?;
        let mut generation = parse_chat_completion(&body)?;
        if generation.model.is_empty() {
            generation.model = request.model;
        }
        Ok(generation)
    }
}

#[async_trait]
impl Classifier for OpenAiClient {
    async fn classify(&self, text: &str) -> Result<Classification, ProviderError> {
        let body = self.post("moderations", &ModerationRequest { input: text }).await?;
        parse_moderation(&body)
    }
}
