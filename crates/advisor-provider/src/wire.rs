//! Wire format of the OpenAI-compatible endpoints
//!
//! - `POST {base}/chat/completions`
//! - `POST {base}/moderations`

use advisor_core::{ChatMessage, Classification, Generation, ProviderError, TokenUsage};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub(crate) struct ChatCompletionRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    pub temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    model: String,
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<WireUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireUsage {
    prompt_tokens: u64,
    completion_tokens: u64,
}

#[derive(Debug, Serialize)]
pub(crate) struct ModerationRequest<'a> {
    pub input: &'a str,
}

#[derive(Debug, Deserialize)]
struct ModerationResponse {
    results: Vec<ModerationEntry>,
}

#[derive(Debug, Deserialize)]
struct ModerationEntry {
    flagged: bool,
    #[serde(default)]
    categories: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    code: Option<String>,
}

pub(crate) fn parse_chat_completion(body: &str) -> Result<Generation, ProviderError> {
    let response: ChatCompletionResponse =
        serde_json::from_str(body).map_err(|e| ProviderError::Malformed(e.to_string()))?;

    let text = response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| ProviderError::Malformed("completion has no message content".to_string()))?;

    let usage = response
        .usage
        .map(|u| TokenUsage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.prompt_tokens + u.completion_tokens,
        })
        .unwrap_or_default();

    Ok(Generation {
        text,
        usage,
        model: response.model,
    })
}

pub(crate) fn parse_moderation(body: &str) -> Result<Classification, ProviderError> {
    let response: ModerationResponse =
        serde_json::from_str(body).map_err(|e| ProviderError::Malformed(e.to_string()))?;

    let entry = response
        .results
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::Malformed("moderation returned no results".to_string()))?;

    let mut categories: Vec<String> = entry
        .categories
        .into_iter()
        .filter(|(_, hit)| hit.as_bool() == Some(true))
        .map(|(name, _)| name)
        .collect();
    categories.sort();

    Ok(Classification {
        flagged: entry.flagged,
        categories,
    })
}

/// Map a non-success status and its body to a provider error
pub fn classify_status(status: u16, body: &str) -> ProviderError {
    let (message, quota) = match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => {
            let quota = [envelope.error.kind.as_deref(), envelope.error.code.as_deref()]
                .into_iter()
                .flatten()
                .any(|s| s.contains("quota"));
            (envelope.error.message, quota)
        }
        Err(_) => (body.trim().to_string(), false),
    };
    let quota = quota || message.to_lowercase().contains("quota");

    match status {
        401 | 403 => ProviderError::Auth(message),
        429 => ProviderError::RateLimited(message),
        _ if quota => ProviderError::RateLimited(message),
        _ => ProviderError::Api { status, message },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_chat_completion() {
        let body = r#"{
            "id": "chatcmpl-1",
            "model": "gpt-4-0613",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": "Try a bedtime chart."}, "finish_reason": "stop"}],
            "usage": {"prompt_tokens": 120, "completion_tokens": 30, "total_tokens": 150}
        }"#;

        let generation = parse_chat_completion(body).unwrap();
        assert_eq!(generation.text, "Try a bedtime chart.");
        assert_eq!(generation.model, "gpt-4-0613");
        assert_eq!(generation.usage.total_tokens, 150);
    }

    #[test]
    fn test_completion_without_content_is_malformed() {
        let body = r#"{"model": "gpt-4", "choices": []}"#;
        assert!(matches!(parse_chat_completion(body), Err(ProviderError::Malformed(_))));
        assert!(matches!(parse_chat_completion("<html>"), Err(ProviderError::Malformed(_))));
    }

    #[test]
    fn test_parse_moderation() {
        let body = r#"{"id": "modr-1", "results": [{"flagged": true,
            "categories": {"violence": true, "harassment": false, "hate": true},
            "category_scores": {"violence": 0.97}}]}"#;

        let classification = parse_moderation(body).unwrap();
        assert!(classification.flagged);
        assert_eq!(classification.categories, vec!["hate", "violence"]);

        assert!(matches!(
            parse_moderation(r#"{"results": []}"#),
            Err(ProviderError::Malformed(_))
        ));
    }

    #[test]
    fn test_classify_status() {
        let invalid_key = r#"{"error": {"message": "Incorrect API key provided", "type": "invalid_request_error", "code": "invalid_api_key"}}"#;
        assert!(matches!(classify_status(401, invalid_key), ProviderError::Auth(m) if m == "Incorrect API key provided"));

        assert!(matches!(classify_status(429, "{}"), ProviderError::RateLimited(_)));

        let quota = r#"{"error": {"message": "You exceeded your current quota", "type": "insufficient_quota"}}"#;
        assert!(matches!(classify_status(400, quota), ProviderError::RateLimited(_)));

        assert_eq!(
            classify_status(500, "upstream exploded"),
            ProviderError::Api {
                status: 500,
                message: "upstream exploded".to_string()
            }
        );
    }
}
