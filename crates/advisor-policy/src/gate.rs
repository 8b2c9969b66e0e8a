//! Moderation gate: two-tier screening of inbound and outbound text
//!
//! Inbound text goes through the provider classifier first; a flag there is
//! final. Unflagged input then gets a contextual judgment call that decides
//! whether it belongs on a parenting advice platform. Outbound text only gets
//! the classifier.
//!
//! Provider failures surface from the `try_*` methods as [`ModerationError`].
//! `check_input` / `check_output` turn those into a fail-open verdict: the
//! service prefers availability over strictness, and every such event is
//! logged at `warn`.

use crate::verdict::{
    Direction, ModerationResult, CLASSIFIER_CONFIDENCE, JUDGMENT_CONFIDENCE,
};
use advisor_core::{ChatMessage, Classifier, GenerationRequest, Generator, ProviderError};
use advisor_usage::UsageTracker;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Reason reported when the classifier flags user input
pub const INPUT_FLAGGED_REASON: &str = "flagged by moderation";
/// Reason reported when the classifier flags generated output
pub const OUTPUT_FLAGGED_REASON: &str = "flagged";
/// Reason used when the judgment says UNSAFE without explaining
pub const DEFAULT_UNSAFE_REASON: &str = "Content not appropriate for parenting platform";

pub const JUDGMENT_SYSTEM_PROMPT: &str = "You are a content moderation agent for a parenting advice platform.

Check if the content is:
1. Safe and appropriate for parenting discussions
2. Free from harmful, abusive, or inappropriate content
3. Relevant to parenting, child development, or family topics

Respond with:
- \"SAFE\" if content is appropriate
- \"UNSAFE: [reason]\" if content should be blocked

Be permissive for genuine parenting questions, even if they involve challenges.";

/// Settings for the contextual judgment call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModerationConfig {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for ModerationConfig {
    fn default() -> Self {
        Self {
            model: "gpt-3.5-turbo".to_string(),
            max_tokens: 50,
            temperature: 0.0,
        }
    }
}

#[derive(Error, Debug)]
pub enum ModerationError {
    #[error("classifier call failed: {0}")]
    Classifier(#[source] ProviderError),

    #[error("judgment call failed: {0}")]
    Judgment(#[source] ProviderError),

    #[error("judgment reply was empty")]
    EmptyJudgment,
}

pub struct ModerationGate {
    classifier: Arc<dyn Classifier>,
    judge: Arc<dyn Generator>,
    config: ModerationConfig,
    usage: Option<Arc<UsageTracker>>,
}

impl ModerationGate {
    pub fn new(classifier: Arc<dyn Classifier>, judge: Arc<dyn Generator>) -> Self {
        Self {
            classifier,
            judge,
            config: ModerationConfig::default(),
            usage: None,
        }
    }

    pub fn with_config(mut self, config: ModerationConfig) -> Self {
        self.config = config;
        self
    }

    /// Account judgment calls in `tracker`
    pub fn with_usage_tracker(mut self, tracker: Arc<UsageTracker>) -> Self {
        self.usage = Some(tracker);
        self
    }

    pub fn config(&self) -> &ModerationConfig {
        &self.config
    }

    /// Screen user input; never fails (fail-open on provider errors)
    pub async fn check_input(&self, text: &str) -> ModerationResult {
        let verdict = self.try_check_input(text).await;
        self.settle(Direction::Input, verdict)
    }

    /// Screen generated output; never fails (fail-open on provider errors)
    pub async fn check_output(&self, text: &str) -> ModerationResult {
        let verdict = self.try_check_output(text).await;
        self.settle(Direction::Output, verdict)
    }

    pub async fn try_check_input(&self, text: &str) -> Result<ModerationResult, ModerationError> {
        let classification = self
            .classifier
            .classify(text)
            .await
            .map_err(ModerationError::Classifier)?;

        if classification.flagged {
            return Ok(ModerationResult::unsafe_because(
                INPUT_FLAGGED_REASON,
                CLASSIFIER_CONFIDENCE,
            ));
        }

        let request = GenerationRequest {
            messages: vec![
                ChatMessage::system(JUDGMENT_SYSTEM_PROMPT),
                ChatMessage::user(format!("Check this input: {}", text)),
            ],
            model: self.config.model.clone(),
            max_tokens: Some(self.config.max_tokens),
            temperature: self.config.temperature,
        };

        let judgment = self
            .judge
            .generate(request)
            .await
            .map_err(ModerationError::Judgment)?;

        if let Some(usage) = &self.usage {
            usage.track_chat_completion(
                judgment.usage.prompt_tokens,
                judgment.usage.completion_tokens,
                &self.config.model,
            );
        }

        parse_judgment(&judgment.text)
    }

    pub async fn try_check_output(&self, text: &str) -> Result<ModerationResult, ModerationError> {
        let classification = self
            .classifier
            .classify(text)
            .await
            .map_err(ModerationError::Classifier)?;

        if classification.flagged {
            Ok(ModerationResult::unsafe_because(
                OUTPUT_FLAGGED_REASON,
                CLASSIFIER_CONFIDENCE,
            ))
        } else {
            Ok(ModerationResult::safe(CLASSIFIER_CONFIDENCE))
        }
    }

    fn settle(
        &self,
        direction: Direction,
        verdict: Result<ModerationResult, ModerationError>,
    ) -> ModerationResult {
        match verdict {
            Ok(verdict) => {
                tracing::debug!(%direction, %verdict, "moderation verdict");
                verdict
            }
            Err(error) => {
                tracing::warn!(%direction, %error, "moderation check failed, failing open");
                ModerationResult::fail_open(direction)
            }
        }
    }
}

/// Interpret a judgment reply.
///
/// Only a reply opening with `SAFE` passes; any other non-empty reply is a
/// block, with the text after an optional `UNSAFE:` as the reason. Matching
/// ignores ASCII case.
pub fn parse_judgment(reply: &str) -> Result<ModerationResult, ModerationError> {
    let reply = reply.trim();
    if reply.is_empty() {
        return Err(ModerationError::EmptyJudgment);
    }

    if strip_prefix_ignore_case(reply, "SAFE").is_some() {
        return Ok(ModerationResult::safe(JUDGMENT_CONFIDENCE));
    }

    let reason = strip_prefix_ignore_case(reply, "UNSAFE")
        .map(|rest| rest.trim_start_matches(':').trim())
        .unwrap_or(reply);
    let reason = if reason.is_empty() { DEFAULT_UNSAFE_REASON } else { reason };
    Ok(ModerationResult::unsafe_because(reason, JUDGMENT_CONFIDENCE))
}

fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let head = text.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| &text[prefix.len()..])
}
