//! Moderation verdicts
//!
//! A verdict is produced fresh for every check and never stored. Its
//! confidence is a fixed value per branch, identifying which check decided.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Confidence of a verdict decided by the provider classifier
pub const CLASSIFIER_CONFIDENCE: f32 = 0.9;
/// Confidence of a verdict decided by the contextual judgment call
pub const JUDGMENT_CONFIDENCE: f32 = 0.8;
/// Confidence of a fail-open verdict (no check completed)
pub const FAIL_OPEN_CONFIDENCE: f32 = 0.0;

/// Which text a check is applied to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Input,
    Output,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Direction::Input => write!(f, "input"),
            Direction::Output => write!(f, "output"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModerationResult {
    pub is_safe: bool,
    #[serde(default)]
    pub reason: String,
    pub confidence: f32,
}

impl ModerationResult {
    pub fn safe(confidence: f32) -> Self {
        Self {
            is_safe: true,
            reason: String::new(),
            confidence,
        }
    }

    pub fn unsafe_because(reason: impl Into<String>, confidence: f32) -> Self {
        Self {
            is_safe: false,
            reason: reason.into(),
            confidence,
        }
    }

    /// Verdict used when the check itself could not complete
    pub fn fail_open(direction: Direction) -> Self {
        Self {
            is_safe: true,
            reason: format!("{} moderation check failed", direction),
            confidence: FAIL_OPEN_CONFIDENCE,
        }
    }

    pub fn is_fail_open(&self) -> bool {
        self.is_safe && self.confidence == FAIL_OPEN_CONFIDENCE
    }
}

impl fmt::Display for ModerationResult {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_safe {
            write!(f, "SAFE ({:.1})", self.confidence)
        } else {
            write!(f, "UNSAFE ({:.1}): {}", self.confidence, self.reason)
        }
    }
}
