//! Read-only projections of the usage buckets

use crate::round4;
use crate::tracker::UsageMetrics;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub total_calls: u64,
    pub total_tokens: u64,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub total_cost: f64,
    pub average_cost_per_call: f64,
}

impl DailySummary {
    pub fn from_metrics(date: NaiveDate, metrics: &UsageMetrics) -> Self {
        Self {
            date,
            total_calls: metrics.total_calls,
            total_tokens: metrics.total_tokens(),
            input_tokens: metrics.total_input_tokens,
            output_tokens: metrics.total_output_tokens,
            total_cost: round4(metrics.total_cost),
            average_cost_per_call: round4(metrics.total_cost / metrics.total_calls.max(1) as f64),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_start: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
    pub total_calls: u64,
    pub total_tokens: u64,
    pub total_cost: f64,
}

impl SessionSummary {
    pub fn from_metrics(session_start: DateTime<Utc>, metrics: &UsageMetrics) -> Self {
        Self {
            session_start,
            last_updated: metrics.last_updated,
            total_calls: metrics.total_calls,
            total_tokens: metrics.total_tokens(),
            total_cost: round4(metrics.total_cost),
        }
    }
}
