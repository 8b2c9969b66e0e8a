//! Advisor Usage: token accounting and cost tracking
//!
//! One [`UsageTracker`] is created at process start and shared by every
//! request. Each tracked provider call adds to a session bucket and to the
//! bucket of the current UTC day; nothing is persisted, and the only reset is
//! a new day getting a fresh bucket.
//!
//! # Example
//!
//! ```
//! use advisor_usage::UsageTracker;
//!
//! let tracker = UsageTracker::new();
//! let cost = tracker.track_chat_completion(100, 200, "gpt-4");
//! assert!((cost - 0.015).abs() < 1e-9);
//! assert_eq!(tracker.session_summary().total_calls, 1);
//!
//! let report = tracker.check_budget_alerts(5.0);
//! assert!(report.alerts.is_empty());
//! ```

pub mod budget;
pub mod pricing;
pub mod summary;
pub mod tracker;

pub use budget::{BudgetAlert, BudgetReport};
pub use pricing::{ModelPrice, PriceTable, PricingError};
pub use summary::{DailySummary, SessionSummary};
pub use tracker::{UsageMetrics, UsageTracker};

/// Round a dollar amount to four decimal places for reporting
pub(crate) fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}
