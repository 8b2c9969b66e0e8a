//! Usage tracker: session and daily buckets
//!
//! Thread-safe: both buckets live behind one mutex, so an increment and the
//! read that follows it are atomic with respect to other requests.

use crate::budget::BudgetReport;
use crate::pricing::PriceTable;
use crate::summary::{DailySummary, SessionSummary};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;

/// Calls costing more than this are logged
const HIGH_COST_USD: f64 = 0.10;

/// Accumulated usage for one bucket. Counters only ever grow.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageMetrics {
    pub total_calls: u64,
    pub total_input_tokens: u64,
    pub total_output_tokens: u64,
    pub total_cost: f64,
    pub last_updated: Option<DateTime<Utc>>,
}

impl UsageMetrics {
    pub fn total_tokens(&self) -> u64 {
        self.total_input_tokens + self.total_output_tokens
    }

    fn record(&mut self, input_tokens: u64, output_tokens: u64, cost: f64, at: DateTime<Utc>) {
        self.total_calls += 1;
        self.total_input_tokens += input_tokens;
        self.total_output_tokens += output_tokens;
        self.total_cost += cost;
        self.last_updated = Some(at);
    }
}

#[derive(Debug, Default)]
struct Ledger {
    session: UsageMetrics,
    daily: HashMap<NaiveDate, UsageMetrics>,
}

#[derive(Debug)]
pub struct UsageTracker {
    prices: PriceTable,
    session_start: DateTime<Utc>,
    ledger: Mutex<Ledger>,
}

impl UsageTracker {
    pub fn new() -> Self {
        Self::with_prices(PriceTable::default())
    }

    pub fn with_prices(prices: PriceTable) -> Self {
        Self {
            prices,
            session_start: Utc::now(),
            ledger: Mutex::new(Ledger::default()),
        }
    }

    pub fn prices(&self) -> &PriceTable {
        &self.prices
    }

    /// Cost of a call; unknown models cost nothing and are logged
    pub fn calculate_cost(&self, input_tokens: u64, output_tokens: u64, model: &str) -> f64 {
        match self.prices.get(model) {
            Some(price) => price.cost(input_tokens, output_tokens),
            None => {
                tracing::warn!(model, "unknown model for pricing");
                0.0
            }
        }
    }

    /// Record a chat completion and return its cost in USD
    pub fn track_chat_completion(&self, input_tokens: u64, output_tokens: u64, model: &str) -> f64 {
        self.track_chat_completion_at(input_tokens, output_tokens, model, Utc::now())
    }

    pub fn track_chat_completion_at(
        &self,
        input_tokens: u64,
        output_tokens: u64,
        model: &str,
        at: DateTime<Utc>,
    ) -> f64 {
        let cost = self.calculate_cost(input_tokens, output_tokens, model);
        self.record(input_tokens, output_tokens, cost, at);

        if cost > HIGH_COST_USD {
            tracing::info!(
                model,
                cost_usd = cost,
                tokens = input_tokens + output_tokens,
                "high cost API call"
            );
        }

        cost
    }

    /// Record an embedding call and return its cost in USD
    pub fn track_embedding(&self, input_tokens: u64, model: &str) -> f64 {
        self.track_embedding_at(input_tokens, model, Utc::now())
    }

    pub fn track_embedding_at(&self, input_tokens: u64, model: &str, at: DateTime<Utc>) -> f64 {
        let cost = self.calculate_cost(input_tokens, 0, model);
        self.record(input_tokens, 0, cost, at);
        cost
    }

    fn record(&self, input_tokens: u64, output_tokens: u64, cost: f64, at: DateTime<Utc>) {
        let mut ledger = self.ledger.lock().unwrap_or_else(|e| e.into_inner());
        ledger.session.record(input_tokens, output_tokens, cost, at);
        ledger
            .daily
            .entry(at.date_naive())
            .or_default()
            .record(input_tokens, output_tokens, cost, at);
    }

    /// Summary for `date`, or today (UTC) when `None`
    pub fn daily_summary(&self, date: Option<NaiveDate>) -> DailySummary {
        let date = date.unwrap_or_else(|| Utc::now().date_naive());
        let metrics = self.daily_metrics(date);
        DailySummary::from_metrics(date, &metrics)
    }

    pub fn session_summary(&self) -> SessionSummary {
        let ledger = self.ledger.lock().unwrap_or_else(|e| e.into_inner());
        SessionSummary::from_metrics(self.session_start, &ledger.session)
    }

    pub fn daily_metrics(&self, date: NaiveDate) -> UsageMetrics {
        let ledger = self.ledger.lock().unwrap_or_else(|e| e.into_inner());
        ledger.daily.get(&date).cloned().unwrap_or_default()
    }

    /// Budget report for today (UTC)
    pub fn check_budget_alerts(&self, daily_budget: f64) -> BudgetReport {
        self.check_budget_alerts_on(Utc::now().date_naive(), daily_budget)
    }

    pub fn check_budget_alerts_on(&self, date: NaiveDate, daily_budget: f64) -> BudgetReport {
        let daily_cost = self.daily_metrics(date).total_cost;
        BudgetReport::evaluate(daily_cost, daily_budget)
    }
}

impl Default for UsageTracker {
    fn default() -> Self {
        Self::new()
    }
}
