//! Advisory daily budget checks
//!
//! Alerts never block a call; they only report where spend stands against
//! the configured daily budget.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Fraction of the budget at which the early warning fires
pub const WARNING_RATIO: f64 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BudgetAlert {
    /// Spend passed 80% of the budget
    ApproachingLimit { daily_cost: f64, daily_budget: f64 },
    /// Spend passed the budget
    Exceeded { daily_cost: f64, daily_budget: f64 },
}

impl fmt::Display for BudgetAlert {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            BudgetAlert::ApproachingLimit { daily_cost, daily_budget } => write!(
                f,
                "Daily budget 80% reached: {:.2} / {:.2}",
                daily_cost, daily_budget
            ),
            BudgetAlert::Exceeded { daily_cost, daily_budget } => write!(
                f,
                "Daily budget exceeded: {:.2} / {:.2}",
                daily_cost, daily_budget
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetReport {
    pub alerts: Vec<BudgetAlert>,
    pub daily_cost: f64,
    pub daily_budget: f64,
    pub budget_remaining: f64,
}

impl BudgetReport {
    pub fn evaluate(daily_cost: f64, daily_budget: f64) -> Self {
        let mut alerts = Vec::new();

        if daily_cost > daily_budget * WARNING_RATIO {
            alerts.push(BudgetAlert::ApproachingLimit { daily_cost, daily_budget });
        }

        if daily_cost > daily_budget {
            alerts.push(BudgetAlert::Exceeded { daily_cost, daily_budget });
        }

        Self {
            alerts,
            daily_cost,
            daily_budget,
            budget_remaining: (daily_budget - daily_cost).max(0.0),
        }
    }

    pub fn is_exceeded(&self) -> bool {
        self.alerts
            .iter()
            .any(|a| matches!(a, BudgetAlert::Exceeded { .. }))
    }

    /// Alerts rendered as human-readable lines
    pub fn messages(&self) -> Vec<String> {
        self.alerts.iter().map(|a| a.to_string()).collect()
    }
}
