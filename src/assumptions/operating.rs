//! Operating expense assumptions: overheads, marketing and R&D

use serde::{Deserialize, Serialize};

/// Fixed overhead line, escalated once per completed year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverheadItem {
    pub name: String,
    pub monthly_cost: f64,
    #[serde(default)]
    pub annual_escalation: f64,
}

impl OverheadItem {
    pub fn new(name: impl Into<String>, monthly_cost: f64, annual_escalation: f64) -> Self {
        Self {
            name: name.into(),
            monthly_cost,
            annual_escalation,
        }
    }

    /// Monthly cost after `years` completed years of escalation
    pub fn monthly_cost_at(&self, years: u32) -> f64 {
        self.monthly_cost * (1.0 + self.annual_escalation).powi(years as i32)
    }
}

/// Marketing spend policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum MarketingConfig {
    /// Fixed monthly budget, optionally escalated annually
    Fixed {
        monthly_amount: f64,
        #[serde(default)]
        annual_escalation: f64,
    },
    /// Share of the same period's total revenue
    PercentOfRevenue { fraction: f64 },
}

impl Default for MarketingConfig {
    fn default() -> Self {
        MarketingConfig::Fixed {
            monthly_amount: 0.0,
            annual_escalation: 0.0,
        }
    }
}

/// R&D spend, expensed in the period it arises
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ResearchConfig {
    /// Share of total revenue spent on R&D
    #[serde(default)]
    pub revenue_fraction: f64,
    /// Share of funding received in a period that is spent on R&D in that period
    #[serde(default)]
    pub funding_fraction: f64,
}
