//! One-month snapshot of the business a reseller partner could bring in
//!
//! Captured clients are split by the normalized plan mix and priced like
//! direct clients, without setup fees. The reseller takes a share of the
//! resulting gross profit.

use crate::assumptions::{AssumptionSet, Plan, UsageAssumptions};
use crate::error::ConfigError;
use super::revenue::{plan_financials, MoneyBreakdown};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Terms of a reseller partnership
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ResellerDeal {
    /// Clients the reseller serves today
    pub client_base: u64,
    /// Share of the reseller's base expected to sign up
    pub capture_fraction: f64,
    /// Share of gross profit paid to the reseller
    pub profit_share: f64,
}

/// Monthly figures of one plan in the snapshot
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ResellerLine {
    pub captured_clients: f64,
    pub revenue: MoneyBreakdown,
    pub cos: MoneyBreakdown,
    pub gross_profit: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResellerSnapshot {
    pub lines: BTreeMap<String, ResellerLine>,
    pub total: ResellerLine,
    /// Paid to the reseller out of total gross profit
    pub reseller_share: f64,
    /// Gross profit kept after the reseller's share
    pub net_gross_profit: f64,
}

impl ResellerDeal {
    fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("reseller.capture_fraction", self.capture_fraction),
            ("reseller.profit_share", self.profit_share),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::FractionOutOfRange { field: field.to_string(), value });
            }
        }
        Ok(())
    }

    /// Price the captured clients against an assumption set's plans and mix
    pub fn snapshot(&self, assumptions: &AssumptionSet) -> Result<ResellerSnapshot, ConfigError> {
        self.validate()?;
        let mix = assumptions.normalized_distribution()?;
        let captured = self.client_base as f64 * self.capture_fraction;

        let plans = mix.iter().filter_map(|(id, weight)| {
            assumptions.plans.get(id).map(|plan| (id, plan, captured * weight))
        });
        Ok(price_lines(plans, &assumptions.usage, self.profit_share))
    }
}

fn price_lines<'a>(
    plans: impl Iterator<Item = (&'a String, &'a Plan, f64)>,
    usage: &UsageAssumptions,
    profit_share: f64,
) -> ResellerSnapshot {
    let mut snapshot = ResellerSnapshot::default();

    for (id, plan, clients) in plans {
        let mut financials = plan_financials(plan, 0.0, clients, usage, 1);
        financials.revenue.setup = 0.0;
        financials.cos.setup = 0.0;

        let line = ResellerLine {
            captured_clients: clients,
            revenue: financials.revenue,
            cos: financials.cos,
            gross_profit: financials.gross_profit(),
        };
        snapshot.total.captured_clients += line.captured_clients;
        snapshot.total.revenue += line.revenue;
        snapshot.total.cos += line.cos;
        snapshot.total.gross_profit += line.gross_profit;
        snapshot.lines.insert(id.clone(), line);
    }

    snapshot.reseller_share = snapshot.total.gross_profit * profit_share;
    snapshot.net_gross_profit = snapshot.total.gross_profit - snapshot.reseller_share;
    snapshot
}
