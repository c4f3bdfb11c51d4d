//! Revenue and cost-of-sales per plan
//!
//! Subscription revenue is billed on the ending client count, setup fees on new
//! signups only. Overage is a population-level approximation: a fixed share of
//! clients tops up, each consuming `utilization_fraction` of its plan's quota
//! again as extra billable units. Usage is not tracked per client.

use crate::assumptions::{Plan, UsageAssumptions};
use serde::{Deserialize, Serialize};
use std::ops::AddAssign;

/// Subscription / setup / overage split of a money amount
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MoneyBreakdown {
    pub subscription: f64,
    pub setup: f64,
    pub overage: f64,
}

impl MoneyBreakdown {
    pub fn total(&self) -> f64 {
        self.subscription + self.setup + self.overage
    }
}

impl AddAssign for MoneyBreakdown {
    fn add_assign(&mut self, rhs: Self) {
        self.subscription += rhs.subscription;
        self.setup += rhs.setup;
        self.overage += rhs.overage;
    }
}

/// Revenue and cost of sales of one plan for one period
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanFinancials {
    pub revenue: MoneyBreakdown,
    pub cos: MoneyBreakdown,
}

impl PlanFinancials {
    pub fn gross_profit(&self) -> f64 {
        self.revenue.total() - self.cos.total()
    }
}

/// Extra (messages, minutes) consumed beyond quota by `clients` over one period
pub fn overage_units(plan: &Plan, clients: f64, usage: &UsageAssumptions, months_per_period: u32) -> (f64, f64) {
    let buyers = clients * usage.topup_client_fraction;
    let months = months_per_period as f64;
    let messages = buyers * plan.included_messages * months * usage.utilization_fraction;
    let minutes = buyers * plan.included_minutes * months * usage.utilization_fraction;
    (messages, minutes)
}

/// Revenue and COS of a plan given its new signups and ending client count
pub fn plan_financials(
    plan: &Plan,
    new_clients: f64,
    ending_clients: f64,
    usage: &UsageAssumptions,
    months_per_period: u32,
) -> PlanFinancials {
    let months = months_per_period as f64;
    let (extra_messages, extra_minutes) = overage_units(plan, ending_clients, usage, months_per_period);

    let revenue = MoneyBreakdown {
        subscription: ending_clients * plan.monthly_price * months,
        setup: new_clients * plan.setup_price,
        overage: extra_messages * plan.overage_message_price + extra_minutes * plan.overage_minute_price,
    };
    let cos = MoneyBreakdown {
        subscription: ending_clients * plan.monthly_cost * months,
        setup: new_clients * plan.setup_cost,
        overage: extra_messages * plan.overage_message_cost + extra_minutes * plan.overage_minute_cost,
    };

    PlanFinancials { revenue, cos }
}
