//! Period output rows and the projection result

use crate::assumptions::Frequency;
use super::population::PlanMovement;
use super::revenue::MoneyBreakdown;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Clients, revenue and cost of sales of one plan in one period
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanPeriod {
    pub clients: PlanMovement,
    pub revenue: MoneyBreakdown,
    pub cos: MoneyBreakdown,
}

/// One period of a projection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PeriodResult {
    // Timing
    pub period_index: u32,
    pub label: String,
    pub years_elapsed: u32,
    pub growth_rate: f64,
    pub churn_rate: f64,

    // Clients and sales
    pub plans: BTreeMap<String, PlanPeriod>,
    pub clients: PlanMovement,
    pub revenue: MoneyBreakdown,
    pub cos: MoneyBreakdown,
    pub gross_profit: f64,

    // Staffing
    pub headcount: BTreeMap<String, u32>,
    pub hires: u32,
    pub onboarding_hours: f64,
    pub maintenance_hours: f64,

    // Operating expenses
    pub staff_cost: f64,
    pub hiring_cost: f64,
    pub hardware_cost: f64,
    pub overhead_cost: f64,
    pub marketing_cost: f64,
    pub research_cost: f64,
    pub operating_expenses: f64,

    // Profit
    pub ebitda: f64,
    pub tax: f64,
    pub net_income: f64,

    // Cash and funding
    pub beginning_cash: f64,
    pub equity_inflow: f64,
    pub loan_inflow: f64,
    pub funding_inflow: f64,
    pub equity_fraction_issued: f64,
    pub loan_interest: f64,
    pub loan_repayment: f64,
    pub loan_balance: f64,
    pub ending_cash: f64,
}

impl PeriodResult {
    pub fn new(period_index: u32, label: String, years_elapsed: u32) -> Self {
        Self {
            period_index,
            label,
            years_elapsed,
            ..Default::default()
        }
    }

    pub fn total_revenue(&self) -> f64 {
        self.revenue.total()
    }

    pub fn total_cos(&self) -> f64 {
        self.cos.total()
    }

    pub fn total_headcount(&self) -> u64 {
        self.headcount.values().map(|&h| u64::from(h)).sum()
    }

    /// Gross profit as a share of revenue; 0 when there is no revenue
    pub fn gross_margin(&self) -> f64 {
        ratio(self.gross_profit, self.total_revenue())
    }

    pub fn ebitda_margin(&self) -> f64 {
        ratio(self.ebitda, self.total_revenue())
    }

    pub fn net_margin(&self) -> f64 {
        ratio(self.net_income, self.total_revenue())
    }
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

/// Ordered period rows of one scenario. Read-only once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionResult {
    pub scenario: String,
    pub frequency: Frequency,
    pub periods: Vec<PeriodResult>,
}

impl ProjectionResult {
    pub fn new(scenario: impl Into<String>, frequency: Frequency) -> Self {
        Self {
            scenario: scenario.into(),
            frequency,
            periods: Vec::new(),
        }
    }

    pub fn add_row(&mut self, row: PeriodResult) {
        self.periods.push(row);
    }

    pub fn last(&self) -> Option<&PeriodResult> {
        self.periods.last()
    }

    /// Totals over the horizon and closing positions
    pub fn summary(&self) -> ProjectionSummary {
        let sum = |f: fn(&PeriodResult) -> f64| self.periods.iter().map(f).sum::<f64>();
        let last = self.periods.last();

        ProjectionSummary {
            periods: self.periods.len() as u32,
            total_revenue: sum(PeriodResult::total_revenue),
            total_cos: sum(PeriodResult::total_cos),
            total_gross_profit: sum(|r| r.gross_profit),
            total_operating_expenses: sum(|r| r.operating_expenses),
            total_tax: sum(|r| r.tax),
            total_net_income: sum(|r| r.net_income),
            total_funding: sum(|r| r.funding_inflow),
            total_loan_repayment: sum(|r| r.loan_repayment),
            final_clients: last.map(|r| r.clients.ending).unwrap_or(0),
            final_headcount: last.map(PeriodResult::total_headcount).unwrap_or(0),
            final_cash: last.map(|r| r.ending_cash).unwrap_or(0.0),
            final_loan_balance: last.map(|r| r.loan_balance).unwrap_or(0.0),
            min_cash: self
                .periods
                .iter()
                .map(|r| r.ending_cash)
                .reduce(f64::min)
                .unwrap_or(0.0),
        }
    }
}

/// Summary statistics for a projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionSummary {
    pub periods: u32,
    pub total_revenue: f64,
    pub total_cos: f64,
    pub total_gross_profit: f64,
    pub total_operating_expenses: f64,
    pub total_tax: f64,
    pub total_net_income: f64,
    pub total_funding: f64,
    pub total_loan_repayment: f64,
    pub final_clients: u64,
    pub final_headcount: u64,
    pub final_cash: f64,
    pub final_loan_balance: f64,
    /// Lowest ending cash of any period
    pub min_cash: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(index: u32, revenue: f64, net_income: f64, ending_cash: f64) -> PeriodResult {
        let mut r = PeriodResult::new(index, format!("P{}", index), 0);
        r.revenue.subscription = revenue;
        r.gross_profit = revenue * 0.6;
        r.net_income = net_income;
        r.ending_cash = ending_cash;
        r
    }

    #[test]
    fn test_margins_guard_zero_revenue() {
        let r = row(0, 0.0, -100.0, 0.0);
        assert_eq!(r.gross_margin(), 0.0);
        assert_eq!(r.net_margin(), 0.0);

        let r = row(0, 1_000.0, 250.0, 0.0);
        assert!((r.gross_margin() - 0.6).abs() < 1e-12);
        assert_eq!(r.net_margin(), 0.25);
    }

    #[test]
    fn test_summary_totals_and_min_cash() {
        let mut result = ProjectionResult::new("base", Frequency::Month);
        result.add_row(row(0, 100.0, -50.0, 950.0));
        result.add_row(row(1, 200.0, -20.0, 400.0));
        result.add_row(row(2, 300.0, 30.0, 700.0));

        let summary = result.summary();
        assert_eq!(summary.periods, 3);
        assert_eq!(summary.total_revenue, 600.0);
        assert_eq!(summary.total_net_income, -40.0);
        assert_eq!(summary.final_cash, 700.0);
        assert_eq!(summary.min_cash, 400.0);
    }

    #[test]
    fn test_empty_summary() {
        let summary = ProjectionResult::new("empty", Frequency::Year).summary();
        assert_eq!(summary.periods, 0);
        assert_eq!(summary.final_clients, 0);
        assert_eq!(summary.min_cash, 0.0);
    }
}
