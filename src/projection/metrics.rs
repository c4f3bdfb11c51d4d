//! SaaS metrics derived from projection output
//!
//! Ratios with a zero denominator are reported as `None` rather than infinity
//! or an error.

use super::cashflows::{PeriodResult, ProjectionResult};
use super::irr::{annual_irr, cagr, roi};
use super::population::saturating_total;
use serde::{Deserialize, Serialize};

/// Monthly-equivalent unit economics of one period
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PeriodMetrics {
    /// Monthly recurring revenue: subscription revenue per month of the period
    pub mrr: f64,
    /// Annual run rate: `mrr × 12`
    pub arr: f64,
    /// Revenue per ending client per month
    pub arpu: Option<f64>,
    /// Marketing spend per new client
    pub cac: Option<f64>,
    /// Lifetime gross margin of a client at the period's churn rate
    pub ltv: Option<f64>,
    /// Months of per-client net income needed to recover the CAC
    pub payback_months: Option<f64>,
}

impl PeriodMetrics {
    pub fn from_period(row: &PeriodResult, months_per_period: u32) -> Self {
        let months = months_per_period as f64;
        let mrr = row.revenue.subscription / months;
        let ending = row.clients.ending as f64;

        let cac = positive(row.clients.new as f64).map(|new| row.marketing_cost / new);
        let margin_per_client = positive(ending).map(|clients| row.gross_profit / clients);
        let ltv = match (margin_per_client, positive(row.churn_rate)) {
            (Some(margin), Some(churn)) => Some(margin / churn),
            _ => None,
        };
        let net_margin_per_client = positive(ending).map(|clients| row.net_income / clients / months);
        let payback_months = match (cac, net_margin_per_client) {
            (Some(cac), Some(margin)) if margin > 0.0 => Some(cac / margin),
            _ => None,
        };

        Self {
            mrr,
            arr: mrr * 12.0,
            arpu: positive(ending).map(|clients| row.total_revenue() / clients / months),
            cac,
            ltv,
            payback_months,
        }
    }

    /// LTV divided by CAC, when both are defined and CAC is non-zero
    pub fn ltv_to_cac(&self) -> Option<f64> {
        match (self.ltv, self.cac) {
            (Some(ltv), Some(cac)) if cac > 0.0 => Some(ltv / cac),
            _ => None,
        }
    }
}

fn positive(value: f64) -> Option<f64> {
    (value > 0.0).then_some(value)
}

/// Headline metrics of a whole projection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SaasMetrics {
    /// Unit economics of the last period
    pub latest: PeriodMetrics,
    /// Total marketing spend over total new clients
    pub blended_cac: Option<f64>,
    pub gross_margin: Option<f64>,
    pub ebitda_margin: Option<f64>,
    pub net_margin: Option<f64>,
    /// Annualised growth of period revenue from the first to the last period
    pub revenue_cagr: Option<f64>,
    /// Annualised IRR of the cash flows to the owners
    pub irr: Option<f64>,
    pub roi: Option<f64>,
}

impl SaasMetrics {
    /// Derive metrics from a finished projection.
    ///
    /// Owner cash flows are the starting cash as the initial outlay, then each
    /// period's change in cash (net income plus funding less loan repayment).
    pub fn from_projection(result: &ProjectionResult, starting_cash: f64) -> Self {
        let frequency = result.frequency;
        let periods = &result.periods;
        let Some(last) = periods.last() else {
            return Self::default();
        };

        let total = |f: fn(&PeriodResult) -> f64| periods.iter().map(f).sum::<f64>();
        let revenue = total(PeriodResult::total_revenue);
        let new_clients = saturating_total(periods.iter().map(|r| r.clients.new));

        let years = (periods.len() - 1) as f64 / frequency.periods_per_year() as f64;
        let first_revenue = periods.first().map(PeriodResult::total_revenue).unwrap_or(0.0);

        let flows: Vec<f64> = std::iter::once(-starting_cash)
            .chain(periods.iter().map(|r| r.net_income + r.funding_inflow - r.loan_repayment))
            .collect();
        let returned: f64 = flows.iter().skip(1).sum();

        Self {
            latest: PeriodMetrics::from_period(last, frequency.months_per_period()),
            blended_cac: positive(new_clients as f64).map(|n| total(|r| r.marketing_cost) / n),
            gross_margin: positive(revenue).map(|rev| total(|r| r.gross_profit) / rev),
            ebitda_margin: positive(revenue).map(|rev| total(|r| r.ebitda) / rev),
            net_margin: positive(revenue).map(|rev| total(|r| r.net_income) / rev),
            revenue_cagr: cagr(first_revenue, last.total_revenue(), years),
            irr: annual_irr(&flows, frequency.periods_per_year()),
            roi: roi(starting_cash, returned),
        }
    }
}
