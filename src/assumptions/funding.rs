//! Funding rounds, loan terms and tax policy

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Instrument of a funding round
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FundingKind {
    /// Equity sale; no repayment obligation
    Equity { equity_fraction: f64 },
    /// Debt drawdown; added to the outstanding loan balance
    Loan,
}

/// One-time cash injection at a given period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundingRound {
    #[serde(default)]
    pub name: String,
    /// 0-based period in which the full amount arrives
    pub trigger_period: u32,
    pub amount: f64,
    pub kind: FundingKind,
}

impl FundingRound {
    pub fn equity(name: impl Into<String>, trigger_period: u32, amount: f64, equity_fraction: f64) -> Self {
        Self {
            name: name.into(),
            trigger_period,
            amount,
            kind: FundingKind::Equity { equity_fraction },
        }
    }

    pub fn loan(name: impl Into<String>, trigger_period: u32, amount: f64) -> Self {
        Self {
            name: name.into(),
            trigger_period,
            amount,
            kind: FundingKind::Loan,
        }
    }
}

/// How the outstanding loan is paid down
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum RepaymentStrategy {
    /// Interest accrues, nothing is repaid
    #[default]
    None,
    /// Fixed payment per period
    FixedAmount { amount: f64 },
    /// Share of the period's positive net income
    ProfitPercentage { fraction: f64 },
    /// Share of positive net income, plus a lump sum in the first profitable repayment period
    ProfitPercentagePlusLump { fraction: f64, lump_sum: f64 },
    /// Lump sum in the first repayment period, then the balance spread evenly to the end period
    Timeline { lump_sum: f64 },
}

/// Terms of the business's pre-existing loan and of any loan drawdowns
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LoanTerms {
    /// Whether `principal` is owed at period 0
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub principal: f64,
    #[serde(default)]
    pub annual_interest_rate: f64,
    #[serde(default)]
    pub strategy: RepaymentStrategy,
    /// First 0-based period in which repayments are made
    #[serde(default)]
    pub payback_start_period: u32,
    /// Last 0-based period in which repayments are made
    #[serde(default)]
    pub payback_end_period: Option<u32>,
    /// Alternative to `payback_end_period`, resolved against the horizon start date
    #[serde(default)]
    pub payback_end_date: Option<NaiveDate>,
}

impl LoanTerms {
    /// Balance owed before period 0
    pub fn opening_balance(&self) -> f64 {
        if self.enabled {
            self.principal
        } else {
            0.0
        }
    }
}

/// Corporate income tax policy
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TaxPolicy {
    #[serde(default)]
    pub rate: f64,
    /// Offset positive EBITDA against losses from earlier periods
    #[serde(default)]
    pub carry_forward_losses: bool,
}

impl TaxPolicy {
    pub fn flat(rate: f64) -> Self {
        Self {
            rate,
            carry_forward_losses: false,
        }
    }
}
