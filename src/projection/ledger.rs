//! Funding rounds and the loan ledger
//!
//! Per period the loan balance first accrues interest, then takes any loan
//! drawdowns, then is reduced by the repayment the strategy calls for. The
//! repayment never exceeds what is owed.

use crate::assumptions::{Frequency, FundingKind, FundingRound, LoanTerms, RepaymentStrategy};
use serde::{Deserialize, Serialize};

/// Outstanding debt carried between periods
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LoanPosition {
    pub balance: f64,
    /// Whether the strategy's one-off lump sum has been paid
    pub lump_sum_paid: bool,
}

impl LoanPosition {
    /// Position before period 0: the pre-existing principal, if the loan is enabled
    pub fn opening(terms: &LoanTerms) -> Self {
        Self {
            balance: terms.opening_balance(),
            lump_sum_paid: false,
        }
    }
}

/// Funding received in one period
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FundingActivity {
    pub equity_inflow: f64,
    pub loan_inflow: f64,
    /// Share of the company sold in this period's equity rounds
    pub equity_fraction_issued: f64,
}

impl FundingActivity {
    pub fn total(&self) -> f64 {
        self.equity_inflow + self.loan_inflow
    }
}

/// Loan movements of one period
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LoanActivity {
    pub interest: f64,
    pub drawdown: f64,
    pub repayment: f64,
    pub closing_balance: f64,
}

/// Inclusive range of 0-based periods in which repayments are made
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepaymentWindow {
    pub start: u32,
    pub end: u32,
}

impl RepaymentWindow {
    pub fn contains(&self, period: u32) -> bool {
        (self.start..=self.end).contains(&period)
    }

    /// Repayment periods left including `period`
    pub fn periods_left(&self, period: u32) -> u32 {
        if period > self.end {
            0
        } else {
            self.end - period + 1
        }
    }
}

/// Funding rounds that trigger in `period`. Each round arrives exactly once.
pub fn funding_for_period(rounds: &[FundingRound], period: u32) -> FundingActivity {
    rounds
        .iter()
        .filter(|round| round.trigger_period == period)
        .fold(FundingActivity::default(), |mut acc, round| {
            match round.kind {
                FundingKind::Equity { equity_fraction } => {
                    acc.equity_inflow += round.amount;
                    acc.equity_fraction_issued += equity_fraction;
                }
                FundingKind::Loan => acc.loan_inflow += round.amount,
            }
            acc
        })
}

/// Repayment the strategy asks for before capping at the balance
fn scheduled_repayment(
    position: &mut LoanPosition,
    strategy: RepaymentStrategy,
    window: RepaymentWindow,
    period: u32,
    months_per_period: u32,
    net_income: f64,
) -> f64 {
    let profit = net_income.max(0.0);
    match strategy {
        RepaymentStrategy::None => 0.0,
        RepaymentStrategy::FixedAmount { amount } => amount * months_per_period as f64,
        RepaymentStrategy::ProfitPercentage { fraction } => fraction * profit,
        // Loss periods pay nothing; the lump waits for the first profitable period
        RepaymentStrategy::ProfitPercentagePlusLump { .. } if net_income <= 0.0 => 0.0,
        RepaymentStrategy::ProfitPercentagePlusLump { fraction, lump_sum } => {
            let lump = take_lump_sum(position, lump_sum);
            lump + fraction * profit
        }
        RepaymentStrategy::Timeline { lump_sum } => {
            let lump = take_lump_sum(position, lump_sum).min(position.balance);
            let remaining = position.balance - lump;
            let periods_left = window.periods_left(period).max(1);
            lump + remaining / periods_left as f64
        }
    }
}

fn take_lump_sum(position: &mut LoanPosition, lump_sum: f64) -> f64 {
    if position.lump_sum_paid {
        return 0.0;
    }
    position.lump_sum_paid = true;
    lump_sum
}

/// Advance the loan by one period.
///
/// `net_income` is the period's after-tax income, used by the profit-share
/// strategies. Interest accrues into the balance only.
pub fn settle_loan(
    position: &mut LoanPosition,
    terms: &LoanTerms,
    window: RepaymentWindow,
    period: u32,
    frequency: Frequency,
    drawdown: f64,
    net_income: f64,
) -> LoanActivity {
    let interest = position.balance * terms.annual_interest_rate / frequency.periods_per_year() as f64;
    position.balance += interest + drawdown;

    let repayment = if window.contains(period) && position.balance > 0.0 {
        let scheduled = scheduled_repayment(
            position,
            terms.strategy,
            window,
            period,
            frequency.months_per_period(),
            net_income,
        );
        scheduled.clamp(0.0, position.balance)
    } else {
        0.0
    };
    position.balance -= repayment;

    LoanActivity {
        interest,
        drawdown,
        repayment,
        closing_balance: position.balance,
    }
}
