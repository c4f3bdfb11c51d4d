//! Period aggregator: folds the component calculators over the horizon

use crate::assumptions::{de_annualize, rate_for_period, AssumptionSet, GrowthPhase};
use crate::error::{ProjectionError, ProjectionOutcome};
use super::cashflows::{PeriodResult, PlanPeriod, ProjectionResult};
use super::ledger::{funding_for_period, settle_loan, FundingActivity, RepaymentWindow};
use super::overheads::{marketing_cost, overhead_cost, research_cost};
use super::population::{advance_population, total_movement, PlanMovement};
use super::revenue::plan_financials;
use super::staffing::scale_staff;
use super::state::PeriodState;
use log::info;
use std::collections::BTreeMap;

/// Largest horizon accepted unless configured otherwise (50 years of months)
pub const DEFAULT_MAX_PERIODS: u32 = 600;

/// Limits for a projection run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectionConfig {
    /// Horizons longer than this are rejected before any period is computed
    pub max_periods: u32,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            max_periods: DEFAULT_MAX_PERIODS,
        }
    }
}

/// Values derived once from the assumption set and reused every period
struct RunInputs {
    mix: BTreeMap<String, f64>,
    phases: Vec<GrowthPhase>,
    period_churn: f64,
    repayment_window: RepaymentWindow,
}

/// Main projection engine
pub struct ProjectionEngine {
    assumptions: AssumptionSet,
    config: ProjectionConfig,
}

impl ProjectionEngine {
    pub fn new(assumptions: AssumptionSet, config: ProjectionConfig) -> Self {
        Self { assumptions, config }
    }

    pub fn assumptions(&self) -> &AssumptionSet {
        &self.assumptions
    }

    /// Run the projection over the whole horizon.
    ///
    /// Fails before the first period if the horizon exceeds `max_periods` or
    /// the assumption set is invalid. Once the loop starts it cannot fail.
    pub fn project(&self) -> ProjectionOutcome<ProjectionResult> {
        let horizon = &self.assumptions.horizon;
        if horizon.periods > self.config.max_periods {
            return Err(ProjectionError::ResourceLimit {
                requested: horizon.periods,
                max: self.config.max_periods,
            });
        }
        self.assumptions.validate()?;
        let inputs = self.prepare()?;

        info!(
            "[{}] projecting {} {:?} periods for {} plans",
            self.assumptions.name,
            horizon.periods,
            horizon.frequency,
            self.assumptions.plans.len()
        );

        let mut state = PeriodState::initial(&self.assumptions, &inputs.mix);
        let mut result = ProjectionResult::new(self.assumptions.name.clone(), horizon.frequency);
        for _ in 0..horizon.periods {
            let row = self.calculate_period(&inputs, &mut state);
            result.add_row(row);
        }

        if let Some(last) = result.last() {
            info!(
                "[{}] projection complete: {} clients, ending cash {:.2}",
                self.assumptions.name, last.clients.ending, last.ending_cash
            );
        }
        Ok(result)
    }

    fn prepare(&self) -> ProjectionOutcome<RunInputs> {
        let horizon = &self.assumptions.horizon;
        let last_period = horizon.periods.saturating_sub(1);
        let payback_end = self.assumptions.loan_payback_end()?.unwrap_or(last_period);

        Ok(RunInputs {
            mix: self.assumptions.normalized_distribution()?,
            phases: self.assumptions.growth.sorted_phases(),
            period_churn: de_annualize(
                self.assumptions.clients.annual_churn_rate,
                horizon.frequency.periods_per_year(),
            ),
            repayment_window: RepaymentWindow {
                start: self.assumptions.loan.payback_start_period,
                end: payback_end,
            },
        })
    }

    /// Compute one period and advance `state` to the next
    fn calculate_period(&self, inputs: &RunInputs, state: &mut PeriodState) -> PeriodResult {
        let horizon = &self.assumptions.horizon;
        let period = state.period_index;
        let years = horizon.frequency.years_elapsed(period);

        let mut row = PeriodResult::new(period, horizon.label(period), years);
        row.growth_rate = rate_for_period(period, &inputs.phases, self.assumptions.growth.plateau_rate);
        row.churn_rate = inputs.period_churn;

        let movements = self.project_clients(inputs, state, &mut row);
        self.calculate_sales(&movements, &mut row);

        let funding = funding_for_period(&self.assumptions.funding_rounds, period);
        self.calculate_expenses(state, &movements, &funding, &mut row);
        self.calculate_profit(state, &mut row);
        self.settle_funding(inputs, state, &funding, &mut row);

        state.period_index += 1;
        row
    }

    fn project_clients(
        &self,
        inputs: &RunInputs,
        state: &mut PeriodState,
        row: &mut PeriodResult,
    ) -> BTreeMap<String, PlanMovement> {
        let movements = advance_population(
            &state.clients,
            &mut state.carry,
            row.growth_rate,
            row.churn_rate,
            &inputs.mix,
        );
        state.clients = movements.iter().map(|(id, m)| (id.clone(), m.ending)).collect();
        row.clients = total_movement(&movements);
        movements
    }

    /// Revenue and cost of sales per plan, then totals and gross profit
    fn calculate_sales(&self, movements: &BTreeMap<String, PlanMovement>, row: &mut PeriodResult) {
        let months = self.assumptions.horizon.frequency.months_per_period();

        for (id, movement) in movements {
            let Some(plan) = self.assumptions.plans.get(id) else {
                continue;
            };
            let financials = plan_financials(
                plan,
                movement.new as f64,
                movement.ending as f64,
                &self.assumptions.usage,
                months,
            );
            row.revenue += financials.revenue;
            row.cos += financials.cos;
            row.plans.insert(
                id.clone(),
                PlanPeriod {
                    clients: *movement,
                    revenue: financials.revenue,
                    cos: financials.cos,
                },
            );
        }
        row.gross_profit = row.revenue.total() - row.cos.total();
    }

    fn calculate_expenses(
        &self,
        state: &mut PeriodState,
        movements: &BTreeMap<String, PlanMovement>,
        funding: &FundingActivity,
        row: &mut PeriodResult,
    ) {
        let frequency = self.assumptions.horizon.frequency;
        let months = frequency.months_per_period();
        let years = row.years_elapsed;

        let staffing = scale_staff(&self.assumptions.staffing, &state.headcount, movements, years, months);
        row.staff_cost = staffing.salary_cost();
        row.hiring_cost = staffing.hiring_cost;
        row.hardware_cost = staffing.hardware_cost;
        row.hires = staffing.hires;
        row.onboarding_hours = staffing.hours.onboarding;
        row.maintenance_hours = staffing.hours.maintenance;
        state.headcount = staffing.headcount.clone();
        row.headcount = staffing.headcount;

        let total_revenue = row.revenue.total();
        row.overhead_cost = overhead_cost(&self.assumptions.overheads, years, months);
        row.marketing_cost = marketing_cost(&self.assumptions.marketing, total_revenue, years, months);
        row.research_cost = research_cost(&self.assumptions.research, total_revenue, funding.total());

        row.operating_expenses = row.staff_cost
            + row.hiring_cost
            + row.hardware_cost
            + row.overhead_cost
            + row.marketing_cost
            + row.research_cost;
    }

    /// EBITDA, tax (with optional loss carry-forward) and net income
    fn calculate_profit(&self, state: &mut PeriodState, row: &mut PeriodResult) {
        let tax = &self.assumptions.tax;
        row.ebitda = row.gross_profit - row.operating_expenses;

        let taxable = if tax.carry_forward_losses {
            if row.ebitda < 0.0 {
                state.tax_loss_pool += -row.ebitda;
                0.0
            } else {
                let offset = state.tax_loss_pool.min(row.ebitda);
                state.tax_loss_pool -= offset;
                row.ebitda - offset
            }
        } else {
            row.ebitda.max(0.0)
        };

        row.tax = taxable * tax.rate;
        row.net_income = row.ebitda - row.tax;
    }

    /// Funding inflows, loan interest and repayment, and the cash balance
    fn settle_funding(
        &self,
        inputs: &RunInputs,
        state: &mut PeriodState,
        funding: &FundingActivity,
        row: &mut PeriodResult,
    ) {
        let loan = settle_loan(
            &mut state.loan,
            &self.assumptions.loan,
            inputs.repayment_window,
            row.period_index,
            self.assumptions.horizon.frequency,
            funding.loan_inflow,
            row.net_income,
        );

        row.equity_inflow = funding.equity_inflow;
        row.loan_inflow = funding.loan_inflow;
        row.funding_inflow = funding.total();
        row.equity_fraction_issued = funding.equity_fraction_issued;
        row.loan_interest = loan.interest;
        row.loan_repayment = loan.repayment;
        row.loan_balance = loan.closing_balance;

        row.beginning_cash = state.cash;
        row.ending_cash = row.beginning_cash + row.net_income + row.funding_inflow - row.loan_repayment;
        state.cash = row.ending_cash;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;

    fn engine(assumptions: AssumptionSet) -> ProjectionEngine {
        ProjectionEngine::new(assumptions, ProjectionConfig::default())
    }

    #[test]
    fn test_projection_runs() {
        let result = engine(AssumptionSet::default_pricing()).project().unwrap();

        assert_eq!(result.periods.len(), 36);
        assert_eq!(result.scenario, "base");
        assert_eq!(result.periods[0].period_index, 0);
        assert_eq!(result.periods[0].clients.starting, 10);
        assert!(result.periods[35].clients.ending > 10);
    }

    #[test]
    fn test_horizon_above_limit_rejected() {
        let mut assumptions = AssumptionSet::default_pricing();
        assumptions.horizon.periods = 700;
        let result = engine(assumptions).project();
        assert_eq!(result, Err(ProjectionError::ResourceLimit { requested: 700, max: 600 }));
    }

    #[test]
    fn test_invalid_assumptions_rejected() {
        let mut assumptions = AssumptionSet::default_pricing();
        assumptions.horizon.periods = 0;
        assert_eq!(
            engine(assumptions).project(),
            Err(ProjectionError::Config(ConfigError::EmptyHorizon))
        );
    }

    #[test]
    fn test_period_chaining() {
        let result = engine(AssumptionSet::default_pricing()).project().unwrap();
        for pair in result.periods.windows(2) {
            assert_eq!(pair[1].clients.starting, pair[0].clients.ending);
            assert_eq!(pair[1].beginning_cash, pair[0].ending_cash);
        }
    }

    #[test]
    fn test_cash_identity() {
        let result = engine(AssumptionSet::default_pricing()).project().unwrap();
        for row in &result.periods {
            let expected = row.beginning_cash + row.net_income + row.funding_inflow - row.loan_repayment;
            assert!((row.ending_cash - expected).abs() < 1e-6, "period {}", row.period_index);
        }
    }

    #[test]
    fn test_funding_round_lands_in_trigger_period() {
        let result = engine(AssumptionSet::default_pricing()).project().unwrap();
        assert_eq!(result.periods[6].equity_inflow, 2_000_000.0);
        let total: f64 = result.periods.iter().map(|r| r.funding_inflow).sum();
        assert_eq!(total, 2_000_000.0);
    }

    #[test]
    fn test_tax_loss_carry_forward() {
        let mut assumptions = AssumptionSet::default_pricing();
        assumptions.tax.carry_forward_losses = true;
        let with_pool = engine(assumptions).project().unwrap();
        let without_pool = engine(AssumptionSet::default_pricing()).project().unwrap();

        let taxed = |r: &ProjectionResult| r.periods.iter().map(|p| p.tax).sum::<f64>();
        assert!(taxed(&with_pool) <= taxed(&without_pool));
        assert!(with_pool.periods.iter().all(|p| p.tax >= 0.0));
    }

    #[test]
    fn test_quarterly_labels() {
        let mut assumptions = AssumptionSet::default_pricing();
        assumptions.horizon.frequency = crate::assumptions::Frequency::Quarter;
        assumptions.horizon.periods = 8;
        assumptions.horizon.start_date = chrono::NaiveDate::from_ymd_opt(2025, 1, 1);

        let result = engine(assumptions).project().unwrap();
        assert_eq!(result.periods[0].label, "2025-Q1");
        assert_eq!(result.periods[5].label, "2026-Q2");
        assert_eq!(result.periods[5].years_elapsed, 1);
    }
}
