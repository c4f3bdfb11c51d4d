//! Projection assumptions: horizon, plans, growth, staffing, operating costs and funding

mod horizon;
mod growth;
mod plans;
mod staffing;
mod operating;
mod funding;
pub mod loader;

pub use horizon::{Frequency, Horizon};
pub use growth::{GrowthCurve, GrowthPhase, rate_for_period, de_annualize};
pub use plans::{Plan, PlanCatalog};
pub use staffing::{
    FixedRole, ScalingRole, WorkloadKind, PlanWorkload, StaffingAssumptions, salary_after_raises,
};
pub use operating::{OverheadItem, MarketingConfig, ResearchConfig};
pub use funding::{FundingKind, FundingRound, RepaymentStrategy, LoanTerms, TaxPolicy};

use crate::error::ConfigError;
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

/// Tolerance within which plan distribution weights are treated as summing to one
pub const DISTRIBUTION_TOLERANCE: f64 = 1e-6;

/// Starting client base and attrition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientAssumptions {
    pub initial_clients: u64,
    /// Relative weight of each plan among initial and new clients.
    /// Weights are normalized by their sum at use time.
    pub plan_distribution: BTreeMap<String, f64>,
    /// Fraction of clients lost per year
    #[serde(default)]
    pub annual_churn_rate: f64,
}

/// Population-level overage model: a share of clients tops up, each using
/// `utilization_fraction` of its plan's included quota again as extra units
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageAssumptions {
    #[serde(default)]
    pub topup_client_fraction: f64,
    #[serde(default)]
    pub utilization_fraction: f64,
}

/// Complete, immutable input to a projection run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssumptionSet {
    #[serde(default = "default_name")]
    pub name: String,
    pub horizon: Horizon,
    #[serde(default)]
    pub starting_cash: f64,
    pub clients: ClientAssumptions,
    #[serde(default)]
    pub growth: GrowthCurve,
    pub plans: PlanCatalog,
    #[serde(default)]
    pub usage: UsageAssumptions,
    #[serde(default)]
    pub staffing: StaffingAssumptions,
    #[serde(default)]
    pub overheads: Vec<OverheadItem>,
    #[serde(default)]
    pub marketing: MarketingConfig,
    #[serde(default)]
    pub research: ResearchConfig,
    #[serde(default)]
    pub funding_rounds: Vec<FundingRound>,
    #[serde(default)]
    pub loan: LoanTerms,
    #[serde(default)]
    pub tax: TaxPolicy,
}

fn default_name() -> String {
    "base".to_string()
}

impl AssumptionSet {
    /// Baseline assumption set mirroring the pricing dashboard defaults
    pub fn default_pricing() -> Self {
        let mut plans = PlanCatalog::new();
        plans.insert(
            "Basic",
            Plan::new(5_000.0, 4_000.0, 2_000.0, 3_000.0)
                .with_quota(5_000.0, 300.0, (0.08, 0.08), (0.05, 0.05)),
        );
        plans.insert(
            "Pro",
            Plan::new(12_000.0, 8_000.0, 4_500.0, 5_000.0)
                .with_quota(15_000.0, 1_000.0, (0.07, 0.07), (0.05, 0.05)),
        );

        let mut workload = BTreeMap::new();
        workload.insert("Basic".to_string(), PlanWorkload::new(12.0, 4.0).with_decay(0.9, 0.95));
        workload.insert("Pro".to_string(), PlanWorkload::new(24.0, 8.0).with_decay(0.9, 0.95));

        let mut distribution = BTreeMap::new();
        distribution.insert("Basic".to_string(), 0.7);
        distribution.insert("Pro".to_string(), 0.3);

        Self {
            name: default_name(),
            horizon: Horizon::monthly(36),
            starting_cash: 500_000.0,
            clients: ClientAssumptions {
                initial_clients: 10,
                plan_distribution: distribution,
                annual_churn_rate: 0.10,
            },
            growth: GrowthCurve {
                phases: vec![
                    GrowthPhase { start_period: 0, end_period: 2, start_rate: 0.03, end_rate: 0.05 },
                    GrowthPhase { start_period: 3, end_period: 7, start_rate: 0.06, end_rate: 0.15 },
                    GrowthPhase { start_period: 8, end_period: 11, start_rate: 0.16, end_rate: 0.25 },
                ],
                plateau_rate: 0.10,
            },
            plans,
            usage: UsageAssumptions {
                topup_client_fraction: 0.2,
                utilization_fraction: 0.25,
            },
            staffing: StaffingAssumptions {
                fixed: vec![
                    FixedRole { role: "CEO".into(), headcount: 1, base_salary: 150_000.0, annual_raise: 0.07 },
                    FixedRole { role: "CTO".into(), headcount: 1, base_salary: 130_000.0, annual_raise: 0.07 },
                ],
                scaling: vec![
                    ScalingRole {
                        role: "Onboarding Specialist".into(),
                        min_headcount: 1,
                        base_salary: 30_000.0,
                        annual_raise: 0.05,
                        capacity_hours: 160.0,
                        workload: WorkloadKind::Onboarding,
                    },
                    ScalingRole {
                        role: "Technical Support".into(),
                        min_headcount: 1,
                        base_salary: 35_000.0,
                        annual_raise: 0.05,
                        capacity_hours: 160.0,
                        workload: WorkloadKind::Maintenance,
                    },
                ],
                workload,
                hardware_cost_per_employee: 500.0,
                hiring_cost_per_hire: 10_000.0,
            },
            overheads: vec![
                OverheadItem::new("Office Rental", 10_000.0, 0.05),
                OverheadItem::new("Communications", 3_000.0, 0.05),
                OverheadItem::new("Administration", 2_000.0, 0.05),
                OverheadItem::new("Insurance", 1_500.0, 0.05),
                OverheadItem::new("Legal", 5_000.0, 0.05),
                OverheadItem::new("Software Subscriptions", 5_000.0, 0.05),
            ],
            marketing: MarketingConfig::Fixed {
                monthly_amount: 10_000.0,
                annual_escalation: 0.0,
            },
            research: ResearchConfig::default(),
            funding_rounds: vec![FundingRound::equity("Seed", 6, 2_000_000.0, 0.15)],
            loan: LoanTerms::default(),
            tax: TaxPolicy::flat(0.27),
        }
    }

    /// Load an assumption set from a JSON file
    pub fn from_json_path(path: &Path) -> Result<Self, crate::error::LoadError> {
        loader::load_assumptions(path)
    }

    /// Plan weights divided by their sum.
    ///
    /// Weights that do not sum to one are accepted and rescaled; the caller is
    /// warned once during validation.
    pub fn normalized_distribution(&self) -> Result<BTreeMap<String, f64>, ConfigError> {
        let total: f64 = self.clients.plan_distribution.values().sum();
        if !(total > 0.0) || !total.is_finite() {
            return Err(ConfigError::EmptyDistribution);
        }
        Ok(self
            .clients
            .plan_distribution
            .iter()
            .map(|(plan, weight)| (plan.clone(), weight / total))
            .collect())
    }

    /// Last period in which the loan is repaid, from the explicit period or the end date
    pub fn loan_payback_end(&self) -> Result<Option<u32>, ConfigError> {
        if let Some(end) = self.loan.payback_end_period {
            return Ok(Some(end));
        }
        let Some(date) = self.loan.payback_end_date else {
            return Ok(None);
        };
        match self.horizon.start_date {
            // Undated horizon: the date cannot be placed, repay until the horizon ends
            None => Ok(None),
            Some(start) => self
                .horizon
                .period_for_date(date)
                .map(Some)
                .ok_or_else(|| ConfigError::PaybackDateBeforeStart {
                    date: date.to_string(),
                    start: start.to_string(),
                }),
        }
    }

    /// Check structural consistency. Called by the engine before any period is computed.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.horizon.periods == 0 {
            return Err(ConfigError::EmptyHorizon);
        }
        if self.plans.is_empty() {
            return Err(ConfigError::EmptyPlanCatalog);
        }

        non_negative("starting_cash", self.starting_cash)?;

        for (id, plan) in self.plans.iter() {
            for (field, value) in plan.numeric_fields() {
                non_negative(&format!("plans.{}.{}", id, field), value)?;
            }
        }

        fraction("clients.annual_churn_rate", self.clients.annual_churn_rate)?;
        for (plan, weight) in &self.clients.plan_distribution {
            if !self.plans.contains(plan) {
                return Err(ConfigError::UnknownPlan {
                    plan: plan.clone(),
                    context: "clients.plan_distribution".to_string(),
                });
            }
            non_negative(&format!("clients.plan_distribution.{}", plan), *weight)?;
        }
        let weight_sum: f64 = self.clients.plan_distribution.values().sum();
        self.normalized_distribution()?;
        if (weight_sum - 1.0).abs() > DISTRIBUTION_TOLERANCE {
            warn!(
                "[{}] plan distribution sums to {:.6}; weights will be normalized",
                self.name, weight_sum
            );
        }

        for (index, phase) in self.growth.phases.iter().enumerate() {
            if phase.end_period < phase.start_period {
                return Err(ConfigError::InvertedPhase {
                    index,
                    start: phase.start_period,
                    end: phase.end_period,
                });
            }
            non_negative(&format!("growth.phases[{}].start_rate", index), phase.start_rate)?;
            non_negative(&format!("growth.phases[{}].end_rate", index), phase.end_rate)?;
        }
        non_negative("growth.plateau_rate", self.growth.plateau_rate)?;
        for (from, to) in self.growth.gaps() {
            warn!(
                "[{}] growth phases leave periods {}..={} uncovered; the previous phase's end rate is held",
                self.name, from, to
            );
        }
        if self.growth.has_overlap() {
            warn!("[{}] growth phases overlap; the earliest-starting phase wins", self.name);
        }

        fraction("usage.topup_client_fraction", self.usage.topup_client_fraction)?;
        non_negative("usage.utilization_fraction", self.usage.utilization_fraction)?;

        self.validate_staffing()?;

        for item in &self.overheads {
            non_negative(&format!("overheads.{}.monthly_cost", item.name), item.monthly_cost)?;
            non_negative(&format!("overheads.{}.annual_escalation", item.name), item.annual_escalation)?;
        }
        match self.marketing {
            MarketingConfig::Fixed { monthly_amount, annual_escalation } => {
                non_negative("marketing.monthly_amount", monthly_amount)?;
                non_negative("marketing.annual_escalation", annual_escalation)?;
            }
            MarketingConfig::PercentOfRevenue { fraction: f } => {
                fraction("marketing.fraction", f)?;
            }
        }
        fraction("research.revenue_fraction", self.research.revenue_fraction)?;
        fraction("research.funding_fraction", self.research.funding_fraction)?;

        for round in &self.funding_rounds {
            non_negative(&format!("funding_rounds.{}.amount", round.name), round.amount)?;
            if let FundingKind::Equity { equity_fraction } = round.kind {
                fraction(&format!("funding_rounds.{}.equity_fraction", round.name), equity_fraction)?;
            }
        }

        self.validate_loan()?;

        fraction("tax.rate", self.tax.rate)?;
        Ok(())
    }

    fn validate_staffing(&self) -> Result<(), ConfigError> {
        let staffing = &self.staffing;
        let mut roles = HashSet::new();

        for role in &staffing.fixed {
            if !roles.insert(role.role.as_str()) {
                return Err(ConfigError::DuplicateRole { role: role.role.clone() });
            }
            non_negative(&format!("staffing.fixed.{}.base_salary", role.role), role.base_salary)?;
            non_negative(&format!("staffing.fixed.{}.annual_raise", role.role), role.annual_raise)?;
        }
        for role in &staffing.scaling {
            if !roles.insert(role.role.as_str()) {
                return Err(ConfigError::DuplicateRole { role: role.role.clone() });
            }
            if !(role.capacity_hours > 0.0) || !role.capacity_hours.is_finite() {
                return Err(ConfigError::ZeroCapacity { role: role.role.clone() });
            }
            non_negative(&format!("staffing.scaling.{}.base_salary", role.role), role.base_salary)?;
            non_negative(&format!("staffing.scaling.{}.annual_raise", role.role), role.annual_raise)?;
        }
        for (plan, workload) in &staffing.workload {
            if !self.plans.contains(plan) {
                return Err(ConfigError::UnknownPlan {
                    plan: plan.clone(),
                    context: "staffing.workload".to_string(),
                });
            }
            non_negative(&format!("staffing.workload.{}.onboarding_hours", plan), workload.onboarding_hours)?;
            non_negative(&format!("staffing.workload.{}.maintenance_hours", plan), workload.maintenance_hours)?;
            fraction(&format!("staffing.workload.{}.onboarding_decay", plan), workload.onboarding_decay)?;
            fraction(&format!("staffing.workload.{}.maintenance_decay", plan), workload.maintenance_decay)?;
        }
        non_negative("staffing.hardware_cost_per_employee", staffing.hardware_cost_per_employee)?;
        non_negative("staffing.hiring_cost_per_hire", staffing.hiring_cost_per_hire)?;
        Ok(())
    }

    fn validate_loan(&self) -> Result<(), ConfigError> {
        let loan = &self.loan;
        non_negative("loan.principal", loan.principal)?;
        non_negative("loan.annual_interest_rate", loan.annual_interest_rate)?;
        match loan.strategy {
            RepaymentStrategy::None => {}
            RepaymentStrategy::FixedAmount { amount } => non_negative("loan.amount", amount)?,
            RepaymentStrategy::ProfitPercentage { fraction: f } => fraction("loan.fraction", f)?,
            RepaymentStrategy::ProfitPercentagePlusLump { fraction: f, lump_sum } => {
                fraction("loan.fraction", f)?;
                non_negative("loan.lump_sum", lump_sum)?;
            }
            RepaymentStrategy::Timeline { lump_sum } => non_negative("loan.lump_sum", lump_sum)?,
        }
        if let Some(end) = self.loan_payback_end()? {
            if end < loan.payback_start_period {
                return Err(ConfigError::InvertedPayback {
                    start: loan.payback_start_period,
                    end,
                });
            }
        }
        Ok(())
    }
}

fn non_negative(field: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NegativeValue { field: field.to_string(), value })
    }
}

fn fraction(field: &str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::FractionOutOfRange { field: field.to_string(), value })
    }
}
