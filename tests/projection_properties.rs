//! Whole-engine properties checked against hand-built assumption sets

use approx::assert_relative_eq;
use saas_projection::assumptions::loader::load_assumptions;
use saas_projection::projection::population::PLAN_CLIENT_CAP;
use saas_projection::projection::DEFAULT_MAX_PERIODS;
use saas_projection::assumptions::{
    ClientAssumptions, FundingRound, GrowthCurve, GrowthPhase, LoanTerms, MarketingConfig, OverheadItem,
    PlanWorkload, RepaymentStrategy, ScalingRole, StaffingAssumptions, TaxPolicy, UsageAssumptions,
    WorkloadKind,
};
use saas_projection::{
    AssumptionSet, ConfigError, Horizon, Plan, PlanCatalog, ProjectionConfig, ProjectionEngine, ProjectionError,
    ProjectionResult, ScenarioRunner, ScenarioVariant,
};
use std::collections::BTreeMap;
use std::path::Path;

/// 12 months, 10 Basic clients, no growth, no churn, one support role
fn steady_state() -> AssumptionSet {
    let mut plans = PlanCatalog::new();
    plans.insert("Basic", Plan::new(5_000.0, 4_000.0, 2_000.0, 3_000.0));

    let mut distribution = BTreeMap::new();
    distribution.insert("Basic".to_string(), 1.0);

    let mut workload = BTreeMap::new();
    workload.insert("Basic".to_string(), PlanWorkload::new(30.0, 2.0));

    AssumptionSet {
        name: "steady".to_string(),
        horizon: Horizon::monthly(12),
        starting_cash: 100_000.0,
        clients: ClientAssumptions {
            initial_clients: 10,
            plan_distribution: distribution,
            annual_churn_rate: 0.0,
        },
        growth: GrowthCurve::flat(0.0),
        plans,
        usage: UsageAssumptions::default(),
        staffing: StaffingAssumptions {
            fixed: Vec::new(),
            scaling: vec![ScalingRole {
                role: "Support".into(),
                min_headcount: 1,
                base_salary: 4_000.0,
                annual_raise: 0.05,
                capacity_hours: 100.0,
                workload: WorkloadKind::Combined,
            }],
            workload,
            hardware_cost_per_employee: 200.0,
            hiring_cost_per_hire: 10_000.0,
        },
        overheads: vec![OverheadItem::new("Office Rental", 3_000.0, 0.05)],
        marketing: MarketingConfig::Fixed { monthly_amount: 1_000.0, annual_escalation: 0.0 },
        research: Default::default(),
        funding_rounds: Vec::new(),
        loan: LoanTerms::default(),
        tax: TaxPolicy::flat(0.27),
    }
}

fn project(assumptions: AssumptionSet) -> ProjectionResult {
    ProjectionEngine::new(assumptions, ProjectionConfig::default())
        .project()
        .expect("valid assumptions project")
}

#[test]
fn test_zero_growth_zero_churn_is_flat() {
    let result = project(steady_state());
    assert_eq!(result.periods.len(), 12);

    let first_income = result.periods[0].net_income;
    for row in &result.periods {
        assert_eq!(row.plans["Basic"].clients.ending, 10);
        assert_eq!(row.clients.new, 0);
        assert_eq!(row.clients.churned, 0);
        assert_eq!(row.headcount["Support"], 1);
        assert_eq!(row.net_income, first_income);
    }
}

#[test]
fn test_full_annual_churn_compounds() {
    let mut assumptions = steady_state();
    assumptions.horizon.periods = 2;
    assumptions.clients.annual_churn_rate = 1.0;
    let result = project(assumptions);

    // 1 - (1 - 1.0)^(1/12) is a full loss, not 1/12 of the base
    assert_eq!(result.periods[0].churn_rate, 1.0);
    assert_eq!(result.periods[0].clients.churned, 10);
    assert_eq!(result.periods[0].clients.ending, 0);
    assert_eq!(result.periods[1].clients.ending, 0);
}

#[test]
fn test_partial_annual_churn_uses_compounding() {
    let mut assumptions = steady_state();
    assumptions.clients.annual_churn_rate = 0.5;
    let result = project(assumptions);

    let expected = 1.0 - 0.5_f64.powf(1.0 / 12.0);
    assert_relative_eq!(result.periods[0].churn_rate, expected, epsilon = 1e-12);
    assert!(result.periods[0].churn_rate > 0.5 / 12.0);
}

#[test]
fn test_clients_never_negative_under_heavy_churn() {
    let mut assumptions = steady_state();
    assumptions.horizon.periods = 120;
    assumptions.clients.initial_clients = 50;
    assumptions.clients.annual_churn_rate = 0.9;
    assumptions.growth = GrowthCurve::flat(0.01);
    let result = project(assumptions);

    for row in &result.periods {
        let c = row.clients;
        assert!(c.churned <= c.starting + c.new);
        assert_eq!(c.ending, c.starting + c.new - c.churned);
    }
    assert!(result.periods[119].clients.ending < 50);
}

#[test]
fn test_gross_profit_reconciles() {
    let result = project(AssumptionSet::default_pricing());
    for row in &result.periods {
        let expected = row.total_revenue() - row.total_cos();
        assert_relative_eq!(row.gross_profit, expected, max_relative = 1e-6);

        let plan_revenue: f64 = row.plans.values().map(|p| p.revenue.total()).sum();
        assert_relative_eq!(plan_revenue, row.total_revenue(), max_relative = 1e-9);
    }
}

#[test]
fn test_equity_round_lands_in_trigger_period_only() {
    let mut assumptions = steady_state();
    assumptions.funding_rounds = vec![FundingRound::equity("Series A", 2, 10_000_000.0, 0.2)];
    let result = project(assumptions);

    let p1 = &result.periods[1];
    let p2 = &result.periods[2];
    let p3 = &result.periods[3];
    assert_eq!(p2.ending_cash, p1.ending_cash + p2.net_income + 10_000_000.0);
    for row in [p1, p3] {
        assert_eq!(row.funding_inflow, 0.0);
        assert_relative_eq!(row.ending_cash - row.beginning_cash, row.net_income, epsilon = 1e-6);
    }
}

#[test]
fn test_loan_balance_non_increasing_once_repaid() {
    let mut assumptions = steady_state();
    assumptions.horizon.periods = 36;
    assumptions.loan = LoanTerms {
        enabled: true,
        principal: 100_000.0,
        annual_interest_rate: 0.10,
        strategy: RepaymentStrategy::FixedAmount { amount: 5_000.0 },
        payback_start_period: 3,
        payback_end_period: None,
        payback_end_date: None,
    };
    let result = project(assumptions);

    // Interest only before repayment starts
    assert!(result.periods[2].loan_balance > 100_000.0);
    for pair in result.periods[3..].windows(2) {
        assert!(pair[1].loan_balance <= pair[0].loan_balance);
    }
    assert!(result.periods.iter().all(|r| r.loan_balance >= 0.0));
    assert_eq!(result.periods[35].loan_balance, 0.0);
}

#[test]
fn test_profit_share_repayment_skips_loss_periods() {
    let strategies = [
        RepaymentStrategy::ProfitPercentage { fraction: 0.3 },
        RepaymentStrategy::ProfitPercentagePlusLump { fraction: 0.3, lump_sum: 50_000.0 },
    ];
    for strategy in strategies {
        let mut assumptions = AssumptionSet::default_pricing();
        assumptions.loan = LoanTerms {
            enabled: true,
            principal: 250_000.0,
            annual_interest_rate: 0.11,
            strategy,
            ..Default::default()
        };
        let result = project(assumptions);

        assert!(result.periods[0].net_income < 0.0);
        for row in &result.periods {
            assert!(row.loan_repayment >= 0.0);
            if row.net_income <= 0.0 {
                assert_eq!(row.loan_repayment, 0.0, "{:?} paid in loss period {}", strategy, row.period_index);
            }
        }
    }
}

#[test]
fn test_scaling_headcount_never_shrinks() {
    let mut assumptions = AssumptionSet::default_pricing();
    // Strong early growth then decline
    assumptions.growth = GrowthCurve {
        phases: vec![GrowthPhase { start_period: 0, end_period: 11, start_rate: 0.3, end_rate: 0.3 }],
        plateau_rate: 0.0,
    };
    assumptions.clients.annual_churn_rate = 0.6;
    let result = project(assumptions);

    for role in ["Onboarding Specialist", "Technical Support"] {
        for pair in result.periods.windows(2) {
            assert!(pair[1].headcount[role] >= pair[0].headcount[role], "{} shrank", role);
        }
    }
}

#[test]
fn test_excess_workload_adds_whole_heads() {
    let mut assumptions = steady_state();
    assumptions.staffing.workload.insert("Basic".to_string(), PlanWorkload::new(30.0, 0.0));
    // 4 signups in period 1 only: 120 onboarding hours against 100 hours of capacity
    assumptions.growth = GrowthCurve {
        phases: vec![
            GrowthPhase { start_period: 0, end_period: 0, start_rate: 0.0, end_rate: 0.0 },
            GrowthPhase { start_period: 1, end_period: 1, start_rate: 0.4, end_rate: 0.4 },
        ],
        plateau_rate: 0.0,
    };
    let result = project(assumptions);

    assert_eq!(result.periods[0].headcount["Support"], 1);
    assert_eq!(result.periods[1].clients.new, 4);
    assert_eq!(result.periods[1].headcount["Support"], 2);
    assert_eq!(result.periods[1].hires, 1);
    assert_eq!(result.periods[1].hiring_cost, 10_000.0);
    for row in &result.periods[2..] {
        assert_eq!(row.headcount["Support"], 2);
        assert_eq!(row.hires, 0);
    }
}

#[test]
fn test_runs_are_bit_identical() {
    let first = project(AssumptionSet::default_pricing());
    let second = project(AssumptionSet::default_pricing());
    assert_eq!(first, second);

    let runner = ScenarioRunner::new();
    let parallel = runner.run_variants(&[ScenarioVariant::named("base"), ScenarioVariant::named("base")]);
    assert_eq!(parallel[0], parallel[1]);
    assert_eq!(parallel[0].as_ref().unwrap(), &first);
}

#[test]
fn test_horizon_limit_fails_before_projecting() {
    let mut assumptions = steady_state();
    assumptions.horizon.periods = 601;
    let result = ProjectionEngine::new(assumptions, ProjectionConfig::default()).project();
    assert_eq!(result, Err(ProjectionError::ResourceLimit { requested: 601, max: 600 }));

    let mut assumptions = steady_state();
    assumptions.horizon.periods = 24;
    let result = ProjectionEngine::new(assumptions, ProjectionConfig { max_periods: 12 }).project();
    assert!(matches!(result, Err(ProjectionError::ResourceLimit { .. })));
}

#[test]
fn test_longest_baseline_horizon_stays_bounded() {
    let mut assumptions = AssumptionSet::default_pricing();
    assumptions.horizon.periods = DEFAULT_MAX_PERIODS;
    let result = project(assumptions);

    assert_eq!(result.periods.len(), DEFAULT_MAX_PERIODS as usize);
    for row in &result.periods {
        let c = row.clients;
        assert_eq!(c.ending, c.starting + c.new - c.churned);
        assert!(row.plans.values().all(|p| p.clients.ending <= PLAN_CLIENT_CAP));
        assert!(row.ending_cash.is_finite());
        assert!(row.loan_balance >= 0.0);
    }

    // Compounding growth runs into the per-plan ceiling long before period 600
    let last = &result.periods[DEFAULT_MAX_PERIODS as usize - 1];
    assert!(last.plans.values().any(|p| p.clients.ending == PLAN_CLIENT_CAP));
    assert!(last.total_headcount() >= result.periods[0].total_headcount());
}

#[test]
fn test_invalid_assumptions_fail_fast() {
    let mut assumptions = steady_state();
    assumptions.staffing.scaling[0].capacity_hours = 0.0;
    let result = ProjectionEngine::new(assumptions, ProjectionConfig::default()).project();
    assert_eq!(
        result,
        Err(ProjectionError::Config(ConfigError::ZeroCapacity { role: "Support".into() }))
    );
}

#[test]
fn test_bundled_scenarios_project() {
    for file in ["data/base_case.json", "data/optimistic.json"] {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join(file);
        let assumptions = load_assumptions(&path).expect("bundled scenario loads");
        let periods = assumptions.horizon.periods as usize;
        let result = project(assumptions);

        assert_eq!(result.periods.len(), periods);
        assert_eq!(result.periods[0].label, "2025-01");
        for row in &result.periods {
            let expected = row.beginning_cash + row.net_income + row.funding_inflow - row.loan_repayment;
            assert_relative_eq!(row.ending_cash, expected, epsilon = 1e-6);
            assert!(row.loan_balance >= 0.0);
        }
    }
}
