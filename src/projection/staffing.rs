//! Staffing scaler: workload hours to headcount and staff costs

use crate::assumptions::{salary_after_raises, StaffingAssumptions, WorkloadKind};
use super::population::PlanMovement;
use std::collections::BTreeMap;

/// Slack subtracted before rounding up so that 2.0000000001 FTEs is 2 heads
const HEADCOUNT_EPSILON: f64 = 1e-9;

/// Onboarding and maintenance hours generated by the client base in one period
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WorkloadHours {
    pub onboarding: f64,
    pub maintenance: f64,
}

impl WorkloadHours {
    /// Hours a role absorbs given the workload it covers
    pub fn for_kind(&self, kind: WorkloadKind) -> f64 {
        let mut hours = 0.0;
        if kind.includes_onboarding() {
            hours += self.onboarding;
        }
        if kind.includes_maintenance() {
            hours += self.maintenance;
        }
        hours
    }
}

/// Staffing decision and costs for one period
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StaffingOutcome {
    /// Headcount per role, fixed and scaling roles together
    pub headcount: BTreeMap<String, u32>,
    /// New hires into scaling roles this period
    pub hires: u32,
    pub fixed_cost: f64,
    pub scaling_cost: f64,
    pub hiring_cost: f64,
    pub hardware_cost: f64,
    pub hours: WorkloadHours,
}

impl StaffingOutcome {
    pub fn salary_cost(&self) -> f64 {
        self.fixed_cost + self.scaling_cost
    }

    pub fn total_headcount(&self) -> u64 {
        self.headcount.values().map(|&h| u64::from(h)).sum()
    }
}

/// Total workload hours of the period across plans.
///
/// Onboarding hours apply to new signups once; maintenance hours are monthly
/// and scale with the period length. Plans without a workload entry add nothing.
pub fn workload_hours(
    staffing: &StaffingAssumptions,
    movements: &BTreeMap<String, PlanMovement>,
    years: u32,
    months_per_period: u32,
) -> WorkloadHours {
    let months = months_per_period as f64;
    movements
        .iter()
        .filter_map(|(plan, movement)| staffing.workload.get(plan).map(|w| (w, movement)))
        .fold(WorkloadHours::default(), |acc, (workload, movement)| WorkloadHours {
            onboarding: acc.onboarding + movement.new as f64 * workload.onboarding_hours_at(years),
            maintenance: acc.maintenance
                + movement.ending as f64 * workload.maintenance_hours_at(years) * months,
        })
}

/// Heads needed to cover `hours` at `capacity_hours` per head per month.
///
/// Pinned at `u32::MAX` when the workload needs more heads than that.
pub fn required_headcount(hours: f64, capacity_hours: f64, months_per_period: u32) -> u32 {
    let capacity = capacity_hours * months_per_period as f64;
    if !(capacity > 0.0) || hours <= 0.0 {
        return 0;
    }
    (hours / capacity - HEADCOUNT_EPSILON).ceil().clamp(0.0, u32::MAX as f64) as u32
}

/// Size every role for the period and price the result.
///
/// Scaling headcount is `max(prior, minimum, required)`: hiring is sticky and
/// nobody is let go when workload falls.
pub fn scale_staff(
    staffing: &StaffingAssumptions,
    prior_headcount: &BTreeMap<String, u32>,
    movements: &BTreeMap<String, PlanMovement>,
    years: u32,
    months_per_period: u32,
) -> StaffingOutcome {
    let months = months_per_period as f64;
    let hours = workload_hours(staffing, movements, years, months_per_period);
    let mut outcome = StaffingOutcome { hours, ..Default::default() };

    for role in &staffing.fixed {
        let salary = salary_after_raises(role.base_salary, role.annual_raise, years);
        outcome.fixed_cost += salary * months * role.headcount as f64;
        outcome.headcount.insert(role.role.clone(), role.headcount);
    }

    for role in &staffing.scaling {
        // A role without history starts from its minimum roster, which is not a hire
        let prior = prior_headcount.get(&role.role).copied().unwrap_or(role.min_headcount);
        let required = required_headcount(hours.for_kind(role.workload), role.capacity_hours, months_per_period);
        let headcount = prior.max(role.min_headcount).max(required);
        outcome.hires = outcome.hires.saturating_add(headcount - prior);

        let salary = salary_after_raises(role.base_salary, role.annual_raise, years);
        outcome.scaling_cost += salary * months * headcount as f64;
        outcome.headcount.insert(role.role.clone(), headcount);
    }

    outcome.hiring_cost = outcome.hires as f64 * staffing.hiring_cost_per_hire;
    outcome.hardware_cost = outcome.total_headcount() as f64 * staffing.hardware_cost_per_employee * months;
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assumptions::{FixedRole, PlanWorkload, ScalingRole};

    fn staffing() -> StaffingAssumptions {
        let mut workload = BTreeMap::new();
        workload.insert("Basic".to_string(), PlanWorkload::new(10.0, 2.0));
        StaffingAssumptions {
            fixed: vec![FixedRole { role: "CEO".into(), headcount: 1, base_salary: 10_000.0, annual_raise: 0.1 }],
            scaling: vec![
                ScalingRole {
                    role: "Onboarding".into(),
                    min_headcount: 1,
                    base_salary: 3_000.0,
                    annual_raise: 0.0,
                    capacity_hours: 100.0,
                    workload: WorkloadKind::Onboarding,
                },
                ScalingRole {
                    role: "Support".into(),
                    min_headcount: 0,
                    base_salary: 3_500.0,
                    annual_raise: 0.0,
                    capacity_hours: 100.0,
                    workload: WorkloadKind::Maintenance,
                },
            ],
            workload,
            hardware_cost_per_employee: 100.0,
            hiring_cost_per_hire: 10_000.0,
        }
    }

    fn movement(new: u64, ending: u64) -> BTreeMap<String, PlanMovement> {
        let mut m = BTreeMap::new();
        m.insert("Basic".to_string(), PlanMovement { starting: ending - new, new, churned: 0, ending });
        m
    }

    #[test]
    fn test_required_headcount_rounds_up() {
        assert_eq!(required_headcount(0.0, 160.0, 1), 0);
        assert_eq!(required_headcount(160.0, 160.0, 1), 1);
        assert_eq!(required_headcount(161.0, 160.0, 1), 2);
        // A quarter gives each head three months of capacity
        assert_eq!(required_headcount(480.0, 160.0, 3), 1);
    }

    #[test]
    fn test_oversized_workload_saturates() {
        assert_eq!(required_headcount(1e30, 160.0, 1), u32::MAX);

        let mut s = staffing();
        s.fixed.clear();
        for role in &mut s.scaling {
            role.min_headcount = 0;
            role.workload = WorkloadKind::Combined;
        }
        let mut huge = BTreeMap::new();
        huge.insert("Basic".to_string(), PlanMovement { starting: 0, new: u64::MAX, churned: 0, ending: u64::MAX });

        let outcome = scale_staff(&s, &BTreeMap::new(), &huge, 0, 1);
        assert_eq!(outcome.headcount["Onboarding"], u32::MAX);
        assert_eq!(outcome.headcount["Support"], u32::MAX);
        assert_eq!(outcome.hires, u32::MAX);
        assert_eq!(outcome.total_headcount(), 2 * u64::from(u32::MAX));
    }

    #[test]
    fn test_workload_split_by_kind() {
        let hours = workload_hours(&staffing(), &movement(5, 20), 0, 1);
        assert_eq!(hours.onboarding, 50.0);
        assert_eq!(hours.maintenance, 40.0);
        assert_eq!(hours.for_kind(WorkloadKind::Combined), 90.0);
    }

    #[test]
    fn test_scaling_and_costs() {
        let s = staffing();
        // 25 signups × 10h = 250h onboarding -> 3 heads; 60 × 2h = 120h maintenance -> 2 heads
        let outcome = scale_staff(&s, &BTreeMap::new(), &movement(25, 60), 0, 1);

        assert_eq!(outcome.headcount["CEO"], 1);
        assert_eq!(outcome.headcount["Onboarding"], 3);
        assert_eq!(outcome.headcount["Support"], 2);
        // Minimum onboarding head is not a hire
        assert_eq!(outcome.hires, 4);
        assert_eq!(outcome.hiring_cost, 40_000.0);
        assert_eq!(outcome.fixed_cost, 10_000.0);
        assert_eq!(outcome.scaling_cost, 3.0 * 3_000.0 + 2.0 * 3_500.0);
        assert_eq!(outcome.hardware_cost, 600.0);
    }

    #[test]
    fn test_headcount_is_sticky() {
        let s = staffing();
        let first = scale_staff(&s, &BTreeMap::new(), &movement(25, 60), 0, 1);
        let quiet = scale_staff(&s, &first.headcount, &movement(0, 60), 0, 1);

        assert_eq!(quiet.headcount["Onboarding"], 3);
        assert_eq!(quiet.hires, 0);
        assert_eq!(quiet.hiring_cost, 0.0);
    }

    #[test]
    fn test_minimum_headcount_without_workload() {
        let s = staffing();
        let outcome = scale_staff(&s, &BTreeMap::new(), &BTreeMap::new(), 0, 1);
        assert_eq!(outcome.headcount["Onboarding"], 1);
        assert_eq!(outcome.headcount["Support"], 0);
        assert_eq!(outcome.hires, 0);
    }

    #[test]
    fn test_salary_raise_and_period_length() {
        let s = staffing();
        let year_two = scale_staff(&s, &BTreeMap::new(), &BTreeMap::new(), 1, 3);
        assert!((year_two.fixed_cost - 33_000.0).abs() < 1e-9);
        assert_eq!(year_two.scaling_cost, 9_000.0);
    }
}
