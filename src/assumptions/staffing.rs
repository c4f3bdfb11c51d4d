//! Staff rosters and per-plan workload assumptions

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Role with a constant headcount
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixedRole {
    pub role: String,
    pub headcount: u32,
    /// Monthly salary per head in year 0
    pub base_salary: f64,
    #[serde(default)]
    pub annual_raise: f64,
}

/// Which client workload a scaling role absorbs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkloadKind {
    /// Onboarding hours of new signups
    Onboarding,
    /// Recurring maintenance hours of the client base
    Maintenance,
    /// Both onboarding and maintenance hours
    #[default]
    Combined,
}

impl WorkloadKind {
    pub fn includes_onboarding(self) -> bool {
        matches!(self, WorkloadKind::Onboarding | WorkloadKind::Combined)
    }

    pub fn includes_maintenance(self) -> bool {
        matches!(self, WorkloadKind::Maintenance | WorkloadKind::Combined)
    }
}

/// Role whose headcount follows client workload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalingRole {
    pub role: String,
    /// Headcount floor; hiring above it is sticky
    #[serde(alias = "headcount", default)]
    pub min_headcount: u32,
    /// Monthly salary per head in year 0
    pub base_salary: f64,
    #[serde(default)]
    pub annual_raise: f64,
    /// Productive hours per employee per month
    pub capacity_hours: f64,
    #[serde(default)]
    pub workload: WorkloadKind,
}

/// Service hours one client of a plan consumes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlanWorkload {
    /// One-off hours per new signup
    #[serde(default)]
    pub onboarding_hours: f64,
    /// Recurring hours per client per month
    #[serde(default)]
    pub maintenance_hours: f64,
    /// Multiplier applied to onboarding hours once per completed year
    #[serde(default = "no_decay")]
    pub onboarding_decay: f64,
    /// Multiplier applied to maintenance hours once per completed year
    #[serde(default = "no_decay")]
    pub maintenance_decay: f64,
}

fn no_decay() -> f64 {
    1.0
}

impl PlanWorkload {
    pub fn new(onboarding_hours: f64, maintenance_hours: f64) -> Self {
        Self {
            onboarding_hours,
            maintenance_hours,
            onboarding_decay: 1.0,
            maintenance_decay: 1.0,
        }
    }

    pub fn with_decay(mut self, onboarding_decay: f64, maintenance_decay: f64) -> Self {
        self.onboarding_decay = onboarding_decay;
        self.maintenance_decay = maintenance_decay;
        self
    }

    /// Onboarding hours per new client after `years` completed years
    pub fn onboarding_hours_at(&self, years: u32) -> f64 {
        self.onboarding_hours * self.onboarding_decay.powi(years as i32)
    }

    /// Monthly maintenance hours per client after `years` completed years
    pub fn maintenance_hours_at(&self, years: u32) -> f64 {
        self.maintenance_hours * self.maintenance_decay.powi(years as i32)
    }
}

/// Staffing section of the assumption set
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StaffingAssumptions {
    #[serde(default)]
    pub fixed: Vec<FixedRole>,
    #[serde(default)]
    pub scaling: Vec<ScalingRole>,
    /// Workload per plan; plans without an entry generate no hours
    #[serde(default)]
    pub workload: BTreeMap<String, PlanWorkload>,
    /// Equipment cost per employee per month
    #[serde(default)]
    pub hardware_cost_per_employee: f64,
    /// One-off cost of each hire into a scaling role
    #[serde(default)]
    pub hiring_cost_per_hire: f64,
}

/// Salary per head per month after `years` completed years of annual raises
pub fn salary_after_raises(base_salary: f64, annual_raise: f64, years: u32) -> f64 {
    base_salary * (1.0 + annual_raise).powi(years as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_salary_compounds_per_year() {
        assert_eq!(salary_after_raises(3000.0, 0.05, 0), 3000.0);
        assert!((salary_after_raises(3000.0, 0.05, 2) - 3307.5).abs() < 1e-9);
    }

    #[test]
    fn test_workload_decay() {
        let w = PlanWorkload::new(12.0, 4.0).with_decay(0.5, 0.9);
        assert_eq!(w.onboarding_hours_at(0), 12.0);
        assert_eq!(w.onboarding_hours_at(2), 3.0);
        assert!((w.maintenance_hours_at(1) - 3.6).abs() < 1e-12);
    }

    #[test]
    fn test_scaling_role_accepts_headcount_alias() {
        let role: ScalingRole = serde_json::from_str(
            r#"{"role": "Onboarding Specialist", "headcount": 2, "base_salary": 3000, "capacity_hours": 160}"#,
        )
        .unwrap();
        assert_eq!(role.min_headcount, 2);
        assert_eq!(role.workload, WorkloadKind::Combined);
        assert_eq!(role.annual_raise, 0.0);
    }

    #[test]
    fn test_workload_defaults_to_no_decay() {
        let w: PlanWorkload = serde_json::from_str(r#"{"onboarding_hours": 10}"#).unwrap();
        assert_eq!(w.onboarding_decay, 1.0);
        assert_eq!(w.maintenance_decay, 1.0);
        assert_eq!(w.maintenance_hours, 0.0);
    }
}
