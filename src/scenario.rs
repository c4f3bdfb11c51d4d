//! Scenario runner for batch projections
//!
//! Holds one base assumption set and runs it, or variants of it, as independent
//! projections. Scenarios share no state and run in parallel with rayon; results
//! come back in input order.

use crate::assumptions::{AssumptionSet, GrowthCurve};
use crate::error::ProjectionOutcome;
use crate::projection::{ProjectionConfig, ProjectionEngine, ProjectionResult};
use log::debug;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Sensitivity applied on top of the base assumption set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioVariant {
    pub name: String,
    /// Multiplies every growth phase rate and the plateau rate
    #[serde(default = "unit")]
    pub growth_multiplier: f64,
    /// Replaces the base annual churn rate
    #[serde(default)]
    pub annual_churn_rate: Option<f64>,
    /// Multiplies every plan's subscription and setup price
    #[serde(default = "unit")]
    pub price_multiplier: f64,
}

fn unit() -> f64 {
    1.0
}

impl ScenarioVariant {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            growth_multiplier: 1.0,
            annual_churn_rate: None,
            price_multiplier: 1.0,
        }
    }

    pub fn with_growth(mut self, multiplier: f64) -> Self {
        self.growth_multiplier = multiplier;
        self
    }

    pub fn with_churn(mut self, annual_churn_rate: f64) -> Self {
        self.annual_churn_rate = Some(annual_churn_rate);
        self
    }

    pub fn with_price(mut self, multiplier: f64) -> Self {
        self.price_multiplier = multiplier;
        self
    }

    /// Copy of `base` with this variant's adjustments
    pub fn apply(&self, base: &AssumptionSet) -> AssumptionSet {
        let mut assumptions = base.clone();
        assumptions.name = self.name.clone();
        assumptions.growth = scale_growth(&base.growth, self.growth_multiplier);
        if let Some(churn) = self.annual_churn_rate {
            assumptions.clients.annual_churn_rate = churn;
        }
        for (_, plan) in assumptions.plans.iter_mut() {
            plan.monthly_price *= self.price_multiplier;
            plan.setup_price *= self.price_multiplier;
        }
        assumptions
    }
}

fn scale_growth(curve: &GrowthCurve, multiplier: f64) -> GrowthCurve {
    let mut scaled = curve.clone();
    for phase in &mut scaled.phases {
        phase.start_rate *= multiplier;
        phase.end_rate *= multiplier;
    }
    scaled.plateau_rate *= multiplier;
    scaled
}

/// Pre-loaded scenario runner
#[derive(Debug, Clone)]
pub struct ScenarioRunner {
    base_assumptions: AssumptionSet,
    config: ProjectionConfig,
}

impl ScenarioRunner {
    /// Runner over the in-code baseline assumptions
    pub fn new() -> Self {
        Self::with_assumptions(AssumptionSet::default_pricing())
    }

    pub fn with_assumptions(assumptions: AssumptionSet) -> Self {
        Self {
            base_assumptions: assumptions,
            config: ProjectionConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ProjectionConfig) -> Self {
        self.config = config;
        self
    }

    /// Project the base assumption set
    pub fn run(&self) -> ProjectionOutcome<ProjectionResult> {
        ProjectionEngine::new(self.base_assumptions.clone(), self.config).project()
    }

    /// Project every variant of the base set in parallel
    pub fn run_variants(&self, variants: &[ScenarioVariant]) -> Vec<ProjectionOutcome<ProjectionResult>> {
        debug!("dispatching {} scenario variants", variants.len());
        variants
            .par_iter()
            .map(|variant| ProjectionEngine::new(variant.apply(&self.base_assumptions), self.config).project())
            .collect()
    }

    /// Project independent assumption sets in parallel
    pub fn run_all(
        assumption_sets: &[AssumptionSet],
        config: ProjectionConfig,
    ) -> Vec<ProjectionOutcome<ProjectionResult>> {
        debug!("dispatching {} assumption sets", assumption_sets.len());
        assumption_sets
            .par_iter()
            .map(|assumptions| ProjectionEngine::new(assumptions.clone(), config).project())
            .collect()
    }

    pub fn assumptions(&self) -> &AssumptionSet {
        &self.base_assumptions
    }

    pub fn assumptions_mut(&mut self) -> &mut AssumptionSet {
        &mut self.base_assumptions
    }
}

impl Default for ScenarioRunner {
    fn default() -> Self {
        Self::new()
    }
}
