//! State carried from one projection period to the next

use crate::assumptions::AssumptionSet;
use super::ledger::LoanPosition;
use super::population::{allocate_initial, saturating_total, PopulationCarry};
use std::collections::BTreeMap;

/// Everything the next period needs from the previous one
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodState {
    /// Index of the next period to compute (0-based)
    pub period_index: u32,

    /// Whole clients per plan at the start of the period
    pub clients: BTreeMap<String, u64>,

    /// Fractional new and churned clients not yet realised
    pub carry: PopulationCarry,

    /// Headcount per scaling role; empty until the first period is staffed
    pub headcount: BTreeMap<String, u32>,

    pub cash: f64,

    pub loan: LoanPosition,

    /// Losses available to offset future taxable profit
    pub tax_loss_pool: f64,
}

impl PeriodState {
    /// State before period 0, built from a validated assumption set
    pub fn initial(assumptions: &AssumptionSet, mix: &BTreeMap<String, f64>) -> Self {
        Self {
            period_index: 0,
            clients: allocate_initial(assumptions.clients.initial_clients, mix, assumptions.plans.ids()),
            carry: PopulationCarry::default(),
            headcount: BTreeMap::new(),
            cash: assumptions.starting_cash,
            loan: LoanPosition::opening(&assumptions.loan),
            tax_loss_pool: 0.0,
        }
    }

    pub fn total_clients(&self) -> u64 {
        saturating_total(self.clients.values().copied())
    }
}
