//! Phased growth curve and churn de-annualization
//!
//! New-client growth follows a sequence of phases, each interpolating linearly
//! from a start rate to an end rate, followed by a plateau. Churn is supplied
//! as an annual rate and compounded down to the working period length.

use serde::{Deserialize, Serialize};

/// One linear segment of the growth curve, over inclusive 0-based period indices
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GrowthPhase {
    pub start_period: u32,
    pub end_period: u32,
    pub start_rate: f64,
    pub end_rate: f64,
}

impl GrowthPhase {
    pub fn contains(&self, period_index: u32) -> bool {
        period_index >= self.start_period && period_index <= self.end_period
    }

    /// Linear interpolation by position within the phase
    pub fn interpolate(&self, period_index: u32) -> f64 {
        let span = self.end_period.saturating_sub(self.start_period);
        let fraction = if span == 0 {
            0.0
        } else {
            let pos = period_index.saturating_sub(self.start_period) as f64 / span as f64;
            pos.clamp(0.0, 1.0)
        };
        self.start_rate + fraction * (self.end_rate - self.start_rate)
    }
}

/// Per-period growth rate generator
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GrowthCurve {
    #[serde(default)]
    pub phases: Vec<GrowthPhase>,

    /// Growth rate after the last phase ends
    #[serde(default)]
    pub plateau_rate: f64,
}

impl GrowthCurve {
    /// Constant growth for every period
    pub fn flat(rate: f64) -> Self {
        Self {
            phases: Vec::new(),
            plateau_rate: rate,
        }
    }

    /// Phases in ascending start order; ties keep their configured order
    pub fn sorted_phases(&self) -> Vec<GrowthPhase> {
        let mut phases = self.phases.clone();
        phases.sort_by_key(|p| p.start_period);
        phases
    }

    /// Growth rate for a 0-based period index
    pub fn rate_for_period(&self, period_index: u32) -> f64 {
        rate_for_period(period_index, &self.sorted_phases(), self.plateau_rate)
    }

    /// Pairs of consecutive phases that leave uncovered periods between them
    pub fn gaps(&self) -> Vec<(u32, u32)> {
        self.sorted_phases()
            .windows(2)
            .filter(|w| w[1].start_period > w[0].end_period + 1)
            .map(|w| (w[0].end_period + 1, w[1].start_period - 1))
            .collect()
    }

    /// Whether any two phases cover a common period
    pub fn has_overlap(&self) -> bool {
        self.sorted_phases()
            .windows(2)
            .any(|w| w[1].start_period <= w[0].end_period)
    }
}

/// Growth rate for `period_index` given phases sorted by start period.
///
/// - before the first phase: the first phase's start rate
/// - inside a phase: linear interpolation (first containing phase wins on overlap)
/// - in a gap between phases: the previous phase's end rate
/// - after the last phase: the plateau rate
pub fn rate_for_period(period_index: u32, phases: &[GrowthPhase], plateau_rate: f64) -> f64 {
    let Some(first) = phases.first() else {
        return plateau_rate;
    };
    if period_index < first.start_period {
        return first.start_rate;
    }

    let mut previous: Option<&GrowthPhase> = None;
    for phase in phases {
        if phase.contains(period_index) {
            return phase.interpolate(period_index);
        }
        if period_index < phase.start_period {
            // Gap: hold the end rate of the last phase already passed
            return previous.map(|p| p.end_rate).unwrap_or(phase.start_rate);
        }
        previous = Some(phase);
    }

    plateau_rate
}

/// Convert an annual rate to an equivalent per-period rate by compounding:
/// `1 - (1 - annual)^(1 / periods_per_year)`
pub fn de_annualize(annual_rate: f64, periods_per_year: u32) -> f64 {
    if periods_per_year <= 1 {
        return annual_rate;
    }
    let survival = (1.0 - annual_rate).max(0.0);
    1.0 - survival.powf(1.0 / periods_per_year as f64)
}
