//! Client population tracking per plan
//!
//! Counts are whole clients. Fractional new and churned clients are carried
//! per plan into the next period instead of being dropped, so long-run totals
//! match the continuous growth and churn rates.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Slack added before flooring so that e.g. 2.9999999999 counts as 3 clients
const WHOLE_CLIENT_EPSILON: f64 = 1e-9;

/// Ceiling on one plan's client count. New signups stop once a plan reaches it.
///
/// Kept below 2^53 so counts convert to `f64` exactly, and far enough below
/// `u64::MAX` that totals across plans cannot overflow.
pub const PLAN_CLIENT_CAP: u64 = 1_000_000_000_000_000;

/// Client movement of one plan over one period
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanMovement {
    pub starting: u64,
    pub new: u64,
    pub churned: u64,
    pub ending: u64,
}

/// Fractional client remainders carried between periods
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PopulationCarry {
    pub new: BTreeMap<String, f64>,
    pub churned: BTreeMap<String, f64>,
}

/// Split `raw + carry` into whole clients and the remainder to carry forward
fn take_whole(raw: f64, carry: &mut f64) -> u64 {
    let with_carry = raw + *carry;
    let whole = (with_carry + WHOLE_CLIENT_EPSILON).floor().max(0.0);
    *carry = (with_carry - whole).clamp(0.0, 1.0);
    whole as u64
}

/// Allocate the initial client base across plans by largest remainder.
///
/// Per-plan counts always sum to `total`. Plans absent from `mix` start empty.
pub fn allocate_initial<'a>(
    total: u64,
    mix: &BTreeMap<String, f64>,
    plans: impl Iterator<Item = &'a String>,
) -> BTreeMap<String, u64> {
    let mut counts: BTreeMap<String, u64> = plans.map(|id| (id.clone(), 0)).collect();
    let mut remainders: Vec<(String, f64)> = Vec::with_capacity(counts.len());
    let mut assigned = 0u64;

    for (id, count) in counts.iter_mut() {
        let quota = total as f64 * mix.get(id).copied().unwrap_or(0.0);
        let whole = quota.floor();
        *count = whole as u64;
        assigned = assigned.saturating_add(*count);
        remainders.push((id.clone(), quota - whole));
    }

    // Stable sort keeps plan-id order among equal remainders
    remainders.sort_by(|a, b| b.1.total_cmp(&a.1));
    let mut leftover = total.saturating_sub(assigned);
    for (id, _) in remainders.iter().cycle().take(remainders.len() * 2) {
        if leftover == 0 {
            break;
        }
        if mix.get(id).copied().unwrap_or(0.0) > 0.0 {
            if let Some(count) = counts.get_mut(id) {
                *count += 1;
                leftover -= 1;
            }
        }
    }

    counts
}

/// Advance every plan's client count by one period.
///
/// New clients are `total_starting × growth_rate`, split by the normalized
/// plan `mix`, and never lift a plan above [`PLAN_CLIENT_CAP`]. Churned clients
/// are `starting(plan) × churn_rate`, capped at what the plan started with, so
/// ending counts never drop below zero.
pub fn advance_population(
    prior: &BTreeMap<String, u64>,
    carry: &mut PopulationCarry,
    growth_rate: f64,
    churn_rate: f64,
    mix: &BTreeMap<String, f64>,
) -> BTreeMap<String, PlanMovement> {
    let total_starting = saturating_total(prior.values().copied());
    let total_new = total_starting as f64 * growth_rate;

    prior
        .iter()
        .map(|(id, &starting)| {
            let weight = mix.get(id).copied().unwrap_or(0.0);

            let churn_carry = carry.churned.entry(id.clone()).or_insert(0.0);
            let churned = take_whole(starting as f64 * churn_rate, churn_carry).min(starting);
            let retained = starting - churned;

            let new_carry = carry.new.entry(id.clone()).or_insert(0.0);
            let headroom = PLAN_CLIENT_CAP.saturating_sub(retained);
            let new = take_whole(total_new * weight, new_carry).min(headroom);

            let ending = retained + new;
            (id.clone(), PlanMovement { starting, new, churned, ending })
        })
        .collect()
}

/// Sum of client counts, pinned at `u64::MAX` instead of wrapping
pub fn saturating_total(counts: impl Iterator<Item = u64>) -> u64 {
    counts.fold(0, u64::saturating_add)
}

/// Sum of movements across plans
pub fn total_movement(movements: &BTreeMap<String, PlanMovement>) -> PlanMovement {
    movements.values().fold(PlanMovement::default(), |acc, m| PlanMovement {
        starting: acc.starting.saturating_add(m.starting),
        new: acc.new.saturating_add(m.new),
        churned: acc.churned.saturating_add(m.churned),
        ending: acc.ending.saturating_add(m.ending),
    })
}
