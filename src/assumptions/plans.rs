//! Plan catalog: per-plan pricing, cost of sales and usage quotas

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Pricing and cost definition for one subscription plan.
///
/// Prices and costs are monthly; quotas are units included per month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    /// Subscription price per client per month
    pub monthly_price: f64,

    /// One-off price charged to each new signup
    #[serde(default)]
    pub setup_price: f64,

    /// Cost of sales per client per month
    #[serde(default)]
    pub monthly_cost: f64,

    /// One-off cost of onboarding a new signup
    #[serde(default)]
    pub setup_cost: f64,

    /// Messages included in the subscription per month
    #[serde(default)]
    pub included_messages: f64,

    /// Voice minutes included in the subscription per month
    #[serde(default)]
    pub included_minutes: f64,

    /// Price billed per message beyond the included quota
    #[serde(default)]
    pub overage_message_price: f64,

    /// Price billed per minute beyond the included quota
    #[serde(default)]
    pub overage_minute_price: f64,

    /// Cost incurred per message beyond the included quota
    #[serde(default)]
    pub overage_message_cost: f64,

    /// Cost incurred per minute beyond the included quota
    #[serde(default)]
    pub overage_minute_cost: f64,
}

impl Plan {
    /// Plan with subscription and setup pricing only (no usage quota)
    pub fn new(monthly_price: f64, setup_price: f64, monthly_cost: f64, setup_cost: f64) -> Self {
        Self {
            monthly_price,
            setup_price,
            monthly_cost,
            setup_cost,
            included_messages: 0.0,
            included_minutes: 0.0,
            overage_message_price: 0.0,
            overage_minute_price: 0.0,
            overage_message_cost: 0.0,
            overage_minute_cost: 0.0,
        }
    }

    /// Attach an included quota and its overage rates
    pub fn with_quota(
        mut self,
        messages: f64,
        minutes: f64,
        price_per_unit: (f64, f64),
        cost_per_unit: (f64, f64),
    ) -> Self {
        self.included_messages = messages;
        self.included_minutes = minutes;
        self.overage_message_price = price_per_unit.0;
        self.overage_minute_price = price_per_unit.1;
        self.overage_message_cost = cost_per_unit.0;
        self.overage_minute_cost = cost_per_unit.1;
        self
    }

    /// Every numeric field with its name, for validation
    pub(crate) fn numeric_fields(&self) -> [(&'static str, f64); 10] {
        [
            ("monthly_price", self.monthly_price),
            ("setup_price", self.setup_price),
            ("monthly_cost", self.monthly_cost),
            ("setup_cost", self.setup_cost),
            ("included_messages", self.included_messages),
            ("included_minutes", self.included_minutes),
            ("overage_message_price", self.overage_message_price),
            ("overage_minute_price", self.overage_minute_price),
            ("overage_message_cost", self.overage_message_cost),
            ("overage_minute_cost", self.overage_minute_cost),
        ]
    }
}

/// Keyed mapping from plan identifier to plan definition.
///
/// Iteration order is the identifier's sort order, so every component walks
/// plans identically and results are reproducible.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlanCatalog {
    plans: BTreeMap<String, Plan>,
}

impl PlanCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: impl Into<String>, plan: Plan) -> Option<Plan> {
        self.plans.insert(id.into(), plan)
    }

    pub fn get(&self, id: &str) -> Option<&Plan> {
        self.plans.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Plan> {
        self.plans.get_mut(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.plans.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Plan)> {
        self.plans.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&String, &mut Plan)> {
        self.plans.iter_mut()
    }

    pub fn ids(&self) -> impl Iterator<Item = &String> {
        self.plans.keys()
    }

    pub fn len(&self) -> usize {
        self.plans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plans.is_empty()
    }
}

impl FromIterator<(String, Plan)> for PlanCatalog {
    fn from_iter<I: IntoIterator<Item = (String, Plan)>>(iter: I) -> Self {
        Self {
            plans: iter.into_iter().collect(),
        }
    }
}
