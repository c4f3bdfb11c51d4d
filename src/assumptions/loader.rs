//! File-based assumption loader
//!
//! Assumption sets are JSON documents; the plan catalog can also be maintained
//! as a CSV table (one row per plan) and merged into an assumption set.

use super::{AssumptionSet, Plan, PlanCatalog};
use crate::error::LoadError;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Default assumption file, relative to the working directory
pub const DEFAULT_ASSUMPTIONS_PATH: &str = "data/base_case.json";

/// Raw CSV row of a plan catalog file
#[derive(Debug, serde::Deserialize)]
struct PlanRow {
    plan: String,
    monthly_price: f64,
    #[serde(default)]
    setup_price: f64,
    #[serde(default)]
    monthly_cost: f64,
    #[serde(default)]
    setup_cost: f64,
    #[serde(default)]
    included_messages: f64,
    #[serde(default)]
    included_minutes: f64,
    #[serde(default)]
    overage_message_price: f64,
    #[serde(default)]
    overage_minute_price: f64,
    #[serde(default)]
    overage_message_cost: f64,
    #[serde(default)]
    overage_minute_cost: f64,
}

impl PlanRow {
    fn into_plan(self) -> (String, Plan) {
        let plan = Plan::new(self.monthly_price, self.setup_price, self.monthly_cost, self.setup_cost)
            .with_quota(
                self.included_messages,
                self.included_minutes,
                (self.overage_message_price, self.overage_minute_price),
                (self.overage_message_cost, self.overage_minute_cost),
            );
        (self.plan, plan)
    }
}

/// Load an assumption set from a JSON file
pub fn load_assumptions<P: AsRef<Path>>(path: P) -> Result<AssumptionSet, LoadError> {
    let file = File::open(path)?;
    load_assumptions_from_reader(BufReader::new(file))
}

/// Load an assumption set from any JSON reader
pub fn load_assumptions_from_reader<R: Read>(reader: R) -> Result<AssumptionSet, LoadError> {
    Ok(serde_json::from_reader(reader)?)
}

/// Load a plan catalog from a CSV file
pub fn load_plan_catalog<P: AsRef<Path>>(path: P) -> Result<PlanCatalog, LoadError> {
    let file = File::open(path)?;
    load_plan_catalog_from_reader(file)
}

/// Load a plan catalog from any CSV reader (header row required)
pub fn load_plan_catalog_from_reader<R: Read>(reader: R) -> Result<PlanCatalog, LoadError> {
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut catalog = PlanCatalog::new();

    for result in csv_reader.deserialize() {
        let row: PlanRow = result?;
        let (id, plan) = row.into_plan();
        catalog.insert(id, plan);
    }

    if catalog.is_empty() {
        return Err(LoadError::NoPlans);
    }
    Ok(catalog)
}

/// Load the default assumption set from `data/base_case.json`
pub fn load_default() -> Result<AssumptionSet, LoadError> {
    load_assumptions(DEFAULT_ASSUMPTIONS_PATH)
}
