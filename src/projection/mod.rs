//! Projection engine and the per-period component calculators

pub mod population;
pub mod revenue;
pub mod staffing;
pub mod overheads;
pub mod ledger;
mod state;
mod engine;
mod cashflows;
pub mod metrics;
pub mod irr;
pub mod reseller;

pub use state::PeriodState;
pub use engine::{ProjectionEngine, ProjectionConfig, DEFAULT_MAX_PERIODS};
pub use cashflows::{PeriodResult, PlanPeriod, ProjectionResult, ProjectionSummary};
pub use metrics::{PeriodMetrics, SaasMetrics};
pub use reseller::{ResellerDeal, ResellerSnapshot};
