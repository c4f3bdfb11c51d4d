//! SaaS projection engine - multi-period financial projections for subscription businesses
//!
//! This library provides:
//! - Phased growth and churn curves driving a per-plan client population
//! - Subscription, setup and usage-overage revenue with matching cost of sales
//! - Capacity-driven staffing, overheads, marketing and R&D spend
//! - Funding rounds and a loan ledger with several repayment strategies
//! - SaaS metrics (MRR, ARR, CAC, LTV, payback) and parallel scenario runs

pub mod error;
pub mod assumptions;
pub mod projection;
pub mod scenario;

// Re-export commonly used types
pub use assumptions::{AssumptionSet, Frequency, Horizon, Plan, PlanCatalog};
pub use error::{ConfigError, LoadError, ProjectionError, ProjectionOutcome};
pub use projection::{
    PeriodResult, ProjectionConfig, ProjectionEngine, ProjectionResult, SaasMetrics,
};
pub use scenario::{ScenarioRunner, ScenarioVariant};
