//! Error taxonomy for assumption validation, loading and projection runs

use thiserror::Error;

/// A structurally invalid assumption set. Raised before any period is computed.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("projection horizon must cover at least one period")]
    EmptyHorizon,

    #[error("plan catalog is empty")]
    EmptyPlanCatalog,

    #[error("{field} must be a finite, non-negative number (got {value})")]
    NegativeValue { field: String, value: f64 },

    #[error("{field} must lie in [0, 1] (got {value})")]
    FractionOutOfRange { field: String, value: f64 },

    #[error("plan '{plan}' referenced by {context} is not in the plan catalog")]
    UnknownPlan { plan: String, context: String },

    #[error("plan distribution weights must sum to more than zero")]
    EmptyDistribution,

    #[error("scaling role '{role}' has zero capacity")]
    ZeroCapacity { role: String },

    #[error("role '{role}' is defined more than once")]
    DuplicateRole { role: String },

    #[error("growth phase {index} ends (period {end}) before it starts (period {start})")]
    InvertedPhase { index: usize, start: u32, end: u32 },

    #[error("loan payback ends at period {end}, before it starts at period {start}")]
    InvertedPayback { start: u32, end: u32 },

    #[error("loan payback end date {date} falls before the projection start date {start}")]
    PaybackDateBeforeStart { date: String, start: String },
}

/// Failure of a projection run.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProjectionError {
    #[error("invalid assumptions: {0}")]
    Config(#[from] ConfigError),

    #[error("horizon of {requested} periods exceeds the configured maximum of {max}")]
    ResourceLimit { requested: u32, max: u32 },
}

/// Failure while reading assumptions from disk.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("plan catalog file defines no plans")]
    NoPlans,
}

/// Result of a projection run or any step that can reject it
pub type ProjectionOutcome<T> = Result<T, ProjectionError>;
