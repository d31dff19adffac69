//! Domain error types.
//!
//! User-facing failures of the calculator, the seasonal data store and the
//! history log. The binary wraps these in `anyhow` with file context.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("no seasonal data for '{service}' in month {month}")]
    DataNotFound { service: String, month: u32 },

    #[error("promotional pricing is infeasible: {reason} (profit per service {profit_per_unit:.2})")]
    InfeasiblePricing {
        profit_per_unit: f64,
        reason: &'static str,
    },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid seasonal dataset at line {line}: {reason}")]
    InvalidDataset { line: u64, reason: String },

    #[error("unknown service: {0}")]
    UnknownService(String),

    #[error("'{query}' matches several services: {}", .candidates.join(", "))]
    AmbiguousService { query: String, candidates: Vec<String> },

    #[error("history entry {0} not found")]
    NotFound(u64),

    #[error("history store {path} is corrupt: {reason}")]
    StorageCorrupt { path: String, reason: String },

    #[error("failed to encode history: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Result type alias for dashboard operations.
pub type DashboardResult<T> = Result<T, DashboardError>;
