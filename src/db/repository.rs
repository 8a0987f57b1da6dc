//! Row-store trait for the flight booking table.
//!
//! The consolidation core treats storage as a row source and a row sink;
//! this trait is that boundary. Implementations must be `Send + Sync` so a
//! store can be shared across test harnesses, but the contract itself is
//! synchronous - one run is one sequential pass.

use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};

use crate::algorithms::plan::OperationPlan;
use crate::core::domain::RowId;

/// Result type for row-store operations.
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Error type for row-store operations.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("connection error: {0}")]
    ConnectionError(String),

    #[error("query error: {0}")]
    QueryError(String),

    #[error("row not found: {0}")]
    NotFound(RowId),

    #[error("plan was derived from a stale snapshot (plan {plan}, store {store})")]
    StaleSnapshot { plan: String, store: String },

    #[error("configuration error: {0}")]
    ConfigurationError(String),

    #[error("internal error: {0}")]
    InternalError(String),
}

impl From<String> for RepositoryError {
    fn from(s: String) -> Self {
        RepositoryError::InternalError(s)
    }
}

impl From<&str> for RepositoryError {
    fn from(s: &str) -> Self {
        RepositoryError::InternalError(s.to_string())
    }
}

/// Outcome of applying one operation plan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplyStats {
    pub rows_inserted: usize,
    pub rows_updated: usize,
}

/// Storage boundary for consolidation runs.
///
/// # Apply contract
/// `apply_plan` is all-or-nothing from the caller's perspective: inserts are
/// applied first (assigning row ids and resolving the plan's placeholder
/// link keys), then supersession updates, and any precondition failure -
/// a missing update target, an out-of-range link key, or a plan fingerprint
/// that no longer matches the store's live snapshot - must leave the store
/// untouched.
pub trait FlightRowStore: Send + Sync {
    /// Check that the backing store is reachable and usable.
    ///
    /// # Returns
    /// * `Ok(true)` if healthy
    /// * `Ok(false)` if unhealthy but no error occurred
    /// * `Err(RepositoryError)` if the check itself failed
    fn health_check(&self) -> RepositoryResult<bool>;

    /// Fetch one materialized snapshot of all live (non-superseded) rows.
    ///
    /// # Returns
    /// * `Ok(DataFrame)` - the full-scan snapshot, in table schema
    /// * `Err(RepositoryError)` - the fetch failed; nothing was read
    fn fetch_snapshot(&self) -> RepositoryResult<DataFrame>;

    /// Apply an operation plan transactionally: inserts, then updates.
    ///
    /// # Returns
    /// * `Ok(ApplyStats)` - counts of applied operations
    /// * `Err(RepositoryError)` - nothing was mutated
    fn apply_plan(&self, plan: &OperationPlan) -> RepositoryResult<ApplyStats>;
}
