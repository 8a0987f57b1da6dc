//! Grouping and plan-building algorithms.
//!
//! This module holds the deterministic core of the consolidation system:
//!
//! - [`grouping`]: partition flight records into time-proximity groups under
//!   a fixed-origin window and a per-row capacity cap.
//! - [`plan`]: derive the insert/update operation plan that persists a
//!   grouping.
//!
//! Both are pure functions over the domain model with no I/O and no shared
//! state.

pub mod grouping;
pub mod plan;

pub use grouping::{group_records, ConfigurationError, GroupingParams};
pub use plan::{build_plan, InsertOp, LinkKey, OperationPlan, UpdateOp};
