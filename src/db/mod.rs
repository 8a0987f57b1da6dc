//! Row-store abstraction for the flight booking table.
//!
//! Storage is an external collaborator of the consolidation core: a source
//! of one materialized snapshot per run and a sink for one operation plan.
//! This module follows a layered architecture:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │  Application layer (CLI, callers)                    │
//! └───────────────────┬──────────────────────────────────┘
//!                     │
//! ┌───────────────────▼──────────────────────────────────┐
//! │  Service layer (services.rs)                         │
//! │  - fetch → pipeline → apply orchestration            │
//! │  - run logging                                       │
//! └───────────────────┬──────────────────────────────────┘
//!                     │
//! ┌───────────────────▼──────────────────────────────────┐
//! │  FlightRowStore trait (repository.rs)                │
//! └───────────────────┬──────────────────────────────────┘
//!                     │
//! ┌───────────────────▼──────────────────────────────────┐
//! │  Local repository (in-memory)                        │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! The apply step is all-or-nothing: every target is checked before the
//! first mutation, and a plan derived from a different snapshot than the
//! store's current one is rejected outright (single-writer discipline).

pub mod checksum;
pub mod repositories;
pub mod repository;
pub mod services;

pub use checksum::snapshot_fingerprint;
pub use repositories::LocalRepository;
pub use repository::{ApplyStats, FlightRowStore, RepositoryError, RepositoryResult};
pub use services::{consolidate_table, RunSummary};
