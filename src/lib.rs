//! Flight booking consolidation engine.
//!
//! Ingests flight booking rows from an analytical table snapshot, clusters
//! rows whose departure timestamps fall within a fixed proximity window of a
//! group anchor, and derives the insert/update operation plan that rewrites
//! the table into its grouped representation.
//!
//! The crate is organized in layers:
//!
//! - [`core`]: shared domain model (records, groups) and the source table
//!   schema; no logic and no I/O.
//! - [`parsing`]: the extractor boundary turning raw row frames into
//!   validated records, with per-row exclusion reporting.
//! - [`algorithms`]: the grouping engine and the operation-plan builder -
//!   pure, deterministic functions.
//! - [`processing`]: the single-pass consolidation pipeline and the plan
//!   consistency audit.
//! - [`db`]: the row-store abstraction (snapshot source, plan sink), the
//!   in-memory backend, and the service layer that orchestrates a full run.
//! - [`io`]: CSV loading/writing for table snapshots.
//! - [`config`]: TOML configuration surface.

pub mod algorithms;
pub mod config;
pub mod core;
pub mod db;
pub mod io;
pub mod parsing;
pub mod processing;
