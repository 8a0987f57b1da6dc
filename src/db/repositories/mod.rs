//! Row-store implementations.
//!
//! Only the in-memory backend ships with this crate; real database engines
//! are external collaborators wired in by the embedding application.

pub mod local;

pub use local::{LocalRepository, StoredRow};
