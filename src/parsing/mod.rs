//! The extractor boundary: raw table rows → canonical flight records.
//!
//! Everything downstream of this module operates on validated, strongly
//! typed [`crate::core::domain`] values. Raw row shapes (column frames, the
//! source system's `NULL` sentinels, slot columns) never leak past here.
//!
//! Extraction is skip-and-report: a malformed row is excluded and recorded,
//! never silently dropped, and never aborts the pass.

pub mod row_extractor;

#[cfg(test)]
mod row_extractor_tests;

pub use row_extractor::{
    extract_records, ExtractionError, ExtractionErrorKind, ExtractionOutcome,
};
