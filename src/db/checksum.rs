//! Snapshot fingerprinting.
//!
//! A plan is only valid against the exact table snapshot it was derived
//! from. The fingerprint ties the two together: the pipeline stamps it onto
//! the plan, and the store recomputes it under its write lock before
//! applying anything.

use polars::prelude::*;
use sha2::{Digest, Sha256};

/// Computes a SHA-256 fingerprint of a snapshot frame.
///
/// Column names and every cell (rendered to text) feed the digest with
/// separators, so reordered columns, renamed columns, and changed values all
/// produce distinct fingerprints.
pub fn snapshot_fingerprint(df: &DataFrame) -> String {
    let mut hasher = Sha256::new();

    for column in df.get_columns() {
        hasher.update(column.name().as_str().as_bytes());
        hasher.update([0u8]);
    }
    for i in 0..df.height() {
        for column in df.get_columns() {
            let cell = column.get(i).map(|v| v.to_string()).unwrap_or_default();
            hasher.update(cell.as_bytes());
            hasher.update([0x1f]);
        }
        hasher.update([0x0a]);
    }

    hex::encode(hasher.finalize())
}
