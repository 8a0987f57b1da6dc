//! Table snapshot I/O.
//!
//! CSV is the interchange format for table snapshots taken outside a live
//! store (exports, test fixtures, CLI input). Loading coerces columns to the
//! schema types the extractor expects.

pub mod loaders;


pub use loaders::{load_table_csv, write_table_csv};
