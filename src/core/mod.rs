//! Core domain models for flight booking consolidation.
//!
//! This module defines the fundamental data structures shared by every other
//! layer: canonical flight records, time-proximity groups, and the source
//! table schema. It contains no logic beyond derived accessors and performs
//! no I/O.

pub mod domain;
pub mod schema;
