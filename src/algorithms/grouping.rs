//! Time-proximity grouping of flight records.
//!
//! Records are sorted by departure and folded into disjoint groups. A group
//! admits a record while the record's departure lies within the proximity
//! window measured from the group's **anchor** (its first member) and the
//! group still has slot capacity left. The window is never re-measured from
//! later members - a chain of close-but-creeping timestamps cannot drift a
//! group beyond one window from its anchor.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::core::domain::{FlightGroup, FlightRecord};

/// Caller configuration error, rejected before any record is processed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("grouping window must be positive, got {0} hours")]
    NonPositiveWindow(i64),

    #[error("group capacity must be positive")]
    ZeroCapacity,

    #[error("configuration file error: {0}")]
    File(String),

    #[error("unknown repository type: {0}")]
    UnknownRepositoryType(String),
}

/// Parameters of one grouping pass.
///
/// Threaded explicitly into the engine - there is no process-wide grouping
/// state, so differently configured passes can run side by side in tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupingParams {
    /// Maximum span, in hours, from a group's anchor departure within which
    /// further records may join.
    pub window_hours: i64,
    /// Maximum number of flight slots a group may occupy; this bounds the
    /// consolidated row to the table's physical slot columns.
    pub max_entries: usize,
}

impl GroupingParams {
    /// Builds validated parameters.
    ///
    /// # Returns
    /// * `Ok(GroupingParams)` if both values are positive
    /// * `Err(ConfigurationError)` otherwise - fail fast, no partial run
    ///
    /// # Examples
    ///
    /// ```
    /// use flight_consolidator::algorithms::grouping::GroupingParams;
    ///
    /// let params = GroupingParams::new(24, 7).unwrap();
    /// assert_eq!(params.window_hours, 24);
    ///
    /// assert!(GroupingParams::new(0, 7).is_err());
    /// assert!(GroupingParams::new(24, 0).is_err());
    /// ```
    pub fn new(window_hours: i64, max_entries: usize) -> Result<Self, ConfigurationError> {
        let params = Self {
            window_hours,
            max_entries,
        };
        params.validate()?;
        Ok(params)
    }

    /// Checks the fail-fast invariants: window and capacity must be positive.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.window_hours <= 0 {
            return Err(ConfigurationError::NonPositiveWindow(self.window_hours));
        }
        if self.max_entries == 0 {
            return Err(ConfigurationError::ZeroCapacity);
        }
        Ok(())
    }

    /// The proximity window as a duration.
    pub fn window(&self) -> Duration {
        Duration::hours(self.window_hours)
    }
}

impl Default for GroupingParams {
    /// Source system defaults: a 24-hour window and 7 flight slots per row.
    fn default() -> Self {
        Self {
            window_hours: 24,
            max_entries: 7,
        }
    }
}

/// Partitions records into time-proximity groups.
///
/// The algorithm is deterministic: records are sorted by ascending departure
/// with ties broken by ascending row id, then folded in a single pass. Given
/// the same input multiset and parameters the output grouping is identical
/// regardless of the original row order.
///
/// A record joins the current group only if
/// * its departure is within `params.window()` of the **anchor** departure
///   (the first member's - fixed origin, not the last-added member's), and
/// * the group's occupied-slot total plus the record's own slots stays
///   within `params.max_entries`.
///
/// The capacity cap takes precedence over time proximity: a full group
/// closes even when the next record would satisfy the window test. A record
/// that fits neither constraint opens a new group; an isolated record forms
/// a singleton group, for which no operations are ever emitted.
///
/// # Returns
/// * `Ok(Vec<FlightGroup>)` - disjoint groups covering every input record
/// * `Err(ConfigurationError)` - invalid parameters; nothing was processed
pub fn group_records(
    records: Vec<FlightRecord>,
    params: &GroupingParams,
) -> Result<Vec<FlightGroup>, ConfigurationError> {
    params.validate()?;

    let mut records = records;
    records.sort_by(|a, b| {
        a.departure()
            .cmp(&b.departure())
            .then(a.source_row_id.cmp(&b.source_row_id))
    });

    let window = params.window();
    let mut groups: Vec<FlightGroup> = Vec::new();
    let mut current: Option<FlightGroup> = None;

    for record in records {
        current = Some(match current.take() {
            None => FlightGroup::new(record),
            Some(mut group) => {
                let within_window = record.departure() - group.anchor().departure() <= window;
                let within_capacity =
                    group.total_slots() + record.occupied_slots() <= params.max_entries;
                if within_window && within_capacity {
                    group.push(record);
                    group
                } else {
                    groups.push(group);
                    FlightGroup::new(record)
                }
            }
        });
    }

    if let Some(group) = current {
        groups.push(group);
    }

    Ok(groups)
}
