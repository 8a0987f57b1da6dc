//! Domain models for flight records and time-proximity groups.
//!
//! These are the canonical types every layer downstream of the extractor
//! operates on. Raw row shapes never leave the `parsing` boundary.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a persisted row in the source table.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct RowId(pub i64);

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One flight leg: a flight number and its departure timestamp.
///
/// Departure timestamps are timezone-normalized to UTC at the extractor
/// boundary; downstream code never sees raw date strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlightLeg {
    pub flight_number: String,
    pub departure: DateTime<Utc>,
}

impl FlightLeg {
    pub fn new(flight_number: impl Into<String>, departure: DateTime<Utc>) -> Self {
        Self {
            flight_number: flight_number.into(),
            departure,
        }
    }
}

/// Booking details carried through consolidation unmodified.
///
/// These are the non-slot columns of a source row. The consolidated row for
/// a group inherits the anchor member's details.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingDetails {
    pub pax_name: String,
    pub booking_ref: String,
    pub e_ticket_no: Option<String>,
    pub client_code: Option<String>,
    pub airline: Option<String>,
    pub journey_type: Option<String>,
    /// Airport codes, positionally aligned with the `Airport1..8` columns.
    pub airports: Vec<Option<String>>,
}

/// A canonical flight record: one live row of the source table.
///
/// A freshly ingested row carries exactly one leg; a row produced by an
/// earlier consolidation run carries one leg per occupied flight slot.
/// Invariant: `legs` is non-empty and sorted by ascending departure - both
/// are enforced by [`FlightRecord::new`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlightRecord {
    pub source_row_id: RowId,
    pub legs: Vec<FlightLeg>,
    pub booking: BookingDetails,
}

impl FlightRecord {
    /// Builds a record, sorting its legs by ascending departure.
    ///
    /// Callers must supply at least one leg; the extractor rejects slotless
    /// rows before this point.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::{TimeZone, Utc};
    /// use flight_consolidator::core::domain::{BookingDetails, FlightLeg, FlightRecord, RowId};
    ///
    /// let record = FlightRecord::new(
    ///     RowId(1),
    ///     vec![
    ///         FlightLeg::new("LH200", Utc.with_ymd_and_hms(2024, 3, 2, 9, 0, 0).unwrap()),
    ///         FlightLeg::new("LH100", Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap()),
    ///     ],
    ///     BookingDetails::default(),
    /// );
    ///
    /// assert_eq!(record.flight_number(), "LH100");
    /// assert_eq!(record.occupied_slots(), 2);
    /// ```
    pub fn new(source_row_id: RowId, mut legs: Vec<FlightLeg>, booking: BookingDetails) -> Self {
        debug_assert!(!legs.is_empty(), "a flight record needs at least one leg");
        legs.sort_by(|a, b| a.departure.cmp(&b.departure));
        Self {
            source_row_id,
            legs,
            booking,
        }
    }

    /// Departure timestamp of the record: its earliest leg.
    pub fn departure(&self) -> DateTime<Utc> {
        self.legs[0].departure
    }

    /// Flight identifier of the record: its earliest leg's number.
    pub fn flight_number(&self) -> &str {
        &self.legs[0].flight_number
    }

    /// Number of flight slots this record occupies in the table.
    pub fn occupied_slots(&self) -> usize {
        self.legs.len()
    }
}

/// A time-proximity group of flight records.
///
/// Members are kept in ascending departure order (ties by row id, as sorted
/// by the grouping engine). The first member is the group's **anchor**: the
/// fixed origin against which the proximity window is measured.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlightGroup {
    records: Vec<FlightRecord>,
}

impl FlightGroup {
    /// Opens a new group with its anchor record.
    pub(crate) fn new(anchor: FlightRecord) -> Self {
        Self {
            records: vec![anchor],
        }
    }

    /// Appends a record. The grouping engine only calls this with records
    /// sorted after the current members.
    pub(crate) fn push(&mut self, record: FlightRecord) {
        self.records.push(record);
    }

    /// Members in ascending departure order.
    pub fn records(&self) -> &[FlightRecord] {
        &self.records
    }

    /// Number of member records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Groups are never empty, but the conventional probe is provided.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// A singleton group produces no operations: the original row stands.
    pub fn is_singleton(&self) -> bool {
        self.records.len() == 1
    }

    /// The anchor record (first member added).
    pub fn anchor(&self) -> &FlightRecord {
        &self.records[0]
    }

    /// Total flight slots occupied by all members.
    pub fn total_slots(&self) -> usize {
        self.records.iter().map(FlightRecord::occupied_slots).sum()
    }

    /// Time span from the anchor's departure to the latest member's.
    pub fn span(&self) -> Duration {
        let last = self
            .records
            .iter()
            .map(FlightRecord::departure)
            .max()
            .unwrap_or_else(|| self.anchor().departure());
        last - self.anchor().departure()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, day, hour, 0, 0).unwrap()
    }

    fn record(row_id: i64, day: u32, hour: u32) -> FlightRecord {
        FlightRecord::new(
            RowId(row_id),
            vec![FlightLeg::new(format!("BA{}", row_id), ts(day, hour))],
            BookingDetails::default(),
        )
    }

    #[test]
    fn test_record_sorts_legs_ascending() {
        let record = FlightRecord::new(
            RowId(1),
            vec![
                FlightLeg::new("LH200", ts(2, 9)),
                FlightLeg::new("LH100", ts(1, 8)),
            ],
            BookingDetails::default(),
        );

        assert_eq!(record.flight_number(), "LH100");
        assert_eq!(record.departure(), ts(1, 8));
        assert_eq!(record.occupied_slots(), 2);
    }

    #[test]
    fn test_group_derived_values() {
        let mut group = FlightGroup::new(record(1, 1, 8));
        group.push(record(2, 1, 14));
        group.push(record(3, 1, 20));

        assert_eq!(group.len(), 3);
        assert!(!group.is_singleton());
        assert_eq!(group.anchor().source_row_id, RowId(1));
        assert_eq!(group.total_slots(), 3);
        assert_eq!(group.span(), Duration::hours(12));
    }

    #[test]
    fn test_singleton_group_has_zero_span() {
        let group = FlightGroup::new(record(7, 3, 9));
        assert!(group.is_singleton());
        assert_eq!(group.span(), Duration::zero());
    }

    #[test]
    fn test_group_slot_total_counts_multi_leg_members() {
        let consolidated = FlightRecord::new(
            RowId(10),
            vec![
                FlightLeg::new("AF1", ts(1, 6)),
                FlightLeg::new("AF2", ts(1, 9)),
                FlightLeg::new("AF3", ts(1, 12)),
            ],
            BookingDetails::default(),
        );
        let mut group = FlightGroup::new(consolidated);
        group.push(record(11, 1, 15));

        assert_eq!(group.len(), 2);
        assert_eq!(group.total_slots(), 4);
    }
}
