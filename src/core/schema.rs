//! Source table schema for the flight booking table.
//!
//! Column names, slot layout, and sentinel values are fixed by the source
//! system. All other modules reference them from here rather than hardcoding
//! strings.

/// Persisted row identifier column.
pub const COL_ROW_ID: &str = "RowId";

/// Passenger name column.
pub const COL_PAX_NAME: &str = "PaxName";

/// Booking reference column.
pub const COL_BOOKING_REF: &str = "BookingRef";

/// Ticket number column. Doubles as the row-state marker: consolidated rows
/// carry [`INSERTED_TICKET_MARKER`], superseded originals are rewritten to
/// [`UPDATED_TICKET_MARKER`].
pub const COL_E_TICKET_NO: &str = "ETicketNo";

/// Client code column.
pub const COL_CLIENT_CODE: &str = "ClientCode";

/// Operating airline column.
pub const COL_AIRLINE: &str = "Airline";

/// Journey type column.
pub const COL_JOURNEY_TYPE: &str = "JourneyType";

/// Supersession link column: the `RowId` of the consolidated row that
/// absorbed this one. Empty for live rows.
pub const COL_CONSOLIDATED_INTO: &str = "ConsolidatedInto";

/// Prefix of the flight number slot columns (`FlightNumber1`..`FlightNumber7`).
pub const FLIGHT_NUMBER_PREFIX: &str = "FlightNumber";

/// Prefix of the departure date slot columns
/// (`DepartureDateLocal1`..`DepartureDateLocal7`).
pub const DEPARTURE_DATE_PREFIX: &str = "DepartureDateLocal";

/// Prefix of the airport columns (`Airport1`..`Airport8`).
pub const AIRPORT_PREFIX: &str = "Airport";

/// Number of flight slots a persisted row can hold.
pub const MAX_FLIGHT_SLOTS: usize = 7;

/// Number of airport columns a persisted row carries.
pub const AIRPORT_SLOTS: usize = 8;

/// Literal string the source system stores for absent values.
pub const NULL_SENTINEL: &str = "NULL";

/// Flight numbers with this suffix are placeholder entries created by the
/// upstream booking system; their slot is discarded during extraction.
pub const PLACEHOLDER_FLIGHT_SUFFIX: &str = "000";

/// `ETicketNo` marker written on freshly inserted consolidated rows.
pub const INSERTED_TICKET_MARKER: &str = "INSERTED";

/// `ETicketNo` marker written on original rows absorbed into a group.
pub const UPDATED_TICKET_MARKER: &str = "UPDATED";

/// Wall-clock format used when rendering departure timestamps back into the
/// table.
pub const DEPARTURE_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Name of the flight number column for a 1-based slot.
pub fn flight_number_column(slot: usize) -> String {
    format!("{}{}", FLIGHT_NUMBER_PREFIX, slot)
}

/// Name of the departure date column for a 1-based slot.
pub fn departure_date_column(slot: usize) -> String {
    format!("{}{}", DEPARTURE_DATE_PREFIX, slot)
}

/// Name of the airport column for a 1-based slot.
pub fn airport_column(slot: usize) -> String {
    format!("{}{}", AIRPORT_PREFIX, slot)
}

/// Treats the source system's `NULL` literal and blank strings as absent.
pub fn clean_cell(raw: Option<&str>) -> Option<&str> {
    match raw {
        Some(value) => {
            let trimmed = value.trim();
            if trimmed.is_empty() || trimmed == NULL_SENTINEL {
                None
            } else {
                Some(trimmed)
            }
        }
        None => None,
    }
}
