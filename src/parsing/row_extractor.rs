use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::core::domain::{BookingDetails, FlightLeg, FlightRecord, RowId};
use crate::core::schema::{
    airport_column, clean_cell, departure_date_column, flight_number_column, AIRPORT_SLOTS,
    COL_AIRLINE, COL_BOOKING_REF, COL_CLIENT_CODE, COL_CONSOLIDATED_INTO, COL_E_TICKET_NO,
    COL_JOURNEY_TYPE, COL_PAX_NAME, COL_ROW_ID, MAX_FLIGHT_SLOTS, PLACEHOLDER_FLIGHT_SUFFIX,
    UPDATED_TICKET_MARKER,
};

/// What went wrong with a single row.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
pub enum ExtractionErrorKind {
    #[error("missing required field {0}")]
    MissingField(String),

    #[error("unparseable departure timestamp {0:?}")]
    UnparseableTimestamp(String),

    #[error("unparseable flight number {0:?}")]
    UnparseableFlightNumber(String),
}

/// A per-row, non-fatal extraction failure.
///
/// The offending row is excluded from grouping; the caller decides what to
/// log. Extraction itself performs no I/O.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
#[error("row {row_id}: {kind}")]
pub struct ExtractionError {
    pub row_id: RowId,
    pub kind: ExtractionErrorKind,
}

impl ExtractionError {
    fn missing(row_id: RowId, field: impl Into<String>) -> Self {
        Self {
            row_id,
            kind: ExtractionErrorKind::MissingField(field.into()),
        }
    }
}

/// Result of one extraction pass over a snapshot frame.
#[derive(Debug, Clone, Default)]
pub struct ExtractionOutcome {
    /// Canonical records, in frame order.
    pub records: Vec<FlightRecord>,
    /// Rows excluded from grouping, with the reason per row.
    pub exclusions: Vec<ExtractionError>,
    /// Placeholder flight slots (numbers ending `000`) discarded.
    pub legs_discarded: usize,
    /// Rows skipped because they were already superseded by an earlier run.
    pub superseded_skipped: usize,
}

/// Extracts canonical flight records from a table snapshot.
///
/// Walks every row of the frame, folding each row's occupied flight slots
/// into one [`FlightRecord`]. A slot needs both a usable flight number and a
/// parseable departure date; rows violating that are excluded with a
/// [`ExtractionErrorKind`] and reported in the outcome, and the pass
/// continues. Rows already carrying a supersession marker are skipped.
///
/// # Returns
/// * `Ok(ExtractionOutcome)` - records plus the exclusion report
/// * `Err` - the frame itself is structurally unusable (no `RowId` column)
pub fn extract_records(df: &DataFrame) -> Result<ExtractionOutcome> {
    let row_ids = df
        .column(COL_ROW_ID)
        .context("snapshot frame must carry a RowId column")?
        .i64()
        .context("RowId column must be an integer column")?;

    let flight_cols: Vec<_> = (1..=MAX_FLIGHT_SLOTS)
        .map(|slot| string_column(df, &flight_number_column(slot)))
        .collect();
    let departure_cols: Vec<_> = (1..=MAX_FLIGHT_SLOTS)
        .map(|slot| string_column(df, &departure_date_column(slot)))
        .collect();
    let airport_cols: Vec<_> = (1..=AIRPORT_SLOTS)
        .map(|slot| string_column(df, &airport_column(slot)))
        .collect();

    let pax_names = string_column(df, COL_PAX_NAME);
    let booking_refs = string_column(df, COL_BOOKING_REF);
    let e_ticket_nos = string_column(df, COL_E_TICKET_NO);
    let client_codes = string_column(df, COL_CLIENT_CODE);
    let airlines = string_column(df, COL_AIRLINE);
    let journey_types = string_column(df, COL_JOURNEY_TYPE);
    let consolidated_into = df
        .column(COL_CONSOLIDATED_INTO)
        .ok()
        .and_then(|c| c.i64().ok());

    let mut outcome = ExtractionOutcome::default();

    for i in 0..df.height() {
        let Some(raw_id) = row_ids.get(i) else {
            outcome
                .exclusions
                .push(ExtractionError::missing(RowId(i as i64), COL_ROW_ID));
            continue;
        };
        let row_id = RowId(raw_id);

        // Superseded rows are dead: an earlier run absorbed them.
        let marker = clean_cell(e_ticket_nos.and_then(|c| c.get(i)));
        let linked = consolidated_into.and_then(|c| c.get(i)).is_some();
        if linked || marker == Some(UPDATED_TICKET_MARKER) {
            outcome.superseded_skipped += 1;
            continue;
        }

        let mut legs = Vec::new();
        let mut row_error = None;

        for slot in 0..MAX_FLIGHT_SLOTS {
            let number = clean_cell(flight_cols[slot].and_then(|c| c.get(i)));
            let raw_date = clean_cell(departure_cols[slot].and_then(|c| c.get(i)));

            match (number, raw_date) {
                (None, None) => continue,
                (Some(number), Some(raw_date)) => {
                    if !is_valid_flight_number(number) {
                        row_error = Some(ExtractionError {
                            row_id,
                            kind: ExtractionErrorKind::UnparseableFlightNumber(number.to_string()),
                        });
                        break;
                    }
                    let Some(departure) = parse_departure(raw_date) else {
                        row_error = Some(ExtractionError {
                            row_id,
                            kind: ExtractionErrorKind::UnparseableTimestamp(raw_date.to_string()),
                        });
                        break;
                    };
                    if number.ends_with(PLACEHOLDER_FLIGHT_SUFFIX) {
                        outcome.legs_discarded += 1;
                        continue;
                    }
                    legs.push(FlightLeg::new(number, departure));
                }
                (Some(_), None) => {
                    row_error = Some(ExtractionError::missing(
                        row_id,
                        departure_date_column(slot + 1),
                    ));
                    break;
                }
                (None, Some(_)) => {
                    row_error = Some(ExtractionError::missing(
                        row_id,
                        flight_number_column(slot + 1),
                    ));
                    break;
                }
            }
        }

        if let Some(error) = row_error {
            outcome.exclusions.push(error);
            continue;
        }
        if legs.is_empty() {
            // No usable slot at all (empty row or placeholders only).
            outcome
                .exclusions
                .push(ExtractionError::missing(row_id, flight_number_column(1)));
            continue;
        }

        let booking = BookingDetails {
            pax_name: cell_string(pax_names, i).unwrap_or_default(),
            booking_ref: cell_string(booking_refs, i).unwrap_or_default(),
            e_ticket_no: cell_string(e_ticket_nos, i),
            client_code: cell_string(client_codes, i),
            airline: cell_string(airlines, i),
            journey_type: cell_string(journey_types, i),
            airports: airport_cols
                .iter()
                .map(|col| cell_string(*col, i))
                .collect(),
        };

        outcome
            .records
            .push(FlightRecord::new(row_id, legs, booking));
    }

    Ok(outcome)
}

/// Parses a departure date string into a UTC timestamp.
///
/// Accepts the source system's wall-clock formats (with or without
/// fractional seconds), ISO-8601 with an offset, and bare dates (taken as
/// midnight). Naive timestamps are taken as UTC.
pub fn parse_departure(raw: &str) -> Option<DateTime<Utc>> {
    const NAIVE_FORMATS: [&str; 3] = [
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
    ];

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date
            .and_hms_opt(0, 0, 0)
            .map(|naive| Utc.from_utc_datetime(&naive));
    }
    None
}

/// Flight numbers are airline designator + digits, possibly spaced or
/// hyphenated. Anything with other punctuation is garbage from upstream.
fn is_valid_flight_number(raw: &str) -> bool {
    raw.chars()
        .all(|c| c.is_ascii_alphanumeric() || c == ' ' || c == '-')
}

fn string_column<'a>(df: &'a DataFrame, name: &str) -> Option<&'a StringChunked> {
    df.column(name).ok().and_then(|c| c.str().ok())
}

fn cell_string(col: Option<&StringChunked>, i: usize) -> Option<String> {
    clean_cell(col.and_then(|c| c.get(i))).map(String::from)
}
