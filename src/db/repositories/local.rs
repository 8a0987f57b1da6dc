//! In-memory row store.
//!
//! Holds the flight booking table as a vector of typed rows behind an
//! `RwLock`, rendering live rows into the schema frame on fetch and applying
//! operation plans under the write lock. Used by tests and the CLI; a real
//! database backend would implement the same trait against SQL.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use polars::prelude::*;

use crate::algorithms::plan::OperationPlan;
use crate::core::domain::{BookingDetails, FlightLeg, RowId};
use crate::core::schema::{
    COL_AIRLINE, COL_BOOKING_REF, COL_CLIENT_CODE, COL_CONSOLIDATED_INTO, COL_E_TICKET_NO,
    COL_JOURNEY_TYPE, COL_PAX_NAME, COL_ROW_ID, DEPARTURE_DATE_FORMAT, INSERTED_TICKET_MARKER,
    MAX_FLIGHT_SLOTS, UPDATED_TICKET_MARKER,
};
use crate::db::checksum::snapshot_fingerprint;
use crate::db::repository::{ApplyStats, FlightRowStore, RepositoryError, RepositoryResult};

/// One persisted row of the in-memory table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredRow {
    pub row_id: RowId,
    pub booking: BookingDetails,
    pub legs: Vec<FlightLeg>,
    /// Set once the row has been absorbed into a consolidated row.
    pub consolidated_into: Option<RowId>,
}

impl StoredRow {
    /// A row is live until a consolidation run supersedes it.
    pub fn is_live(&self) -> bool {
        self.consolidated_into.is_none()
    }
}

struct LocalData {
    rows: Vec<StoredRow>,
    next_row_id: i64,
    is_healthy: bool,
}

impl Default for LocalData {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            next_row_id: 1,
            is_healthy: true,
        }
    }
}

/// In-memory [`FlightRowStore`].
#[derive(Clone, Default)]
pub struct LocalRepository {
    data: Arc<RwLock<LocalData>>,
}

impl LocalRepository {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds one row, assigning it the next row id.
    pub fn seed_row(
        &self,
        booking: BookingDetails,
        legs: Vec<FlightLeg>,
    ) -> RepositoryResult<RowId> {
        if legs.is_empty() {
            return Err(RepositoryError::QueryError(
                "cannot seed a row without flight legs".to_string(),
            ));
        }
        if legs.len() > MAX_FLIGHT_SLOTS {
            return Err(RepositoryError::QueryError(format!(
                "row would occupy {} flight slots, table holds {}",
                legs.len(),
                MAX_FLIGHT_SLOTS
            )));
        }
        let mut data = self.write_data()?;
        let row_id = RowId(data.next_row_id);
        data.next_row_id += 1;
        data.rows.push(StoredRow {
            row_id,
            booking,
            legs,
            consolidated_into: None,
        });
        Ok(row_id)
    }

    /// Seeds a single-flight row, the shape fresh ingests arrive in.
    pub fn seed_flat_row(
        &self,
        booking: BookingDetails,
        leg: FlightLeg,
    ) -> RepositoryResult<RowId> {
        self.seed_row(booking, vec![leg])
    }

    /// Marks the store unhealthy; used to exercise error paths in tests.
    pub fn set_healthy(&self, healthy: bool) -> RepositoryResult<()> {
        self.write_data()?.is_healthy = healthy;
        Ok(())
    }

    /// Snapshot of every stored row, superseded ones included.
    pub fn rows(&self) -> RepositoryResult<Vec<StoredRow>> {
        Ok(self.read_data()?.rows.clone())
    }

    /// Looks up a row by id.
    pub fn row(&self, row_id: RowId) -> RepositoryResult<Option<StoredRow>> {
        Ok(self
            .read_data()?
            .rows
            .iter()
            .find(|r| r.row_id == row_id)
            .cloned())
    }

    /// Number of live rows.
    pub fn live_row_count(&self) -> RepositoryResult<usize> {
        Ok(self.read_data()?.rows.iter().filter(|r| r.is_live()).count())
    }

    /// Number of superseded rows.
    pub fn superseded_row_count(&self) -> RepositoryResult<usize> {
        Ok(self
            .read_data()?
            .rows
            .iter()
            .filter(|r| !r.is_live())
            .count())
    }

    fn read_data(&self) -> RepositoryResult<RwLockReadGuard<'_, LocalData>> {
        self.data
            .read()
            .map_err(|_| RepositoryError::InternalError("store lock poisoned".to_string()))
    }

    fn write_data(&self) -> RepositoryResult<RwLockWriteGuard<'_, LocalData>> {
        self.data
            .write()
            .map_err(|_| RepositoryError::InternalError("store lock poisoned".to_string()))
    }
}

fn slot_number(row: &StoredRow, slot: usize) -> Option<String> {
    row.legs.get(slot).map(|l| l.flight_number.clone())
}

fn slot_departure(row: &StoredRow, slot: usize) -> Option<String> {
    row.legs
        .get(slot)
        .map(|l| l.departure.format(DEPARTURE_DATE_FORMAT).to_string())
}

fn airport(row: &StoredRow, slot: usize) -> Option<String> {
    row.booking.airports.get(slot).cloned().flatten()
}

/// Renders the live rows into the table-schema frame the extractor consumes.
fn render_snapshot(data: &LocalData) -> PolarsResult<DataFrame> {
    let live: Vec<&StoredRow> = data.rows.iter().filter(|r| r.is_live()).collect();

    df!(
        COL_ROW_ID => live.iter().map(|r| r.row_id.0).collect::<Vec<i64>>(),
        COL_PAX_NAME => live.iter().map(|r| r.booking.pax_name.clone()).collect::<Vec<String>>(),
        COL_BOOKING_REF => live.iter().map(|r| r.booking.booking_ref.clone()).collect::<Vec<String>>(),
        COL_E_TICKET_NO => live.iter().map(|r| r.booking.e_ticket_no.clone()).collect::<Vec<Option<String>>>(),
        COL_CLIENT_CODE => live.iter().map(|r| r.booking.client_code.clone()).collect::<Vec<Option<String>>>(),
        COL_AIRLINE => live.iter().map(|r| r.booking.airline.clone()).collect::<Vec<Option<String>>>(),
        COL_JOURNEY_TYPE => live.iter().map(|r| r.booking.journey_type.clone()).collect::<Vec<Option<String>>>(),
        "FlightNumber1" => live.iter().map(|r| slot_number(r, 0)).collect::<Vec<_>>(),
        "FlightNumber2" => live.iter().map(|r| slot_number(r, 1)).collect::<Vec<_>>(),
        "FlightNumber3" => live.iter().map(|r| slot_number(r, 2)).collect::<Vec<_>>(),
        "FlightNumber4" => live.iter().map(|r| slot_number(r, 3)).collect::<Vec<_>>(),
        "FlightNumber5" => live.iter().map(|r| slot_number(r, 4)).collect::<Vec<_>>(),
        "FlightNumber6" => live.iter().map(|r| slot_number(r, 5)).collect::<Vec<_>>(),
        "FlightNumber7" => live.iter().map(|r| slot_number(r, 6)).collect::<Vec<_>>(),
        "DepartureDateLocal1" => live.iter().map(|r| slot_departure(r, 0)).collect::<Vec<_>>(),
        "DepartureDateLocal2" => live.iter().map(|r| slot_departure(r, 1)).collect::<Vec<_>>(),
        "DepartureDateLocal3" => live.iter().map(|r| slot_departure(r, 2)).collect::<Vec<_>>(),
        "DepartureDateLocal4" => live.iter().map(|r| slot_departure(r, 3)).collect::<Vec<_>>(),
        "DepartureDateLocal5" => live.iter().map(|r| slot_departure(r, 4)).collect::<Vec<_>>(),
        "DepartureDateLocal6" => live.iter().map(|r| slot_departure(r, 5)).collect::<Vec<_>>(),
        "DepartureDateLocal7" => live.iter().map(|r| slot_departure(r, 6)).collect::<Vec<_>>(),
        "Airport1" => live.iter().map(|r| airport(r, 0)).collect::<Vec<_>>(),
        "Airport2" => live.iter().map(|r| airport(r, 1)).collect::<Vec<_>>(),
        "Airport3" => live.iter().map(|r| airport(r, 2)).collect::<Vec<_>>(),
        "Airport4" => live.iter().map(|r| airport(r, 3)).collect::<Vec<_>>(),
        "Airport5" => live.iter().map(|r| airport(r, 4)).collect::<Vec<_>>(),
        "Airport6" => live.iter().map(|r| airport(r, 5)).collect::<Vec<_>>(),
        "Airport7" => live.iter().map(|r| airport(r, 6)).collect::<Vec<_>>(),
        "Airport8" => live.iter().map(|r| airport(r, 7)).collect::<Vec<_>>(),
        COL_CONSOLIDATED_INTO => live.iter().map(|r| r.consolidated_into.map(|id| id.0)).collect::<Vec<Option<i64>>>(),
    )
}

impl FlightRowStore for LocalRepository {
    fn health_check(&self) -> RepositoryResult<bool> {
        Ok(self.read_data()?.is_healthy)
    }

    fn fetch_snapshot(&self) -> RepositoryResult<DataFrame> {
        let data = self.read_data()?;
        render_snapshot(&data).map_err(|e| RepositoryError::QueryError(e.to_string()))
    }

    fn apply_plan(&self, plan: &OperationPlan) -> RepositoryResult<ApplyStats> {
        let mut data = self.write_data()?;

        // Preconditions are checked in full before the first mutation, so a
        // rejected plan leaves the table untouched.
        let current = render_snapshot(&data)
            .map_err(|e| RepositoryError::QueryError(e.to_string()))?;
        let store_fingerprint = snapshot_fingerprint(&current);
        if store_fingerprint != plan.snapshot_fingerprint {
            return Err(RepositoryError::StaleSnapshot {
                plan: plan.snapshot_fingerprint.clone(),
                store: store_fingerprint,
            });
        }

        for insert in &plan.inserts {
            if insert.legs.len() > MAX_FLIGHT_SLOTS {
                return Err(RepositoryError::InternalError(format!(
                    "insert {} carries {} legs, table holds {}",
                    insert.link.0,
                    insert.legs.len(),
                    MAX_FLIGHT_SLOTS
                )));
            }
        }
        for update in &plan.updates {
            if update.link.0 >= plan.inserts.len() {
                return Err(RepositoryError::InternalError(format!(
                    "update for row {} references missing insert {}",
                    update.row_id, update.link.0
                )));
            }
            let target = data.rows.iter().find(|r| r.row_id == update.row_id);
            match target {
                Some(row) if row.is_live() => {}
                _ => return Err(RepositoryError::NotFound(update.row_id)),
            }
        }

        // Inserts first: assign ids so link keys can resolve.
        let mut assigned = Vec::with_capacity(plan.inserts.len());
        for insert in &plan.inserts {
            let row_id = RowId(data.next_row_id);
            data.next_row_id += 1;
            let mut booking = insert.booking.clone();
            booking.e_ticket_no = Some(INSERTED_TICKET_MARKER.to_string());
            data.rows.push(StoredRow {
                row_id,
                booking,
                legs: insert.legs.clone(),
                consolidated_into: None,
            });
            assigned.push(row_id);
        }

        // Then supersession updates, linking each original to its insert.
        for update in &plan.updates {
            let resolved = assigned[update.link.0];
            if let Some(row) = data.rows.iter_mut().find(|r| r.row_id == update.row_id) {
                row.booking.e_ticket_no = Some(UPDATED_TICKET_MARKER.to_string());
                row.consolidated_into = Some(resolved);
            }
        }

        Ok(ApplyStats {
            rows_inserted: plan.inserts.len(),
            rows_updated: plan.updates.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn booking(name: &str) -> BookingDetails {
        BookingDetails {
            pax_name: name.to_string(),
            booking_ref: format!("REF-{}", name),
            ..Default::default()
        }
    }

    fn leg(number: &str, hour: u32) -> FlightLeg {
        FlightLeg::new(
            number,
            Utc.with_ymd_and_hms(2024, 3, 1, hour, 0, 0).unwrap(),
        )
    }

    #[test]
    fn test_seed_assigns_sequential_ids() {
        let repo = LocalRepository::new();
        let a = repo.seed_flat_row(booking("A"), leg("BA1", 8)).unwrap();
        let b = repo.seed_flat_row(booking("B"), leg("BA2", 9)).unwrap();

        assert_eq!(a, RowId(1));
        assert_eq!(b, RowId(2));
        assert_eq!(repo.live_row_count().unwrap(), 2);
    }

    #[test]
    fn test_snapshot_carries_table_schema() {
        let repo = LocalRepository::new();
        repo.seed_flat_row(booking("A"), leg("BA1", 8)).unwrap();

        let df = repo.fetch_snapshot().unwrap();

        assert_eq!(df.height(), 1);
        for expected in [COL_ROW_ID, COL_PAX_NAME, "FlightNumber1", "FlightNumber7", "DepartureDateLocal1", "Airport8"] {
            assert!(
                df.column(expected).is_ok(),
                "snapshot missing column {}",
                expected
            );
        }
        let numbers = df.column("FlightNumber1").unwrap().str().unwrap();
        assert_eq!(numbers.get(0), Some("BA1"));
        let dates = df.column("DepartureDateLocal1").unwrap().str().unwrap();
        assert_eq!(dates.get(0), Some("2024-03-01 08:00:00"));
    }

    #[test]
    fn test_seed_rejects_overfull_rows() {
        let repo = LocalRepository::new();
        let legs: Vec<FlightLeg> = (0..8).map(|i| leg("XX1", i)).collect();
        assert!(repo.seed_row(booking("A"), legs).is_err());
        assert!(repo.seed_row(booking("A"), vec![]).is_err());
    }

    #[test]
    fn test_health_toggle() {
        let repo = LocalRepository::new();
        assert!(repo.health_check().unwrap());
        repo.set_healthy(false).unwrap();
        assert!(!repo.health_check().unwrap());
    }
}
