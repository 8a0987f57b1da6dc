use anyhow::{Context, Result};
use polars::prelude::*;
use std::fs::File;
use std::path::Path;

use crate::core::schema::{
    airport_column, departure_date_column, flight_number_column, AIRPORT_SLOTS, COL_AIRLINE,
    COL_BOOKING_REF, COL_CLIENT_CODE, COL_CONSOLIDATED_INTO, COL_E_TICKET_NO, COL_JOURNEY_TYPE,
    COL_PAX_NAME, COL_ROW_ID, MAX_FLIGHT_SLOTS,
};

/// Schema columns that must read as strings regardless of what the CSV
/// reader inferred (flight numbers and booking refs are easily misread as
/// integers).
fn string_schema_columns() -> Vec<String> {
    let mut columns = vec![
        COL_PAX_NAME.to_string(),
        COL_BOOKING_REF.to_string(),
        COL_E_TICKET_NO.to_string(),
        COL_CLIENT_CODE.to_string(),
        COL_AIRLINE.to_string(),
        COL_JOURNEY_TYPE.to_string(),
    ];
    for slot in 1..=MAX_FLIGHT_SLOTS {
        columns.push(flight_number_column(slot));
        columns.push(departure_date_column(slot));
    }
    for slot in 1..=AIRPORT_SLOTS {
        columns.push(airport_column(slot));
    }
    columns
}

/// Loads a flight table snapshot from CSV.
///
/// The frame must carry a `RowId` column; schema columns present in the file
/// are cast to their expected types, columns the file lacks are simply
/// absent (the extractor treats them as empty).
pub fn load_table_csv(path: &Path) -> Result<DataFrame> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.into()))?
        .finish()
        .with_context(|| format!("failed to parse CSV {}", path.display()))?;

    let column_names: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect();
    anyhow::ensure!(
        column_names.iter().any(|c| c == COL_ROW_ID),
        "input table must carry a {} column",
        COL_ROW_ID
    );

    let mut lazy_df = df.lazy();
    lazy_df = lazy_df.with_column(col(COL_ROW_ID).cast(DataType::Int64));
    if column_names.iter().any(|c| c == COL_CONSOLIDATED_INTO) {
        lazy_df = lazy_df.with_column(col(COL_CONSOLIDATED_INTO).cast(DataType::Int64));
    }
    for name in string_schema_columns() {
        if column_names.contains(&name) {
            lazy_df = lazy_df.with_column(col(name.as_str()).cast(DataType::String));
        }
    }

    lazy_df
        .collect()
        .context("failed to cast table columns to expected types")
}

/// Writes a table snapshot to CSV.
pub fn write_table_csv(df: &mut DataFrame, path: &Path) -> Result<()> {
    let mut file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    CsvWriter::new(&mut file)
        .finish(df)
        .with_context(|| format!("failed to write CSV {}", path.display()))?;
    Ok(())
}
