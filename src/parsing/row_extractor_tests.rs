#[cfg(test)]
mod tests {
    use crate::core::domain::RowId;
    use crate::parsing::row_extractor::{
        extract_records, parse_departure, ExtractionErrorKind,
    };
    use chrono::{TimeZone, Utc};
    use polars::prelude::*;

    /// Minimal single-slot frame: one flight per row, payload columns present.
    fn flat_frame(rows: Vec<(i64, Option<&str>, Option<&str>)>) -> DataFrame {
        let ids: Vec<i64> = rows.iter().map(|r| r.0).collect();
        let numbers: Vec<Option<&str>> = rows.iter().map(|r| r.1).collect();
        let dates: Vec<Option<&str>> = rows.iter().map(|r| r.2).collect();
        let pax: Vec<&str> = rows.iter().map(|_| "DOE/JOHN").collect();
        let refs: Vec<&str> = rows.iter().map(|_| "REF001").collect();

        df!(
            "RowId" => ids,
            "PaxName" => pax,
            "BookingRef" => refs,
            "FlightNumber1" => numbers,
            "DepartureDateLocal1" => dates,
        )
        .unwrap()
    }

    #[test]
    fn test_extracts_valid_single_leg_rows() {
        let df = flat_frame(vec![
            (1, Some("BA123"), Some("2024-03-01 08:00:00")),
            (2, Some("LH456"), Some("2024-03-02 14:30:00")),
        ]);

        let outcome = extract_records(&df).unwrap();

        assert_eq!(outcome.records.len(), 2);
        assert!(outcome.exclusions.is_empty());
        let first = &outcome.records[0];
        assert_eq!(first.source_row_id, RowId(1));
        assert_eq!(first.flight_number(), "BA123");
        assert_eq!(
            first.departure(),
            Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap()
        );
        assert_eq!(first.booking.pax_name, "DOE/JOHN");
        assert_eq!(first.booking.booking_ref, "REF001");
    }

    #[test]
    fn test_unparseable_date_excludes_row_and_keeps_going() {
        let df = flat_frame(vec![
            (1, Some("BA123"), Some("not-a-date")),
            (2, Some("LH456"), Some("2024-03-02 14:30:00")),
        ]);

        let outcome = extract_records(&df).unwrap();

        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.records[0].source_row_id, RowId(2));
        assert_eq!(outcome.exclusions.len(), 1);
        assert_eq!(outcome.exclusions[0].row_id, RowId(1));
        assert_eq!(
            outcome.exclusions[0].kind,
            ExtractionErrorKind::UnparseableTimestamp("not-a-date".to_string())
        );
    }

    #[test]
    fn test_flight_number_without_date_is_missing_field() {
        let df = flat_frame(vec![(1, Some("BA123"), None)]);

        let outcome = extract_records(&df).unwrap();

        assert!(outcome.records.is_empty());
        assert_eq!(
            outcome.exclusions[0].kind,
            ExtractionErrorKind::MissingField("DepartureDateLocal1".to_string())
        );
    }

    #[test]
    fn test_date_without_flight_number_is_missing_field() {
        let df = flat_frame(vec![(1, None, Some("2024-03-01 08:00:00"))]);

        let outcome = extract_records(&df).unwrap();

        assert!(outcome.records.is_empty());
        assert_eq!(
            outcome.exclusions[0].kind,
            ExtractionErrorKind::MissingField("FlightNumber1".to_string())
        );
    }

    #[test]
    fn test_garbage_flight_number_is_reported_as_unparseable() {
        let df = flat_frame(vec![(1, Some("??!!"), Some("2024-03-01 08:00:00"))]);

        let outcome = extract_records(&df).unwrap();

        assert!(outcome.records.is_empty());
        assert_eq!(
            outcome.exclusions[0].kind,
            ExtractionErrorKind::UnparseableFlightNumber("??!!".to_string())
        );
    }

    #[test]
    fn test_null_sentinel_strings_are_absent_values() {
        let df = flat_frame(vec![(1, Some("NULL"), Some("NULL"))]);

        let outcome = extract_records(&df).unwrap();

        // Both cells are sentinels, so the row has no usable slot.
        assert!(outcome.records.is_empty());
        assert_eq!(outcome.exclusions.len(), 1);
        assert!(matches!(
            outcome.exclusions[0].kind,
            ExtractionErrorKind::MissingField(_)
        ));
    }

    #[test]
    fn test_placeholder_flight_numbers_are_discarded() {
        let df = df!(
            "RowId" => [1i64],
            "PaxName" => ["DOE/JANE"],
            "BookingRef" => ["REF002"],
            "FlightNumber1" => [Some("XX000")],
            "DepartureDateLocal1" => [Some("2024-03-01 08:00:00")],
            "FlightNumber2" => [Some("BA200")],
            "DepartureDateLocal2" => [Some("2024-03-01 12:00:00")],
        )
        .unwrap();

        let outcome = extract_records(&df).unwrap();

        assert_eq!(outcome.legs_discarded, 1);
        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.records[0].occupied_slots(), 1);
        assert_eq!(outcome.records[0].flight_number(), "BA200");
    }

    #[test]
    fn test_multi_slot_row_folds_into_one_record_sorted_by_departure() {
        // Slots deliberately out of time order.
        let df = df!(
            "RowId" => [5i64],
            "PaxName" => ["DOE/JANE"],
            "BookingRef" => ["REF003"],
            "FlightNumber1" => [Some("AF20")],
            "DepartureDateLocal1" => [Some("2024-03-02 10:00:00")],
            "FlightNumber2" => [Some("AF10")],
            "DepartureDateLocal2" => [Some("2024-03-01 09:00:00")],
        )
        .unwrap();

        let outcome = extract_records(&df).unwrap();

        assert_eq!(outcome.records.len(), 1);
        let record = &outcome.records[0];
        assert_eq!(record.occupied_slots(), 2);
        assert_eq!(record.flight_number(), "AF10");
        assert_eq!(
            record.departure(),
            Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_superseded_rows_are_skipped() {
        let df = df!(
            "RowId" => [1i64, 2],
            "PaxName" => ["A", "B"],
            "BookingRef" => ["R1", "R2"],
            "ETicketNo" => [Some("UPDATED"), Some("125-4411")],
            "FlightNumber1" => [Some("BA1"), Some("BA2")],
            "DepartureDateLocal1" => [Some("2024-03-01 08:00:00"), Some("2024-03-01 09:00:00")],
        )
        .unwrap();

        let outcome = extract_records(&df).unwrap();

        assert_eq!(outcome.superseded_skipped, 1);
        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.records[0].source_row_id, RowId(2));
        assert_eq!(
            outcome.records[0].booking.e_ticket_no.as_deref(),
            Some("125-4411")
        );
    }

    #[test]
    fn test_empty_frame_yields_empty_outcome() {
        let df = flat_frame(vec![]);

        let outcome = extract_records(&df).unwrap();

        assert!(outcome.records.is_empty());
        assert!(outcome.exclusions.is_empty());
        assert_eq!(outcome.legs_discarded, 0);
    }

    #[test]
    fn test_frame_without_row_id_column_is_structural_error() {
        let df = df!(
            "FlightNumber1" => ["BA1"],
            "DepartureDateLocal1" => ["2024-03-01 08:00:00"],
        )
        .unwrap();

        assert!(extract_records(&df).is_err());
    }

    #[test]
    fn test_parse_departure_accepts_source_formats() {
        let expected = Utc.with_ymd_and_hms(2024, 3, 1, 8, 30, 0).unwrap();

        assert_eq!(parse_departure("2024-03-01 08:30:00"), Some(expected));
        assert_eq!(parse_departure("2024-03-01 08:30:00.000"), Some(expected));
        assert_eq!(parse_departure("2024-03-01T08:30:00"), Some(expected));
        assert_eq!(parse_departure("2024-03-01 08:30"), Some(expected));
        // Offset-carrying strings normalize to UTC.
        assert_eq!(parse_departure("2024-03-01T03:30:00-05:00"), Some(expected));
        // Bare dates are midnight.
        assert_eq!(
            parse_departure("2024-03-01"),
            Some(Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap())
        );
        assert_eq!(parse_departure("03/01/2024"), None);
        assert_eq!(parse_departure(""), None);
    }
}
