//! Plan consistency audit.
//!
//! A violation here is not bad input - it is a defect in the grouping or
//! plan-building algorithm itself. The audit therefore fails fast on the
//! first breach, the run aborts, and nothing is handed to the store.

use std::collections::HashSet;

use crate::algorithms::grouping::GroupingParams;
use crate::algorithms::plan::OperationPlan;
use crate::core::domain::{FlightGroup, FlightRecord, RowId};

/// Fatal internal invariant violation detected between grouping and apply.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlanConsistencyError {
    #[error("row {0} appears in more than one group")]
    DuplicateMembership(RowId),

    #[error("row {0} was dropped from every group")]
    UnassignedRecord(RowId),

    #[error("group contains row {0} that is not part of the input")]
    ForeignRecord(RowId),

    #[error(
        "group anchored at row {anchor} spans {span_minutes} minutes, window is {window_minutes}"
    )]
    WindowExceeded {
        anchor: RowId,
        span_minutes: i64,
        window_minutes: i64,
    },

    #[error("group anchored at row {anchor} occupies {slots} slots, capacity is {capacity}")]
    CapacityExceeded {
        anchor: RowId,
        slots: usize,
        capacity: usize,
    },

    #[error("plan emitted {actual} inserts for {expected} multi-member groups")]
    InsertCountMismatch { expected: usize, actual: usize },

    #[error("insert at position {position} carries link key {link}")]
    LinkKeyMismatch { position: usize, link: usize },

    #[error("update operations do not match group membership: {0}")]
    UpdateMismatch(String),
}

/// Audits a plan against the records and groups it was derived from.
///
/// Checks, in order:
/// 1. partition completeness - every input record sits in exactly one group,
///    and groups contain nothing else;
/// 2. the window bound per group (span from the anchor ≤ window);
/// 3. the capacity bound per group (occupied slots ≤ capacity);
/// 4. plan shape - one insert per multi-member group with sequential link
///    keys, and one update per absorbed member referencing its group's
///    insert, in group order.
///
/// # Returns
/// * `Ok(())` - the plan is internally consistent and safe to apply
/// * `Err(PlanConsistencyError)` - the first invariant breach found
pub fn verify_plan(
    records: &[FlightRecord],
    groups: &[FlightGroup],
    plan: &OperationPlan,
    params: &GroupingParams,
) -> Result<(), PlanConsistencyError> {
    let input_ids: HashSet<RowId> = records.iter().map(|r| r.source_row_id).collect();

    let mut grouped_ids = HashSet::new();
    for group in groups {
        for record in group.records() {
            let row_id = record.source_row_id;
            if !grouped_ids.insert(row_id) {
                return Err(PlanConsistencyError::DuplicateMembership(row_id));
            }
            if !input_ids.contains(&row_id) {
                return Err(PlanConsistencyError::ForeignRecord(row_id));
            }
        }
    }
    for record in records {
        if !grouped_ids.contains(&record.source_row_id) {
            return Err(PlanConsistencyError::UnassignedRecord(record.source_row_id));
        }
    }

    let window = params.window();
    for group in groups {
        if group.len() > 1 && group.span() > window {
            return Err(PlanConsistencyError::WindowExceeded {
                anchor: group.anchor().source_row_id,
                span_minutes: group.span().num_minutes(),
                window_minutes: window.num_minutes(),
            });
        }
        if group.total_slots() > params.max_entries {
            return Err(PlanConsistencyError::CapacityExceeded {
                anchor: group.anchor().source_row_id,
                slots: group.total_slots(),
                capacity: params.max_entries,
            });
        }
    }

    let multi_groups: Vec<&FlightGroup> = groups.iter().filter(|g| !g.is_singleton()).collect();
    if plan.inserts.len() != multi_groups.len() {
        return Err(PlanConsistencyError::InsertCountMismatch {
            expected: multi_groups.len(),
            actual: plan.inserts.len(),
        });
    }
    for (position, insert) in plan.inserts.iter().enumerate() {
        if insert.link.0 != position {
            return Err(PlanConsistencyError::LinkKeyMismatch {
                position,
                link: insert.link.0,
            });
        }
    }

    let mut expected_updates = multi_groups
        .iter()
        .enumerate()
        .flat_map(|(ordinal, group)| {
            group
                .records()
                .iter()
                .map(move |record| (record.source_row_id, ordinal))
        });
    let mut actual_updates = plan.updates.iter().map(|u| (u.row_id, u.link.0));
    loop {
        match (expected_updates.next(), actual_updates.next()) {
            (None, None) => break,
            (Some(expected), Some(actual)) if expected == actual => continue,
            (expected, actual) => {
                return Err(PlanConsistencyError::UpdateMismatch(format!(
                    "expected {:?}, found {:?}",
                    expected, actual
                )));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::grouping::group_records;
    use crate::algorithms::plan::{build_plan, LinkKey, UpdateOp};
    use crate::core::domain::{BookingDetails, FlightLeg};
    use chrono::{DateTime, TimeZone, Utc};

    fn ts(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, day, hour, 0, 0).unwrap()
    }

    fn record(row_id: i64, departure: DateTime<Utc>) -> FlightRecord {
        FlightRecord::new(
            RowId(row_id),
            vec![FlightLeg::new(format!("XX{}", row_id), departure)],
            BookingDetails::default(),
        )
    }

    fn fixture() -> (Vec<FlightRecord>, Vec<FlightGroup>, OperationPlan, GroupingParams) {
        let params = GroupingParams::new(24, 3).unwrap();
        let records = vec![
            record(1, ts(1, 8)),
            record(2, ts(1, 14)),
            record(3, ts(3, 9)),
        ];
        let groups = group_records(records.clone(), &params).unwrap();
        let plan = build_plan(&groups, "fp");
        (records, groups, plan, params)
    }

    #[test]
    fn test_valid_plan_passes() {
        let (records, groups, plan, params) = fixture();
        assert_eq!(verify_plan(&records, &groups, &plan, &params), Ok(()));
    }

    #[test]
    fn test_dropped_record_is_detected() {
        let (mut records, groups, plan, params) = fixture();
        records.push(record(99, ts(5, 0)));

        assert_eq!(
            verify_plan(&records, &groups, &plan, &params),
            Err(PlanConsistencyError::UnassignedRecord(RowId(99)))
        );
    }

    #[test]
    fn test_duplicated_membership_is_detected() {
        let (records, mut groups, plan, params) = fixture();
        let duplicate = groups[0].records()[0].clone();
        groups[1].push(duplicate);

        assert_eq!(
            verify_plan(&records, &groups, &plan, &params),
            Err(PlanConsistencyError::DuplicateMembership(RowId(1)))
        );
    }

    #[test]
    fn test_over_capacity_group_is_detected() {
        let params = GroupingParams::new(24, 3).unwrap();
        let records = vec![
            record(1, ts(1, 0)),
            record(2, ts(1, 1)),
            record(3, ts(1, 2)),
            record(4, ts(1, 3)),
        ];
        // Force a group past capacity by grouping under a looser cap.
        let loose = GroupingParams::new(24, 7).unwrap();
        let groups = group_records(records.clone(), &loose).unwrap();
        let plan = build_plan(&groups, "fp");

        assert_eq!(
            verify_plan(&records, &groups, &plan, &params),
            Err(PlanConsistencyError::CapacityExceeded {
                anchor: RowId(1),
                slots: 4,
                capacity: 3,
            })
        );
    }

    #[test]
    fn test_window_violation_is_detected() {
        let tight = GroupingParams::new(1, 7).unwrap();
        let loose = GroupingParams::new(24, 7).unwrap();
        let records = vec![record(1, ts(1, 0)), record(2, ts(1, 12))];
        let groups = group_records(records.clone(), &loose).unwrap();
        let plan = build_plan(&groups, "fp");

        assert_eq!(
            verify_plan(&records, &groups, &plan, &tight),
            Err(PlanConsistencyError::WindowExceeded {
                anchor: RowId(1),
                span_minutes: 720,
                window_minutes: 60,
            })
        );
    }

    #[test]
    fn test_tampered_updates_are_detected() {
        let (records, groups, mut plan, params) = fixture();
        plan.updates.push(UpdateOp {
            row_id: RowId(3),
            link: LinkKey(0),
        });

        assert!(matches!(
            verify_plan(&records, &groups, &plan, &params),
            Err(PlanConsistencyError::UpdateMismatch(_))
        ));
    }

    #[test]
    fn test_missing_insert_is_detected() {
        let (records, groups, mut plan, params) = fixture();
        plan.inserts.clear();

        assert_eq!(
            verify_plan(&records, &groups, &plan, &params),
            Err(PlanConsistencyError::InsertCountMismatch {
                expected: 1,
                actual: 0,
            })
        );
    }
}
