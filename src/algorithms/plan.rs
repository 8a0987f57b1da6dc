//! Operation plan construction.
//!
//! Turns a grouping into the exact set of insert and update operations the
//! persistence layer must apply. The builder only constructs the plan -
//! applying it against storage is the row store's responsibility.

use serde::{Deserialize, Serialize};

use crate::core::domain::{BookingDetails, FlightGroup, FlightLeg, RowId};

/// Placeholder link between an update and the insert that absorbs its row.
///
/// The builder does not know the row ids the store will assign; it emits the
/// insert's ordinal within the plan instead, and the store resolves it to
/// the real id at apply time.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct LinkKey(pub usize);

/// Insert request for one consolidated row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsertOp {
    /// Ordinal of this insert within the plan; update operations reference it.
    pub link: LinkKey,
    /// Booking details inherited from the group's anchor member.
    pub booking: BookingDetails,
    /// Merged flight slots in ascending departure order, one per member leg.
    pub legs: Vec<FlightLeg>,
}

/// Update request marking an original row as superseded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateOp {
    /// The absorbed original row.
    pub row_id: RowId,
    /// The insert whose assigned row id this row will be linked to.
    pub link: LinkKey,
}

/// The persisted outcome of one grouping pass.
///
/// Constructed fresh per run from one table snapshot, never mutated after
/// being handed to the persistence layer, and consumed exactly once. The
/// fingerprint identifies the snapshot the plan was derived from; a store
/// must refuse to apply the plan against a drifted table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationPlan {
    pub snapshot_fingerprint: String,
    pub inserts: Vec<InsertOp>,
    pub updates: Vec<UpdateOp>,
}

impl OperationPlan {
    /// `true` when the pass requires no table changes at all.
    pub fn is_empty(&self) -> bool {
        self.inserts.is_empty() && self.updates.is_empty()
    }
}

/// Derives the operation plan for a grouping.
///
/// * A group of size 1 contributes nothing - the original row stands
///   unchanged. This is load-bearing: rows that did not need grouping must
///   never be re-inserted or touched.
/// * A group of size > 1 contributes one [`InsertOp`] carrying the anchor
///   member's booking details and the concatenation of all members' legs in
///   ascending departure order, plus one [`UpdateOp`] per member in the
///   group's ascending-time order.
///
/// Operations preserve the input groups' relative order.
pub fn build_plan(groups: &[FlightGroup], snapshot_fingerprint: &str) -> OperationPlan {
    let mut inserts = Vec::new();
    let mut updates = Vec::new();

    for group in groups.iter().filter(|g| !g.is_singleton()) {
        let link = LinkKey(inserts.len());

        let mut legs: Vec<FlightLeg> = group
            .records()
            .iter()
            .flat_map(|record| record.legs.iter().cloned())
            .collect();
        legs.sort_by(|a, b| a.departure.cmp(&b.departure));

        inserts.push(InsertOp {
            link,
            booking: group.anchor().booking.clone(),
            legs,
        });

        for record in group.records() {
            updates.push(UpdateOp {
                row_id: record.source_row_id,
                link,
            });
        }
    }

    OperationPlan {
        snapshot_fingerprint: snapshot_fingerprint.to_string(),
        inserts,
        updates,
    }
}
