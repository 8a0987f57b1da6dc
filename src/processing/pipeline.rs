use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::algorithms::grouping::{group_records, ConfigurationError, GroupingParams};
use crate::algorithms::plan::{build_plan, OperationPlan};
use crate::db::checksum::snapshot_fingerprint;
use crate::db::repository::RepositoryError;
use crate::parsing::row_extractor::{extract_records, ExtractionError};
use crate::processing::validator::{verify_plan, PlanConsistencyError};

/// Counters for one consolidation run, exposed for the caller to log.
///
/// The pipeline itself performs no logging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    /// Rows in the fetched snapshot.
    pub rows_processed: usize,
    /// Rows excluded on parse failure.
    pub rows_excluded: usize,
    /// Rows skipped because a previous run already superseded them.
    pub superseded_skipped: usize,
    /// Placeholder flight slots discarded during extraction.
    pub legs_discarded: usize,
    /// Groups formed, including singletons.
    pub groups_formed: usize,
    /// Groups of size 1 (no operations emitted for these).
    pub singleton_groups: usize,
    /// Insert operations in the emitted plan.
    pub inserts_emitted: usize,
    /// Update operations in the emitted plan.
    pub updates_emitted: usize,
    /// Fingerprint of the snapshot this run was derived from.
    pub snapshot_fingerprint: String,
}

/// Everything one pass produces: the validated plan, the exclusion report,
/// and the counters.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub plan: OperationPlan,
    pub report: RunReport,
    pub exclusions: Vec<ExtractionError>,
}

/// Failure of a consolidation run. A run either completes with a validated
/// plan or fails before producing one - partial plans are never emitted.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Consistency(#[from] PlanConsistencyError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Snapshot(#[from] anyhow::Error),
}

/// The single-pass consolidation pipeline: extract → group → plan → verify.
///
/// Synchronous and single-threaded by design; one instance processes one
/// snapshot at a time and holds no state between runs beyond its parameters.
#[derive(Debug, Clone)]
pub struct ConsolidationPipeline {
    params: GroupingParams,
}

impl ConsolidationPipeline {
    /// Builds a pipeline, rejecting invalid parameters before any row is
    /// processed.
    pub fn new(params: GroupingParams) -> Result<Self, ConfigurationError> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &GroupingParams {
        &self.params
    }

    /// Runs one pass over a table snapshot.
    ///
    /// # Returns
    /// * `Ok(RunOutcome)` - a validated plan plus counters and exclusions
    /// * `Err(PipelineError)` - nothing was (or may be) applied
    pub fn process(&self, snapshot: &DataFrame) -> Result<RunOutcome, PipelineError> {
        let fingerprint = snapshot_fingerprint(snapshot);

        let extraction = extract_records(snapshot)?;
        let records = extraction.records;

        let groups = group_records(records.clone(), &self.params)?;
        let plan = build_plan(&groups, &fingerprint);
        verify_plan(&records, &groups, &plan, &self.params)?;

        let singleton_groups = groups.iter().filter(|g| g.is_singleton()).count();
        let report = RunReport {
            rows_processed: snapshot.height(),
            rows_excluded: extraction.exclusions.len(),
            superseded_skipped: extraction.superseded_skipped,
            legs_discarded: extraction.legs_discarded,
            groups_formed: groups.len(),
            singleton_groups,
            inserts_emitted: plan.inserts.len(),
            updates_emitted: plan.updates.len(),
            snapshot_fingerprint: fingerprint,
        };

        Ok(RunOutcome {
            plan,
            report,
            exclusions: extraction.exclusions,
        })
    }
}
