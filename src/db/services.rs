//! High-level consolidation service.
//!
//! Repository-agnostic orchestration of a full run: fetch one snapshot, run
//! the pipeline, apply the plan. This is the layer that logs - the pipeline
//! and the algorithms below it stay silent.

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::algorithms::grouping::GroupingParams;
use crate::db::repository::{ApplyStats, FlightRowStore};
use crate::processing::pipeline::{ConsolidationPipeline, PipelineError, RunReport};

/// Outcome of one full consolidation run against a store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub report: RunReport,
    /// `None` when the plan was empty and nothing touched the store.
    pub apply: Option<ApplyStats>,
}

/// Runs one consolidation pass against a row store.
///
/// Fetches a snapshot, derives and validates the operation plan, and applies
/// it - unless the plan is empty, in which case the store is left alone.
/// Per-row extraction exclusions are logged as warnings and reported in the
/// summary counts; they never abort the run.
///
/// # Returns
/// * `Ok(RunSummary)` - counts of the pass and, if applied, of the mutation
/// * `Err(PipelineError)` - the run failed before or during apply; the
///   store's apply contract guarantees no partial mutation
pub fn consolidate_table(
    repo: &dyn FlightRowStore,
    params: &GroupingParams,
) -> Result<RunSummary, PipelineError> {
    let pipeline = ConsolidationPipeline::new(*params)?;

    let snapshot = repo.fetch_snapshot()?;
    info!(
        "fetched snapshot: {} rows, window {}h, capacity {}",
        snapshot.height(),
        params.window_hours,
        params.max_entries
    );

    let outcome = pipeline.process(&snapshot)?;
    for exclusion in &outcome.exclusions {
        warn!("excluded from grouping: {}", exclusion);
    }
    let grouped = outcome.report.rows_processed
        - outcome.report.rows_excluded
        - outcome.report.superseded_skipped;
    info!(
        "grouped {} rows into {} groups ({} singleton)",
        grouped, outcome.report.groups_formed, outcome.report.singleton_groups
    );

    if outcome.plan.is_empty() {
        info!("table already consolidated, no operations to apply");
        return Ok(RunSummary {
            report: outcome.report,
            apply: None,
        });
    }

    let stats = repo.apply_plan(&outcome.plan)?;
    info!(
        "applied plan: {} consolidated rows inserted, {} originals superseded",
        stats.rows_inserted, stats.rows_updated
    );

    Ok(RunSummary {
        report: outcome.report,
        apply: Some(stats),
    })
}
