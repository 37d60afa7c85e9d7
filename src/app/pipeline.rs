//! Shared dashboard pipeline used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! request -> BLS fetch -> build table -> rename -> derive
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).

use crate::analysis::{DerivedMetrics, derive};
use crate::data::{BlsClient, SeriesSource};
use crate::domain::{DashboardConfig, Indicator};
use crate::error::AppError;
use crate::table::{ObservationTable, SkipReason, SkippedPoint, build_table_with_report, rename};

/// All computed outputs of a single run.
#[derive(Debug, Clone)]
pub struct DashboardRun {
    /// Columns keyed by indicator label (unknown series keep their id).
    pub table: ObservationTable,
    pub derived: DerivedMetrics,
    pub skipped: Vec<SkippedPoint>,
    pub api_status: String,
}

/// Fetch from the BLS API and run the full pipeline.
pub fn run(config: &DashboardConfig) -> Result<DashboardRun, AppError> {
    let client = BlsClient::from_config(config)?;
    run_with_source(&client, config)
}

/// Run the pipeline against any [`SeriesSource`].
pub fn run_with_source(source: &dyn SeriesSource, config: &DashboardConfig) -> Result<DashboardRun, AppError> {
    // 1) Validate the request and fetch.
    let request = config.series_request()?;
    let batch = source.fetch(&request)?;

    // 2) Reshape into one table.
    let (table, skipped) = build_table_with_report(&batch);
    if config.strict_periods {
        if let Some(bad) = skipped.iter().find(|s| s.reason == SkipReason::NonMonthlyPeriod) {
            return Err(AppError::new(
                4,
                format!(
                    "Series {} has non-monthly period code '{}' ({}); rerun without --strict-periods to skip it.",
                    bad.series_id, bad.period, bad.year
                ),
            ));
        }
    }
    if table.is_empty() {
        return Err(AppError::new(4, "BLS response contained no usable monthly observations."));
    }

    // 3) Relabel and derive.
    let table = rename(&table, &Indicator::rename_mapping());
    let derived = derive(&table, &config.level_column, config.display_scale)?;

    tracing::info!(
        rows = table.len(),
        columns = table.columns().len(),
        skipped = skipped.len(),
        latest = ?table.latest_date(),
        "dashboard data ready"
    );

    Ok(DashboardRun {
        table,
        derived,
        skipped,
        api_status: batch.status,
    })
}
