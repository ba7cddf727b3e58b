//! The dashboard pipeline: CSV payload in, daily volume and metrics out.
//!
//! Every call recomputes everything from the payload it is given; there is
//! no state carried between runs.

pub mod ingestion;
pub mod processing;

use serde::Serialize;
use tracing::{debug, info, info_span};

use crate::error::Result;
use crate::observability::metrics;
use crate::pipeline::ingestion::RawTable;
use crate::pipeline::processing::{
    aggregate, filter, normalize, schema, CategorySelection, DailyVolume, Metrics,
};

/// Everything the presentation layer needs from one run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineOutput {
    /// Trimmed column names of the source
    pub columns: Vec<String>,
    /// Data rows read, before filtering
    pub total_rows: usize,
    /// Rows whose timestamp did not parse (excluded from the series)
    pub unparseable_timestamps: usize,
    /// Selectable categories in first-seen order
    pub categories: Vec<String>,
    pub selection: CategorySelection,
    pub daily_volume: Vec<DailyVolume>,
    pub metrics: Metrics,
}

/// Run the whole pipeline over a raw CSV payload
pub fn run(payload: &str, selection: &CategorySelection) -> Result<PipelineOutput> {
    let table = ingestion::read_table(payload)?;
    run_table(table, selection)
}

/// Run the pipeline for a first view, with every available category picked.
///
/// Rows without a category are left out, the same as picking every listed
/// category by hand. When no row has a category the selection stays empty
/// and nothing is filtered.
pub fn run_default(payload: &str) -> Result<PipelineOutput> {
    let table = ingestion::read_table(payload)?;
    execute(table, None)
}

/// Run validation, normalization, filtering and aggregation over a read table
pub fn run_table(table: RawTable, selection: &CategorySelection) -> Result<PipelineOutput> {
    execute(table, Some(selection))
}

fn execute(table: RawTable, selection: Option<&CategorySelection>) -> Result<PipelineOutput> {
    let span = info_span!("pipeline_run", default_selection = selection.is_none());
    let _enter = span.enter();

    let validated = schema::validate(table).map_err(|e| {
        metrics::schema::validation_failed();
        e
    })?;
    let total_rows = validated.records.len();

    let outcome = normalize::normalize(validated.records);
    metrics::normalize::records_processed(total_rows);
    metrics::normalize::unparseable_timestamps(outcome.unparseable);

    let categories = filter::available_categories(&outcome.records);
    let selection = match selection {
        Some(picked) => picked.clone(),
        None => categories.iter().cloned().collect(),
    };
    let kept = filter::apply(&outcome.records, &selection);
    debug!(kept = kept.len(), of = total_rows, "Applied category filter");

    let aggregation = aggregate::aggregate(kept);
    metrics::pipeline::run_completed(&aggregation.metrics);

    info!(
        total_volume = aggregation.metrics.total_volume,
        active_days = aggregation.metrics.active_days,
        avg_daily = %aggregation.metrics.avg_daily_display(),
        "Pipeline run complete"
    );

    Ok(PipelineOutput {
        columns: validated.columns,
        total_rows,
        unparseable_timestamps: outcome.unparseable,
        categories,
        selection,
        daily_volume: aggregation.daily_volume,
        metrics: aggregation.metrics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TrackerError;

    const PAYLOAD: &str = "Timestamp,Select Campaign/Provider\n\
                           2024-01-02 09:00,X\n\
                           2024-01-01 10:00,X\n\
                           2024-01-01 11:00,Y\n\
                           garbage,\n";

    #[test]
    fn reports_universe_rows_and_unparseable_counts() {
        let output = run(PAYLOAD, &CategorySelection::all()).unwrap();
        assert_eq!(output.total_rows, 4);
        assert_eq!(output.unparseable_timestamps, 1);
        // First-seen order after the date sort
        assert_eq!(output.categories, vec!["X", "Y"]);
        assert_eq!(output.metrics.total_volume, 3);
    }

    #[test]
    fn default_run_picks_every_listed_category() {
        let output = run_default(PAYLOAD).unwrap();
        let picked: Vec<&str> = output.selection.iter().collect();
        assert_eq!(picked, vec!["X", "Y"]);
        assert_eq!(output.metrics.total_volume, 3);

        let uncategorised = "Timestamp,Select Campaign/Provider\n\
                             2024-01-01 10:00,X\n\
                             2024-01-01 11:00,\n";
        let default = run_default(uncategorised).unwrap();
        let reapplied = run(uncategorised, &default.selection).unwrap();
        assert_eq!(default.metrics.total_volume, 1);
        assert_eq!(default.metrics, reapplied.metrics);
        assert_eq!(default.daily_volume, reapplied.daily_volume);
    }

    #[test]
    fn default_run_without_categories_filters_nothing() {
        let output = run_default("Timestamp,Select Campaign/Provider\n2024-01-01 10:00,\n").unwrap();
        assert!(output.selection.is_empty());
        assert_eq!(output.metrics.total_volume, 1);
    }

    #[test]
    fn fetch_level_parse_failure_halts() {
        let err = run("a,b\n1,2,3\n", &CategorySelection::all()).unwrap_err();
        assert!(matches!(err, TrackerError::Fetch(_)));
    }

    #[test]
    fn schema_failure_halts() {
        let err = run("Timestamp\n2024-01-01\n", &CategorySelection::all()).unwrap_err();
        assert!(matches!(err, TrackerError::Schema { .. }));
    }
}
