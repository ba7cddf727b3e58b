//! Metrics for the sales volume tracker
//!
//! Recording goes through the `metrics` facade and is a no-op until a
//! recorder is installed with [`init`]. The `serve` command installs a
//! Prometheus recorder and exposes it on `/metrics`.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::fmt;
use tracing::info;

use crate::error::{Result, TrackerError};

/// How a metric is recorded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricType {
    Counter,
    Histogram,
    Gauge,
}

/// Enum representing all metric names used in the system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    // Source metrics
    SourceFetchSuccess,
    SourceFetchError,
    SourceFetchDuration,
    SourcePayloadBytes,

    // Schema metrics
    SchemaValidationErrors,

    // Normalize metrics
    NormalizeRecordsProcessed,
    NormalizeUnparseableTimestamps,

    // Pipeline metrics
    PipelineRunsCompleted,
    PipelineTotalVolume,
    PipelineActiveDays,
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl MetricName {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::SourceFetchSuccess => "tracker_source_fetch_success_total",
            MetricName::SourceFetchError => "tracker_source_fetch_error_total",
            MetricName::SourceFetchDuration => "tracker_source_fetch_duration_seconds",
            MetricName::SourcePayloadBytes => "tracker_source_payload_bytes",

            MetricName::SchemaValidationErrors => "tracker_schema_validation_errors_total",

            MetricName::NormalizeRecordsProcessed => "tracker_normalize_records_processed_total",
            MetricName::NormalizeUnparseableTimestamps => {
                "tracker_normalize_unparseable_timestamps_total"
            }

            MetricName::PipelineRunsCompleted => "tracker_pipeline_runs_completed_total",
            MetricName::PipelineTotalVolume => "tracker_pipeline_total_volume",
            MetricName::PipelineActiveDays => "tracker_pipeline_active_days",
        }
    }

    /// Get all metric names as an iterator
    pub fn all_metrics() -> impl Iterator<Item = MetricName> {
        use MetricName::*;
        [
            SourceFetchSuccess,
            SourceFetchError,
            SourceFetchDuration,
            SourcePayloadBytes,
            SchemaValidationErrors,
            NormalizeRecordsProcessed,
            NormalizeUnparseableTimestamps,
            PipelineRunsCompleted,
            PipelineTotalVolume,
            PipelineActiveDays,
        ]
        .into_iter()
    }

    pub fn metric_type(&self) -> MetricType {
        match self {
            MetricName::SourceFetchDuration | MetricName::SourcePayloadBytes => MetricType::Histogram,
            MetricName::PipelineTotalVolume | MetricName::PipelineActiveDays => MetricType::Gauge,
            _ => MetricType::Counter,
        }
    }

    /// Returns (phase, description, unit)
    pub fn metadata(&self) -> (&'static str, &'static str, Option<&'static str>) {
        match self {
            MetricName::SourceFetchSuccess => ("source", "Successful sheet fetches", None),
            MetricName::SourceFetchError => ("source", "Failed sheet fetches", None),
            MetricName::SourceFetchDuration => ("source", "Sheet fetch duration", Some("s")),
            MetricName::SourcePayloadBytes => ("source", "CSV payload size", Some("bytes")),
            MetricName::SchemaValidationErrors => {
                ("schema", "Runs halted by missing required columns", None)
            }
            MetricName::NormalizeRecordsProcessed => ("normalize", "Rows normalized", None),
            MetricName::NormalizeUnparseableTimestamps => {
                ("normalize", "Rows whose timestamp did not parse", None)
            }
            MetricName::PipelineRunsCompleted => ("pipeline", "Completed pipeline runs", None),
            MetricName::PipelineTotalVolume => ("pipeline", "Total volume of the last run", None),
            MetricName::PipelineActiveDays => ("pipeline", "Active days of the last run", None),
        }
    }
}

/// Install the Prometheus recorder and return a handle for rendering
pub fn init() -> Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| TrackerError::Config(format!("Failed to install Prometheus recorder: {}", e)))?;

    for name in MetricName::all_metrics() {
        let (phase, description, _) = name.metadata();
        let description = format!("[{}] {}", phase, description);
        match name.metric_type() {
            MetricType::Counter => ::metrics::describe_counter!(name.as_str(), description),
            MetricType::Histogram => ::metrics::describe_histogram!(name.as_str(), description),
            MetricType::Gauge => ::metrics::describe_gauge!(name.as_str(), description),
        }
    }

    info!("Metrics system initialized");
    Ok(handle)
}

// ============================================================================
// Source Metrics
// ============================================================================

pub mod source {
    use super::MetricName;

    pub fn fetch_success() {
        ::metrics::counter!(MetricName::SourceFetchSuccess.as_str()).increment(1);
    }

    pub fn fetch_error() {
        ::metrics::counter!(MetricName::SourceFetchError.as_str()).increment(1);
    }

    pub fn fetch_duration(secs: f64) {
        ::metrics::histogram!(MetricName::SourceFetchDuration.as_str()).record(secs);
    }

    pub fn payload_bytes(bytes: usize) {
        ::metrics::histogram!(MetricName::SourcePayloadBytes.as_str()).record(bytes as f64);
    }
}

// ============================================================================
// Schema Metrics
// ============================================================================

pub mod schema {
    use super::MetricName;

    pub fn validation_failed() {
        ::metrics::counter!(MetricName::SchemaValidationErrors.as_str()).increment(1);
    }
}

// ============================================================================
// Normalize Metrics
// ============================================================================

pub mod normalize {
    use super::MetricName;

    pub fn records_processed(count: usize) {
        ::metrics::counter!(MetricName::NormalizeRecordsProcessed.as_str()).increment(count as u64);
    }

    pub fn unparseable_timestamps(count: usize) {
        ::metrics::counter!(MetricName::NormalizeUnparseableTimestamps.as_str())
            .increment(count as u64);
    }
}

// ============================================================================
// Pipeline Metrics
// ============================================================================

pub mod pipeline {
    use super::MetricName;
    use crate::pipeline::processing::Metrics;

    pub fn run_completed(metrics: &Metrics) {
        ::metrics::counter!(MetricName::PipelineRunsCompleted.as_str()).increment(1);
        ::metrics::gauge!(MetricName::PipelineTotalVolume.as_str()).set(metrics.total_volume as f64);
        ::metrics::gauge!(MetricName::PipelineActiveDays.as_str()).set(metrics.active_days as f64);
    }
}
