use std::sync::Arc;
use tracing::{error, info};

use crate::app::ports::SheetSourcePort;
use crate::error::Result;
use crate::pipeline::{self, processing::CategorySelection, PipelineOutput};

/// Use case behind every dashboard view: fetch fresh data, then run the
/// whole pipeline for the given selection.
///
/// Nothing is cached between calls, so each invocation sees the sheet as it
/// is at that moment.
pub struct DashboardUseCase {
    source: Arc<dyn SheetSourcePort>,
}

impl DashboardUseCase {
    pub fn new(source: Arc<dyn SheetSourcePort>) -> Self {
        Self { source }
    }

    pub fn source_description(&self) -> String {
        self.source.describe()
    }

    pub async fn run(&self, selection: &CategorySelection) -> Result<PipelineOutput> {
        let payload = self.fetch_payload().await?;
        let output = pipeline::run(&payload, selection)?;
        self.log_refresh(&output);
        Ok(output)
    }

    /// First view of the dashboard: every available category is picked
    pub async fn run_default(&self) -> Result<PipelineOutput> {
        let payload = self.fetch_payload().await?;
        let output = pipeline::run_default(&payload)?;
        self.log_refresh(&output);
        Ok(output)
    }

    async fn fetch_payload(&self) -> Result<String> {
        self.source.fetch().await.map_err(|e| {
            error!(source = %self.source.describe(), "Fetch failed: {}", e);
            e
        })
    }

    fn log_refresh(&self, output: &PipelineOutput) {
        info!(
            rows = output.total_rows,
            categories = output.categories.len(),
            selected = output.selection.len(),
            "Dashboard data refreshed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TrackerError;
    use async_trait::async_trait;
    use tokio::sync::Mutex;

    struct MockSheetSource {
        payload: std::result::Result<String, String>,
        calls: Arc<Mutex<usize>>,
    }

    impl MockSheetSource {
        fn ok(payload: &str) -> Self {
            Self {
                payload: Ok(payload.to_string()),
                calls: Arc::new(Mutex::new(0)),
            }
        }

        fn failing(msg: &str) -> Self {
            Self {
                payload: Err(msg.to_string()),
                calls: Arc::new(Mutex::new(0)),
            }
        }
    }

    #[async_trait]
    impl SheetSourcePort for MockSheetSource {
        async fn fetch(&self) -> Result<String> {
            *self.calls.lock().await += 1;
            self.payload.clone().map_err(TrackerError::Fetch)
        }

        fn describe(&self) -> String {
            "mock".to_string()
        }
    }

    const PAYLOAD: &str = "Timestamp,Select Campaign/Provider\n\
                           2024-01-01 10:00,X\n\
                           2024-01-01 11:00,Y\n\
                           2024-01-02 09:00,X\n";

    #[tokio::test]
    async fn every_run_fetches_fresh_data() {
        let source = MockSheetSource::ok(PAYLOAD);
        let calls = source.calls.clone();
        let use_case = DashboardUseCase::new(Arc::new(source));

        let all = use_case.run(&CategorySelection::all()).await.unwrap();
        let only_x = use_case.run(&["X"].into_iter().collect()).await.unwrap();

        assert_eq!(*calls.lock().await, 2);
        assert_eq!(all.metrics.total_volume, 3);
        assert_eq!(only_x.metrics.total_volume, 2);
    }

    #[tokio::test]
    async fn default_run_matches_its_own_selection() {
        let payload = format!("{}2024-01-03 08:00,\n", PAYLOAD);
        let use_case = DashboardUseCase::new(Arc::new(MockSheetSource::ok(&payload)));

        let first = use_case.run_default().await.unwrap();
        let applied = use_case.run(&first.selection).await.unwrap();

        assert_eq!(first.metrics.total_volume, 3);
        assert_eq!(first.metrics, applied.metrics);
        assert_eq!(first.daily_volume, applied.daily_volume);
    }

    #[tokio::test]
    async fn fetch_failure_is_terminal() {
        let use_case = DashboardUseCase::new(Arc::new(MockSheetSource::failing("host unreachable")));
        let err = use_case.run(&CategorySelection::all()).await.unwrap_err();
        assert_eq!(err.to_string(), "Could not load data. Error: host unreachable");
    }
}
