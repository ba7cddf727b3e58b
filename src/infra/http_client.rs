use async_trait::async_trait;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::app::ports::SheetSourcePort;
use crate::config::SourceConfig;
use crate::error::{Result, TrackerError};
use crate::observability::metrics;

/// Fetches the sheet's CSV export over HTTP
pub struct ReqwestSheetSource {
    client: reqwest::Client,
    url: String,
}

impl ReqwestSheetSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TrackerError::Config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn from_config(config: &SourceConfig) -> Result<Self> {
        Self::new(config.export_url(), Duration::from_secs(config.timeout_seconds))
    }

    async fn fetch_once(&self) -> Result<String> {
        let resp = self.client.get(&self.url).send().await?;
        let resp = resp.error_for_status()?;
        Ok(resp.text().await?)
    }
}

#[async_trait]
impl SheetSourcePort for ReqwestSheetSource {
    async fn fetch(&self) -> Result<String> {
        let started = Instant::now();
        debug!(url = %self.url, "Fetching sheet export");

        match self.fetch_once().await {
            Ok(body) => {
                metrics::source::fetch_success();
                metrics::source::fetch_duration(started.elapsed().as_secs_f64());
                metrics::source::payload_bytes(body.len());
                info!(bytes = body.len(), "Fetched sheet export");
                Ok(body)
            }
            Err(e) => {
                metrics::source::fetch_error();
                Err(e)
            }
        }
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

/// Reads a CSV export from local disk; useful offline and in tests
pub struct FileSheetSource {
    path: PathBuf,
}

impl FileSheetSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl SheetSourcePort for FileSheetSource {
    async fn fetch(&self) -> Result<String> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(body) => {
                metrics::source::fetch_success();
                metrics::source::payload_bytes(body.len());
                Ok(body)
            }
            Err(e) => {
                metrics::source::fetch_error();
                Err(TrackerError::Fetch(format!(
                    "Failed to read '{}': {}",
                    self.path.display(),
                    e
                )))
            }
        }
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn file_source_reads_payload() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "Timestamp,Select Campaign/Provider\n2024-01-01,X\n").unwrap();

        let source = FileSheetSource::new(file.path());
        let body = source.fetch().await.unwrap();
        assert!(body.starts_with("Timestamp,"));
    }

    #[tokio::test]
    async fn missing_file_is_a_fetch_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = FileSheetSource::new(dir.path().join("nope.csv"));
        assert!(matches!(source.fetch().await, Err(TrackerError::Fetch(_))));
    }

    #[tokio::test]
    async fn unreachable_host_is_a_fetch_error() {
        // Port 9 on loopback (discard) is closed on test machines
        let source = ReqwestSheetSource::new("http://127.0.0.1:9/export.csv", Duration::from_secs(2)).unwrap();
        assert!(matches!(source.fetch().await, Err(TrackerError::Fetch(_))));
    }

    #[test]
    fn config_url_is_used() {
        let config = SourceConfig {
            url: Some("http://localhost/x.csv".to_string()),
            ..SourceConfig::default()
        };
        let source = ReqwestSheetSource::from_config(&config).unwrap();
        assert_eq!(source.describe(), "http://localhost/x.csv");
    }
}
