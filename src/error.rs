use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrackerError {
    /// Remote retrieval or CSV parse of the raw payload failed.
    #[error("Could not load data. Error: {0}")]
    Fetch(String),

    /// Required columns are absent after header trimming.
    #[error("Column names not found. Missing: {missing:?}. Found columns: {found:?}")]
    Schema {
        missing: Vec<String>,
        found: Vec<String>,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Server error: {0}")]
    Server(String),

    #[error("Template rendering failed: {0}")]
    Template(#[from] askama::Error),
}

impl TrackerError {
    /// True for the two kinds that halt a pipeline run.
    pub fn is_fatal_run_error(&self) -> bool {
        matches!(self, TrackerError::Fetch(_) | TrackerError::Schema { .. })
    }
}

impl From<reqwest::Error> for TrackerError {
    fn from(err: reqwest::Error) -> Self {
        TrackerError::Fetch(err.to_string())
    }
}

impl From<csv::Error> for TrackerError {
    fn from(err: csv::Error) -> Self {
        TrackerError::Fetch(format!("malformed CSV payload: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, TrackerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_error_names_missing_and_found_columns() {
        let err = TrackerError::Schema {
            missing: vec!["Select Campaign/Provider".to_string()],
            found: vec!["Timestamp".to_string(), "Email".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("Select Campaign/Provider"));
        assert!(msg.contains("\"Timestamp\", \"Email\""));
        assert!(err.is_fatal_run_error());
    }

    #[test]
    fn config_errors_are_not_run_errors() {
        assert!(!TrackerError::Config("bad".into()).is_fatal_run_error());
    }
}
