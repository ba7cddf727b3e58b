/// Column and source constants shared across the pipeline and the CLI

// Required columns (matched after header whitespace is trimmed)
pub const TIMESTAMP_FIELD: &str = "Timestamp";
pub const CATEGORY_FIELD: &str = "Select Campaign/Provider";

// Default sheet backing the dashboard
pub const DEFAULT_SHEET_ID: &str = "1PpjlhvOPNqBa27w_wNcnmr8PTeqW24SBkZMS0RZZJuM";
pub const DEFAULT_SHEET_NAME: &str = "Sheet1";

pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8501";

// Display labels
pub const PAGE_TITLE: &str = "Sales Volume Tracker";
pub const CHART_TITLE: &str = "Daily Sales Volume";
pub const FILTER_HEADER: &str = "Filter Options";
pub const TOTAL_VOLUME_LABEL: &str = "Total Sales Volume";
pub const ACTIVE_DAYS_LABEL: &str = "Active Sales Days";
pub const AVG_DAILY_LABEL: &str = "Avg. Sales / Day";

/// Build the CSV export URL for a Google Sheets document tab
pub fn sheet_export_url(sheet_id: &str, sheet_name: &str) -> String {
    format!(
        "https://docs.google.com/spreadsheets/d/{}/gviz/tq?tqx=out:csv&sheet={}",
        sheet_id, sheet_name
    )
}

/// Get the required column names in reporting order
pub fn required_fields() -> [&'static str; 2] {
    [TIMESTAMP_FIELD, CATEGORY_FIELD]
}
