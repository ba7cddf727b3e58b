use askama::Template;

use crate::constants::{CHART_TITLE, FILTER_HEADER, PAGE_TITLE};
use crate::error::{Result, TrackerError};
use crate::presentation::view::{CategoryOption, DashboardView, MetricTile};

#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub title: &'static str,
    pub filter_header: &'static str,
    pub chart_title: &'static str,
    pub source: String,
    pub has_error: bool,
    pub error_message: String,
    pub categories: Vec<CategoryOption>,
    pub metric_tiles: Vec<MetricTile>,
    pub figure_json: String,
    pub unparseable: usize,
}

impl DashboardTemplate {
    pub fn from_view(view: &DashboardView, source: String) -> Result<Self> {
        Ok(Self {
            title: PAGE_TITLE,
            filter_header: FILTER_HEADER,
            chart_title: CHART_TITLE,
            source,
            has_error: false,
            error_message: String::new(),
            categories: view.categories.clone(),
            metric_tiles: view.metric_tiles.clone(),
            figure_json: serde_json::to_string(&view.figure)?,
            unparseable: view.unparseable_timestamps,
        })
    }

    /// A halted run: only the error banner is shown, no metrics or chart
    pub fn from_error(err: &TrackerError, source: String) -> Self {
        Self {
            title: PAGE_TITLE,
            filter_header: FILTER_HEADER,
            chart_title: CHART_TITLE,
            source,
            has_error: true,
            error_message: err.to_string(),
            categories: Vec::new(),
            metric_tiles: Vec::new(),
            figure_json: "null".to_string(),
            unparseable: 0,
        }
    }

    pub fn render_page(&self) -> Result<String> {
        Ok(self.render()?)
    }
}
