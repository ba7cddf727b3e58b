use serde::Serialize;
use serde_json::Value;
use std::fmt::Write;

use crate::constants::{
    ACTIVE_DAYS_LABEL, AVG_DAILY_LABEL, CHART_TITLE, FILTER_HEADER, PAGE_TITLE, TOTAL_VOLUME_LABEL,
};
use crate::pipeline::processing::{DailyVolume, Metrics};
use crate::pipeline::PipelineOutput;
use crate::presentation::chart;

/// One entry of the campaign/provider filter
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryOption {
    pub name: String,
    pub selected: bool,
}

/// A labelled headline number, already formatted for display
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricTile {
    pub label: &'static str,
    pub value: String,
}

/// Everything a page, the JSON API or the CLI shows for one run
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub title: &'static str,
    pub categories: Vec<CategoryOption>,
    /// Picked categories; empty means every row is counted
    pub selected: Vec<String>,
    pub metrics: Metrics,
    pub metric_tiles: Vec<MetricTile>,
    pub daily_volume: Vec<DailyVolume>,
    pub unparseable_timestamps: usize,
    pub figure: Value,
}

impl DashboardView {
    pub fn from_output(output: &PipelineOutput) -> Self {
        let selection = &output.selection;

        let categories: Vec<CategoryOption> = output
            .categories
            .iter()
            .map(|name| CategoryOption {
                name: name.clone(),
                selected: selection.contains(name),
            })
            .collect();
        let selected = selection.iter().map(str::to_string).collect();

        Self {
            title: PAGE_TITLE,
            categories,
            selected,
            metrics: output.metrics,
            metric_tiles: metric_tiles(&output.metrics),
            daily_volume: output.daily_volume.clone(),
            unparseable_timestamps: output.unparseable_timestamps,
            figure: chart::daily_volume_figure(&output.daily_volume),
        }
    }

    /// Plain-text rendering for the `report` command
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.title);
        let _ = writeln!(out);
        for tile in &self.metric_tiles {
            let _ = writeln!(out, "{:<20} {}", tile.label, tile.value);
        }

        let _ = writeln!(out);
        let _ = writeln!(out, "{}", CHART_TITLE);
        if self.daily_volume.is_empty() {
            let _ = writeln!(out, "  (no dated records)");
        }
        for day in &self.daily_volume {
            let _ = writeln!(out, "  {}  {}", day.date.format("%Y-%m-%d"), day.volume);
        }

        let _ = writeln!(out);
        let names: Vec<&str> = self.categories.iter().map(|c| c.name.as_str()).collect();
        let _ = writeln!(out, "{}: {}", FILTER_HEADER, names.join(", "));
        if self.selected.is_empty() {
            let _ = writeln!(out, "Selected: (none, all rows counted)");
        } else {
            let _ = writeln!(out, "Selected: {}", self.selected.join(", "));
        }
        if self.unparseable_timestamps > 0 {
            let _ = writeln!(
                out,
                "Skipped {} row(s) with unreadable timestamps",
                self.unparseable_timestamps
            );
        }
        out
    }
}

pub fn metric_tiles(metrics: &Metrics) -> Vec<MetricTile> {
    vec![
        MetricTile {
            label: TOTAL_VOLUME_LABEL,
            value: metrics.total_volume.to_string(),
        },
        MetricTile {
            label: ACTIVE_DAYS_LABEL,
            value: metrics.active_days.to_string(),
        },
        MetricTile {
            label: AVG_DAILY_LABEL,
            value: metrics.avg_daily_display(),
        },
    ]
}
