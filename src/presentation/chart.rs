//! Plotly figure for the daily volume series
//!
//! The figure is plain JSON so the page can hand it straight to
//! `Plotly.newPlot` and the CLI can write it to disk.

use serde_json::{json, Value};

use crate::pipeline::processing::DailyVolume;

pub const TRACE_NAME: &str = "Sales Volume";
pub const LINE_COLOR: &str = "#00CC96";
pub const RANGE_SELECTOR_BG: &str = "#2E2E2E";
// plotly.js has no named templates, so the dark theme is spelled out
pub const DARK_BACKGROUND: &str = "#111111";
pub const DARK_FONT: &str = "#f2f5fa";
pub const HEIGHT: u32 = 600;

/// Build the filled line+marker figure with range selector and slider
pub fn daily_volume_figure(daily: &[DailyVolume]) -> Value {
    let x: Vec<String> = daily.iter().map(|d| d.date.format("%Y-%m-%d").to_string()).collect();
    let y: Vec<u64> = daily.iter().map(|d| d.volume).collect();

    json!({
        "data": [{
            "type": "scatter",
            "x": x,
            "y": y,
            "mode": "lines+markers",
            "name": TRACE_NAME,
            "line": { "color": LINE_COLOR, "width": 3 },
            "fill": "tozeroy"
        }],
        "layout": {
            "xaxis": {
                "rangeselector": {
                    "buttons": range_buttons(),
                    "bgcolor": RANGE_SELECTOR_BG
                },
                "rangeslider": { "visible": true },
                "type": "date"
            },
            "yaxis": { "title": { "text": "Volume" } },
            "paper_bgcolor": DARK_BACKGROUND,
            "plot_bgcolor": DARK_BACKGROUND,
            "font": { "color": DARK_FONT },
            "height": HEIGHT
        }
    })
}

fn range_buttons() -> Value {
    json!([
        { "count": 7, "label": "1W", "step": "day", "stepmode": "backward" },
        { "count": 1, "label": "1M", "step": "month", "stepmode": "backward" },
        { "count": 3, "label": "3M", "step": "month", "stepmode": "backward" },
        { "step": "all", "label": "All Time" }
    ])
}
