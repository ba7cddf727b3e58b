use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::pipeline::processing::normalize::NormalizedRecord;

/// Record count for one calendar date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DailyVolume {
    pub date: NaiveDate,
    pub volume: u64,
}

/// Headline numbers derived from a daily volume series
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Metrics {
    pub total_volume: u64,
    pub active_days: usize,
    /// `total_volume / active_days`, or 0 when there are no active days
    pub avg_daily: f64,
}

impl Metrics {
    pub fn from_daily(daily: &[DailyVolume]) -> Self {
        let total_volume: u64 = daily.iter().map(|d| d.volume).sum();
        let active_days = daily.len();
        let avg_daily = if active_days > 0 {
            total_volume as f64 / active_days as f64
        } else {
            0.0
        };
        Self {
            total_volume,
            active_days,
            avg_daily,
        }
    }

    /// Average formatted with one fractional digit
    pub fn avg_daily_display(&self) -> String {
        format!("{:.1}", self.avg_daily)
    }
}

/// Daily series plus the metrics computed from it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Aggregation {
    pub daily_volume: Vec<DailyVolume>,
    pub metrics: Metrics,
}

/// Count records per date, ascending; undated records are skipped
pub fn daily_volume<'a, I>(records: I) -> Vec<DailyVolume>
where
    I: IntoIterator<Item = &'a NormalizedRecord>,
{
    let mut counts: BTreeMap<NaiveDate, u64> = BTreeMap::new();
    for date in records.into_iter().filter_map(|r| r.date) {
        *counts.entry(date).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .map(|(date, volume)| DailyVolume { date, volume })
        .collect()
}

pub fn aggregate<'a, I>(records: I) -> Aggregation
where
    I: IntoIterator<Item = &'a NormalizedRecord>,
{
    let daily_volume = daily_volume(records);
    let metrics = Metrics::from_daily(&daily_volume);
    Aggregation {
        daily_volume,
        metrics,
    }
}
