//! Summary statistics and calendar aggregates over valid records.

use super::{ValidRecord, YearMonth};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

/// Global recovery-time statistics. The float fields are `None` when there
/// are no valid records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SummaryStats {
    pub count: usize,
    pub mean_minutes: Option<f64>,
    pub min_minutes: Option<f64>,
    pub max_minutes: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DayCount {
    pub day: NaiveDate,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonthCount {
    pub month: YearMonth,
    pub count: usize,
}

pub fn summarize(records: &[ValidRecord]) -> SummaryStats {
    if records.is_empty() {
        return SummaryStats::default();
    }

    let count = records.len();
    let mut sum = 0.0;
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for r in records {
        sum += r.recovery_minutes;
        min = min.min(r.recovery_minutes);
        max = max.max(r.recovery_minutes);
    }

    SummaryStats {
        count,
        mean_minutes: Some(sum / count as f64),
        min_minutes: Some(min),
        max_minutes: Some(max),
    }
}

/// Records per alarm day, ascending by day.
pub fn daily(records: &[ValidRecord]) -> Vec<DayCount> {
    let mut by_day: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for r in records {
        *by_day.entry(r.day).or_default() += 1;
    }

    by_day
        .into_iter()
        .map(|(day, count)| DayCount { day, count })
        .collect()
}

/// Records per alarm month, largest share first; ties in calendar order.
pub fn monthly(records: &[ValidRecord]) -> Vec<MonthCount> {
    let mut by_month: BTreeMap<YearMonth, usize> = BTreeMap::new();
    for r in records {
        *by_month.entry(r.month).or_default() += 1;
    }

    let mut months: Vec<MonthCount> = by_month
        .into_iter()
        .map(|(month, count)| MonthCount { month, count })
        .collect();
    // stable: equal counts keep the BTreeMap's calendar order
    months.sort_by(|a, b| b.count.cmp(&a.count));
    months
}
