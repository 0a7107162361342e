//! Recovery-time pipeline: record filter, duration calculator, bucket
//! classifier and aggregator.
//!
//! The pipeline is a pure, one-shot transformation. Malformed rows are never
//! errors; they are dropped and counted in an [`ExclusionTally`].

pub mod aggregate;
pub mod buckets;
pub mod duration;
pub mod filter;

pub use aggregate::{DayCount, MonthCount, SummaryStats};
pub use buckets::BucketCounts;
pub use filter::ParseOptions;

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::Serialize;
use tracing::{debug, info};

/// A single cell as handed over by a data source.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Text(String),
    Number(f64),
    DateTime(NaiveDateTime),
}

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        RawValue::Text(s.to_string())
    }
}

impl From<String> for RawValue {
    fn from(s: String) -> Self {
        RawValue::Text(s)
    }
}

impl From<f64> for RawValue {
    fn from(n: f64) -> Self {
        RawValue::Number(n)
    }
}

impl From<NaiveDateTime> for RawValue {
    fn from(dt: NaiveDateTime) -> Self {
        RawValue::DateTime(dt)
    }
}

/// One row from the data source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord {
    /// Only numeric-parseability matters, never the value itself.
    pub identifier: Option<RawValue>,
    pub alarm_at: Option<RawValue>,
    pub cleared_at: Option<RawValue>,
    /// Columns the pipeline does not look at, in source order.
    pub extra: Vec<(String, RawValue)>,
}

impl RawRecord {
    pub fn new(
        identifier: impl Into<RawValue>,
        alarm_at: impl Into<RawValue>,
        cleared_at: impl Into<RawValue>,
    ) -> Self {
        Self {
            identifier: Some(identifier.into()),
            alarm_at: Some(alarm_at.into()),
            cleared_at: Some(cleared_at.into()),
            extra: Vec::new(),
        }
    }
}

/// Calendar year + month of an alarm, rendered as `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }
}

impl std::fmt::Display for YearMonth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl Serialize for YearMonth {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A record that passed filtering and has a positive, finite recovery time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidRecord {
    pub alarm_at: NaiveDateTime,
    pub cleared_at: NaiveDateTime,
    pub recovery_minutes: f64,
    pub day: NaiveDate,
    pub month: YearMonth,
}

/// Why a row was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    InvalidIdentifier,
    InvalidTimestamp,
    NonPositiveDuration,
}

/// Rows seen and rows dropped per reason.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ExclusionTally {
    pub total_rows: usize,
    pub invalid_identifier: usize,
    pub invalid_timestamp: usize,
    pub non_positive_duration: usize,
}

impl ExclusionTally {
    fn record(&mut self, reason: Rejection) {
        match reason {
            Rejection::InvalidIdentifier => self.invalid_identifier += 1,
            Rejection::InvalidTimestamp => self.invalid_timestamp += 1,
            Rejection::NonPositiveDuration => self.non_positive_duration += 1,
        }
    }

    pub fn excluded(&self) -> usize {
        self.invalid_identifier + self.invalid_timestamp + self.non_positive_duration
    }
}

/// Everything handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecoveryReport {
    pub summary: SummaryStats,
    pub buckets: BucketCounts,
    pub daily: Vec<DayCount>,
    pub monthly: Vec<MonthCount>,
    pub exclusions: ExclusionTally,
}

/// Filter rows and attach recovery durations, preserving input order.
pub fn validate(records: &[RawRecord], options: &ParseOptions) -> (Vec<ValidRecord>, ExclusionTally) {
    let mut tally = ExclusionTally {
        total_rows: records.len(),
        ..Default::default()
    };
    let mut valid = Vec::with_capacity(records.len());

    for (row, record) in records.iter().enumerate() {
        match filter::check(record, options).and_then(duration::derive) {
            Ok(v) => valid.push(v),
            Err(reason) => {
                debug!(row, ?reason, "row excluded");
                tally.record(reason);
            }
        }
    }

    (valid, tally)
}

/// Run the whole pipeline over one batch of rows.
pub fn run(records: &[RawRecord], options: &ParseOptions) -> RecoveryReport {
    let (valid, exclusions) = validate(records, options);

    let report = RecoveryReport {
        summary: aggregate::summarize(&valid),
        buckets: buckets::classify(&valid),
        daily: aggregate::daily(&valid),
        monthly: aggregate::monthly(&valid),
        exclusions,
    };

    info!(
        total = exclusions.total_rows,
        valid = report.summary.count,
        excluded = exclusions.excluded(),
        days = report.daily.len(),
        months = report.monthly.len(),
        "recovery pipeline complete"
    );

    report
}
