//! Cumulative latency buckets.

use super::ValidRecord;
use serde::Serialize;

pub const UP_TO_5_MINUTES: f64 = 5.0;
pub const UP_TO_10_MINUTES: f64 = 10.0;
pub const UP_TO_15_MINUTES: f64 = 15.0;

/// Counts of records recovered within each threshold. The buckets overlap:
/// a 3-minute record is counted in all three.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BucketCounts {
    pub up_to_5: usize,
    pub up_to_10: usize,
    pub up_to_15: usize,
}

pub fn classify(records: &[ValidRecord]) -> BucketCounts {
    let within = |threshold: f64| {
        records
            .iter()
            .filter(|r| r.recovery_minutes <= threshold)
            .count()
    };

    BucketCounts {
        up_to_5: within(UP_TO_5_MINUTES),
        up_to_10: within(UP_TO_10_MINUTES),
        up_to_15: within(UP_TO_15_MINUTES),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::YearMonth;
    use chrono::NaiveDate;

    fn record(minutes: f64) -> ValidRecord {
        let day = NaiveDate::from_ymd_opt(2024, 9, 10).unwrap();
        let alarm_at = day.and_hms_opt(8, 0, 0).unwrap();
        ValidRecord {
            alarm_at,
            cleared_at: alarm_at + chrono::Duration::seconds((minutes * 60.0) as i64),
            recovery_minutes: minutes,
            day,
            month: YearMonth::of(day),
        }
    }

    #[test]
    fn test_empty() {
        assert_eq!(classify(&[]), BucketCounts::default());
    }

    #[test]
    fn test_thresholds_are_inclusive_and_cumulative() {
        let records: Vec<_> = [3.0, 5.0, 5.01, 10.0, 12.5, 15.0, 15.5, 240.0]
            .into_iter()
            .map(record)
            .collect();

        let counts = classify(&records);
        assert_eq!(counts.up_to_5, 2);
        assert_eq!(counts.up_to_10, 4);
        assert_eq!(counts.up_to_15, 6);
    }
}
