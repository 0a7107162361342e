//! Duration calculator.

use super::filter::FilteredRecord;
use super::{Rejection, ValidRecord, YearMonth};
use chrono::NaiveDateTime;

const MICROS_PER_MINUTE: f64 = 60_000_000.0;

/// Minutes from alarm to clearance, or `None` when the value is not a
/// positive, finite number.
pub fn recovery_minutes(alarm_at: NaiveDateTime, cleared_at: NaiveDateTime) -> Option<f64> {
    let micros = cleared_at.signed_duration_since(alarm_at).num_microseconds()?;
    let minutes = micros as f64 / MICROS_PER_MINUTE;
    (minutes.is_finite() && minutes > 0.0).then_some(minutes)
}

/// Attach the recovery time and calendar keys to a filtered row.
pub fn derive(filtered: FilteredRecord) -> Result<ValidRecord, Rejection> {
    let FilteredRecord { alarm_at, cleared_at } = filtered;
    let recovery_minutes =
        recovery_minutes(alarm_at, cleared_at).ok_or(Rejection::NonPositiveDuration)?;
    let day = alarm_at.date();

    Ok(ValidRecord {
        alarm_at,
        cleared_at,
        recovery_minutes,
        day,
        month: YearMonth::of(day),
    })
}
