//! Text rendering of a [`RecoveryReport`] for the terminal.

use crate::pipeline::RecoveryReport;
use std::fmt::{self, Write};

/// Group digits in threes with a dot (`12345` -> `12.345`).
pub fn format_count(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(c);
    }
    out
}

pub fn format_minutes(value: Option<f64>) -> String {
    match value {
        Some(m) => format!("{:.1} min", m),
        None => "n/a".to_string(),
    }
}

/// Format a report as a human-readable summary.
pub fn format_summary(report: &RecoveryReport) -> String {
    let mut out = String::new();
    // writing into a String cannot fail
    let _ = write_summary(&mut out, report);
    out
}

fn write_summary(out: &mut String, report: &RecoveryReport) -> fmt::Result {
    let s = &report.summary;
    let b = &report.buckets;

    writeln!(out, "Recovery summary")?;
    writeln!(out, "  Total records : {}", format_count(s.count))?;
    writeln!(out, "  Mean recovery : {}", format_minutes(s.mean_minutes))?;
    writeln!(out, "  Min recovery  : {}", format_minutes(s.min_minutes))?;
    writeln!(out, "  Max recovery  : {}", format_minutes(s.max_minutes))?;

    writeln!(out, "\nRecovered within")?;
    writeln!(out, "  <= 5 min  : {}", format_count(b.up_to_5))?;
    writeln!(out, "  <= 10 min : {}", format_count(b.up_to_10))?;
    writeln!(out, "  <= 15 min : {}", format_count(b.up_to_15))?;

    writeln!(out, "\nRecords per day")?;
    if report.daily.is_empty() {
        writeln!(out, "  (none)")?;
    }
    for d in &report.daily {
        writeln!(out, "  {} : {}", d.day, format_count(d.count))?;
    }

    writeln!(out, "\nRecords per month")?;
    if report.monthly.is_empty() {
        writeln!(out, "  (none)")?;
    }
    for m in &report.monthly {
        let share = if s.count == 0 {
            0.0
        } else {
            m.count as f64 / s.count as f64 * 100.0
        };
        writeln!(out, "  {} : {} ({:.1}%)", m.month, format_count(m.count), share)?;
    }

    let x = &report.exclusions;
    if x.excluded() > 0 {
        writeln!(
            out,
            "\nExcluded {} of {} rows (identifier: {}, timestamp: {}, duration: {})",
            format_count(x.excluded()),
            format_count(x.total_rows),
            x.invalid_identifier,
            x.invalid_timestamp,
            x.non_positive_duration,
        )?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{self, ParseOptions, RawRecord};

    #[test]
    fn test_format_count_groups() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1000), "1.000");
        assert_eq!(format_count(1234567), "1.234.567");
    }

    #[test]
    fn test_format_minutes() {
        assert_eq!(format_minutes(Some(3.0)), "3.0 min");
        assert_eq!(format_minutes(Some(12.345)), "12.3 min");
        assert_eq!(format_minutes(None), "n/a");
    }

    #[test]
    fn test_summary_with_data() {
        let records = vec![
            RawRecord::new("1", "2024-09-10 08:00", "2024-09-10 08:03"),
            RawRecord::new("2", "2024-10-01 08:00", "2024-10-01 08:20"),
            RawRecord::new("x", "2024-10-01 08:00", "2024-10-01 08:20"),
        ];
        let report = pipeline::run(&records, &ParseOptions::default());
        let summary = format_summary(&report);

        assert!(summary.contains("Total records : 2"));
        assert!(summary.contains("Mean recovery : 11.5 min"));
        assert!(summary.contains("<= 5 min  : 1"));
        assert!(summary.contains("2024-09-10 : 1"));
        assert!(summary.contains("2024-10 : 1 (50.0%)"));
        assert!(summary.contains("Excluded 1 of 3 rows"));
    }

    #[test]
    fn test_summary_layout() {
        let records = vec![RawRecord::new("1", "2024-09-10 08:00", "2024-09-10 08:03")];
        let report = pipeline::run(&records, &ParseOptions::default());

        let expected = "\
Recovery summary
  Total records : 1
  Mean recovery : 3.0 min
  Min recovery  : 3.0 min
  Max recovery  : 3.0 min

Recovered within
  <= 5 min  : 1
  <= 10 min : 1
  <= 15 min : 1

Records per day
  2024-09-10 : 1

Records per month
  2024-09 : 1 (100.0%)
";
        assert_eq!(format_summary(&report), expected);
    }

    #[test]
    fn test_summary_empty() {
        let report = pipeline::run(&[], &ParseOptions::default());
        let summary = format_summary(&report);
        assert!(summary.contains("Total records : 0"));
        assert!(summary.contains("Mean recovery : n/a"));
        assert!(summary.contains("(none)"));
        assert!(!summary.contains("Excluded"));
    }
}
