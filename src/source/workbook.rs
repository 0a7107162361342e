use super::{ColumnMapping, RecordSource, SourceError};
use crate::pipeline::{RawRecord, RawValue};
use calamine::{open_workbook_auto, Data, Reader};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Spreadsheet export (xlsx, xlsm, xls, ods). Only the first sheet is read;
/// its first row is the header.
#[derive(Debug, Clone)]
pub struct WorkbookSource {
    path: PathBuf,
    columns: ColumnMapping,
}

impl WorkbookSource {
    pub fn new(path: impl AsRef<Path>, columns: ColumnMapping) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            columns,
        }
    }

    fn workbook_error(&self, source: calamine::Error) -> SourceError {
        SourceError::Workbook {
            path: self.path.clone(),
            source,
        }
    }
}

/// Typed cells keep their type: date cells become date-times, numbers stay
/// numbers. Empty and error cells are missing.
fn cell_value(cell: &Data) -> Option<RawValue> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::Int(i) => Some(RawValue::Number(*i as f64)),
        Data::Float(f) => Some(RawValue::Number(*f)),
        Data::DateTime(dt) => dt.as_datetime().map(RawValue::DateTime),
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| RawValue::Text(s.to_string()))
        }
        Data::Bool(b) => Some(RawValue::Text(b.to_string())),
    }
}

impl RecordSource for WorkbookSource {
    fn load(&self) -> Result<Vec<RawRecord>, SourceError> {
        let mut workbook = open_workbook_auto(&self.path).map_err(|e| self.workbook_error(e))?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| SourceError::EmptyWorkbook {
                path: self.path.clone(),
            })?
            .map_err(|e| self.workbook_error(e))?;

        let mut rows = range.rows();
        let headers: Vec<String> = match rows.next() {
            Some(header) => header.iter().map(|c| c.to_string().trim().to_string()).collect(),
            None => {
                debug!(path = %self.path.display(), "first sheet is empty");
                return Ok(Vec::new());
            }
        };

        for (name, wanted) in [
            ("identifier", &self.columns.identifier),
            ("alarm", &self.columns.alarm),
            ("clearance", &self.columns.clearance),
        ] {
            if !headers.iter().any(|h| h == wanted) {
                warn!(
                    path = %self.path.display(),
                    field = name,
                    column = %wanted,
                    "configured column not found in header, every row will lack this field"
                );
            }
        }

        let mut records = Vec::new();
        for row in rows {
            let mut record = RawRecord::default();
            for (header, cell) in headers.iter().zip(row) {
                let Some(value) = cell_value(cell) else {
                    continue;
                };
                if *header == self.columns.identifier {
                    record.identifier = Some(value);
                } else if *header == self.columns.alarm {
                    record.alarm_at = Some(value);
                } else if *header == self.columns.clearance {
                    record.cleared_at = Some(value);
                } else {
                    record.extra.push((header.clone(), value));
                }
            }
            records.push(record);
        }

        debug!(path = %self.path.display(), rows = records.len(), "loaded workbook rows");
        Ok(records)
    }

    fn describe(&self) -> String {
        format!("workbook:{}", self.path.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{self, ParseOptions};
    use chrono::NaiveDate;

    const FIXTURE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/incidents.xlsx");

    fn load_fixture() -> Vec<RawRecord> {
        WorkbookSource::new(FIXTURE, ColumnMapping::default())
            .load()
            .unwrap()
    }

    #[test]
    fn test_typed_cells() {
        let records = load_fixture();
        assert_eq!(records.len(), 4);

        let first = &records[0];
        assert_eq!(first.identifier, Some(RawValue::Number(1201.0)));
        let Some(RawValue::DateTime(alarm)) = first.alarm_at else {
            panic!("expected a typed date cell, got {:?}", first.alarm_at);
        };
        assert_eq!(alarm.date(), NaiveDate::from_ymd_opt(2024, 9, 10).unwrap());
        assert_eq!(
            first.extra,
            vec![("LINK".to_string(), RawValue::from("POA-01"))]
        );

        // summary row: text identifier, nothing else
        assert_eq!(records[1].identifier, Some(RawValue::from("TOTAL")));
        assert_eq!(records[1].alarm_at, None);

        // a date typed in as text stays text
        assert_eq!(records[2].alarm_at, Some(RawValue::from("10/09/2024 14:00")));
    }

    #[test]
    fn test_fixture_through_pipeline() {
        let report = pipeline::run(&load_fixture(), &ParseOptions::default());

        assert_eq!(report.summary.count, 2);
        let min = report.summary.min_minutes.unwrap();
        let max = report.summary.max_minutes.unwrap();
        assert!((min - 3.0).abs() < 1e-3, "min = {min}");
        assert!((max - 12.0).abs() < 1e-3, "max = {max}");
        assert_eq!(report.buckets.up_to_5, 1);
        assert_eq!(report.buckets.up_to_15, 2);
        assert_eq!(report.daily.len(), 1);
        assert_eq!(report.daily[0].count, 2);
        assert_eq!(report.exclusions.invalid_identifier, 1);
        assert_eq!(report.exclusions.non_positive_duration, 1);
    }

    #[test]
    fn test_cell_value_mapping() {
        assert_eq!(cell_value(&Data::Empty), None);
        assert_eq!(cell_value(&Data::Int(7)), Some(RawValue::Number(7.0)));
        assert_eq!(cell_value(&Data::String("  ".to_string())), None);
        assert_eq!(
            cell_value(&Data::DateTimeIso("2024-09-10T08:00:00".to_string())),
            Some(RawValue::from("2024-09-10T08:00:00"))
        );
    }
}
