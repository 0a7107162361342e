use super::{ColumnMapping, RecordSource, SourceError};
use crate::pipeline::{RawRecord, RawValue};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// JSON export: a top-level array of row objects.
#[derive(Debug, Clone)]
pub struct JsonSource {
    path: PathBuf,
    columns: ColumnMapping,
}

impl JsonSource {
    pub fn new(path: impl AsRef<Path>, columns: ColumnMapping) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            columns,
        }
    }

    /// Map already-decoded rows. Non-object entries become empty rows so the
    /// pipeline still counts them.
    pub fn records_from_value(&self, value: Value) -> Result<Vec<RawRecord>, SourceError> {
        let Value::Array(rows) = value else {
            return Err(SourceError::NotAnArray {
                path: self.path.clone(),
            });
        };

        let mut records = Vec::with_capacity(rows.len());
        for (index, row) in rows.into_iter().enumerate() {
            let Value::Object(fields) = row else {
                warn!(path = %self.path.display(), index, "row is not an object");
                records.push(RawRecord::default());
                continue;
            };

            let mut record = RawRecord::default();
            for (key, cell) in fields {
                let Some(value) = cell_value(cell) else {
                    continue;
                };
                if key == self.columns.identifier {
                    record.identifier = Some(value);
                } else if key == self.columns.alarm {
                    record.alarm_at = Some(value);
                } else if key == self.columns.clearance {
                    record.cleared_at = Some(value);
                } else {
                    record.extra.push((key, value));
                }
            }
            records.push(record);
        }

        Ok(records)
    }
}

fn cell_value(cell: Value) -> Option<RawValue> {
    match cell {
        Value::Null => None,
        Value::String(s) => Some(RawValue::Text(s)),
        Value::Number(n) => n.as_f64().map(RawValue::Number),
        other => Some(RawValue::Text(other.to_string())),
    }
}

impl RecordSource for JsonSource {
    fn load(&self) -> Result<Vec<RawRecord>, SourceError> {
        let content = std::fs::read_to_string(&self.path).map_err(|source| SourceError::Io {
            path: self.path.clone(),
            source,
        })?;
        let value: Value = serde_json::from_str(&content).map_err(|source| SourceError::Json {
            path: self.path.clone(),
            source,
        })?;

        let records = self.records_from_value(value)?;
        debug!(path = %self.path.display(), rows = records.len(), "loaded JSON rows");
        Ok(records)
    }

    fn describe(&self) -> String {
        format!("json:{}", self.path.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn source() -> JsonSource {
        JsonSource::new("rows.json", ColumnMapping::default())
    }

    #[test]
    fn test_maps_cells() {
        let records = source()
            .records_from_value(json!([
                {
                    "RAL/INC CADASTRADOS": 1201,
                    "HORÁRIO ALARME": "2024-09-10 08:00",
                    "HORÁRIO NORMALIZAÇÃO": null,
                    "LINK": "POA-01"
                }
            ]))
            .unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].identifier, Some(RawValue::Number(1201.0)));
        assert_eq!(records[0].alarm_at, Some(RawValue::from("2024-09-10 08:00")));
        assert_eq!(records[0].cleared_at, None);
        assert_eq!(
            records[0].extra,
            vec![("LINK".to_string(), RawValue::from("POA-01"))]
        );
    }

    #[test]
    fn test_non_object_rows_are_kept_empty() {
        let records = source().records_from_value(json!([1, "x"])).unwrap();
        assert_eq!(records, vec![RawRecord::default(), RawRecord::default()]);
    }

    #[test]
    fn test_top_level_must_be_array() {
        let err = source().records_from_value(json!({"rows": []})).unwrap_err();
        assert!(matches!(err, SourceError::NotAnArray { .. }));
    }

    #[test]
    fn test_load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rows.json");
        std::fs::write(
            &path,
            r#"[{"RAL/INC CADASTRADOS": "5", "HORÁRIO ALARME": "2024-09-10T08:00", "HORÁRIO NORMALIZAÇÃO": "2024-09-10T08:09"}]"#,
        )
        .unwrap();

        let records = JsonSource::new(&path, ColumnMapping::default()).load().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].identifier, Some(RawValue::from("5")));
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rows.json");
        std::fs::write(&path, "[{").unwrap();
        let err = JsonSource::new(&path, ColumnMapping::default()).load().unwrap_err();
        assert!(matches!(err, SourceError::Json { .. }));
    }
}
