use super::{ColumnMapping, RecordSource, SourceError};
use crate::pipeline::{RawRecord, RawValue};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Separators considered when none is configured.
const CANDIDATE_DELIMITERS: [u8; 3] = [b',', b';', b'\t'];

/// Delimited export with a header row.
#[derive(Debug, Clone)]
pub struct CsvSource {
    path: PathBuf,
    columns: ColumnMapping,
    delimiter: Option<u8>,
}

/// The candidate separator that occurs most often in the header line.
/// Ties and header lines without any candidate fall back to a comma.
pub fn sniff_delimiter(content: &[u8]) -> u8 {
    let header = content.split(|&b| b == b'\n').next().unwrap_or_default();
    let mut best = (b',', 0);
    for candidate in CANDIDATE_DELIMITERS {
        let hits = header.iter().filter(|&&b| b == candidate).count();
        if hits > best.1 {
            best = (candidate, hits);
        }
    }
    best.0
}

impl CsvSource {
    pub fn new(path: impl AsRef<Path>, columns: ColumnMapping) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            columns,
            delimiter: None,
        }
    }

    /// Use a fixed separator instead of detecting one.
    pub fn with_delimiter(mut self, delimiter: Option<char>) -> Result<Self, SourceError> {
        self.delimiter = match delimiter {
            Some(c) if c.is_ascii() => Some(c as u8),
            Some(c) => return Err(SourceError::InvalidDelimiter { delimiter: c }),
            None => None,
        };
        Ok(self)
    }

    fn csv_error(&self, source: csv::Error) -> SourceError {
        SourceError::Csv {
            path: self.path.clone(),
            source,
        }
    }
}

impl RecordSource for CsvSource {
    fn load(&self) -> Result<Vec<RawRecord>, SourceError> {
        let content = std::fs::read(&self.path).map_err(|source| SourceError::Io {
            path: self.path.clone(),
            source,
        })?;
        let delimiter = self.delimiter.unwrap_or_else(|| sniff_delimiter(&content));
        debug!(path = %self.path.display(), delimiter = %(delimiter as char).escape_default(), "reading CSV");

        // Rows with a different field count are still rows; the pipeline
        // decides what to keep.
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .delimiter(delimiter)
            .from_reader(content.as_slice());

        let headers: Vec<String> = reader
            .byte_headers()
            .map_err(|e| self.csv_error(e))?
            .iter()
            .map(|h| String::from_utf8_lossy(h).trim().to_string())
            .collect();

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
        for row in reader.byte_records() {
            let row = row.map_err(|e| self.csv_error(e))?;
            let mut record = RawRecord::default();

            for (header, cell) in headers.iter().zip(row.iter()) {
                let text = String::from_utf8_lossy(cell);
                let text = text.trim();
                if text.is_empty() {
                    continue;
                }
                let value = RawValue::Text(text.to_string());

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

        debug!(path = %self.path.display(), rows = records.len(), "loaded CSV rows");
        Ok(records)
    }

    fn describe(&self) -> String {
        format!("csv:{}", self.path.display())
    }
}
