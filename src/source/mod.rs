//! Data sources that turn incident exports into [`RawRecord`]s.
//!
//! A source only reads and maps columns. It never validates rows; that is
//! the pipeline's job. Failing to open or decode the file is an error,
//! a bad row is not.

mod delimited;
mod json;
mod workbook;

pub use delimited::CsvSource;
pub use json::JsonSource;
pub use workbook::WorkbookSource;

use crate::pipeline::RawRecord;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: ::csv::Error,
    },

    #[error("malformed JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to open workbook {path}: {source}")]
    Workbook {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },

    #[error("workbook {path} has no sheets")]
    EmptyWorkbook { path: PathBuf },

    #[error("CSV delimiter must be a single ASCII character, got {delimiter:?}")]
    InvalidDelimiter { delimiter: char },

    #[error("expected a JSON array of objects in {path}")]
    NotAnArray { path: PathBuf },

    #[error("unsupported input format for {path} (expected .csv, .json, .xlsx, .xlsm, .xls or .ods)")]
    UnsupportedFormat { path: PathBuf },
}

/// Which source columns feed the three fields the pipeline reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnMapping {
    pub identifier: String,
    pub alarm: String,
    pub clearance: String,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            identifier: "RAL/INC CADASTRADOS".to_string(),
            alarm: "HORÁRIO ALARME".to_string(),
            clearance: "HORÁRIO NORMALIZAÇÃO".to_string(),
        }
    }
}

/// Anything that can hand over an ordered batch of raw rows.
pub trait RecordSource {
    fn load(&self) -> Result<Vec<RawRecord>, SourceError>;

    /// Human-readable description, used in logs.
    fn describe(&self) -> String;
}

/// Pick a source by file extension. `delimiter` only applies to CSV.
pub fn open_source(
    path: impl AsRef<Path>,
    columns: &ColumnMapping,
    delimiter: Option<char>,
) -> Result<Box<dyn RecordSource>, SourceError> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("csv") => Ok(Box::new(
            CsvSource::new(path, columns.clone()).with_delimiter(delimiter)?,
        )),
        Some("json") => Ok(Box::new(JsonSource::new(path, columns.clone()))),
        Some("xlsx" | "xlsm" | "xls" | "ods") => {
            Ok(Box::new(WorkbookSource::new(path, columns.clone())))
        }
        _ => Err(SourceError::UnsupportedFormat {
            path: path.to_path_buf(),
        }),
    }
}
