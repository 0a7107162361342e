use crate::pipeline::RecoveryReport;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Read-only state shared by all handlers. The report is computed once,
/// before the server starts.
#[derive(Clone)]
pub struct AppState {
    pub report: Arc<RecoveryReport>,
    pub source: Arc<str>,
    pub computed_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(report: RecoveryReport, source: impl Into<Arc<str>>) -> Self {
        Self {
            report: Arc::new(report),
            source: source.into(),
            computed_at: Utc::now(),
        }
    }
}
