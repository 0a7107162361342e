//! recoverydash -- alarm recovery-time statistics for incident exports.
//!
//! This crate reads incident rows (alarm raised, alarm cleared), drops the
//! malformed ones, and derives summary statistics, cumulative latency
//! buckets, and daily/monthly counts for presentation.

pub mod api;
pub mod config;
pub mod pipeline;
pub mod report;
pub mod source;

use anyhow::{Context, Result};
use std::path::Path;

pub use pipeline::RecoveryReport;

/// Load rows from `input` and run the pipeline over them.
pub fn analyze(input: &Path, config: &config::DashboardConfig) -> Result<RecoveryReport> {
    let source = source::open_source(input, &config.columns, config.parsing.delimiter)?;
    tracing::info!(source = %source.describe(), "Loading incident records");

    let records = source
        .load()
        .with_context(|| format!("failed to load records from {}", input.display()))?;

    Ok(pipeline::run(&records, &config.parsing.parse_options()))
}

/// Compute the report for `input`, then serve it over HTTP until shutdown.
pub async fn serve(bind: &str, input: &Path, config: &config::DashboardConfig) -> Result<()> {
    // 1. Compute the report once; it is immutable for the life of the server.
    let report = analyze(input, config)?;
    let state = api::state::AppState::new(report, input.display().to_string());

    // 2. Start API Server
    let addr: std::net::SocketAddr = bind
        .parse()
        .with_context(|| format!("invalid bind address: {}", bind))?;
    let app = api::router(state);

    tracing::info!(%addr, "recoverydash listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
