//! API route definitions.

use super::state::AppState;
use axum::{extract::State, routing::get, Json, Router};
use serde_json::{json, Value};

pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/report", get(full_report))
        .route("/summary", get(summary))
        .route("/buckets", get(buckets))
        .route("/daily", get(daily))
        .route("/monthly", get(monthly))
}

fn meta(state: &AppState) -> Value {
    json!({
        "source": &*state.source,
        "computed_at": state.computed_at.to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION")
    })
}

async fn health() -> Json<Value> {
    Json(json!({
        "data": {
            "status": "ok",
            "version": env!("CARGO_PKG_VERSION")
        },
        "meta": {
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "version": env!("CARGO_PKG_VERSION")
        }
    }))
}

async fn full_report(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "data": &*state.report, "meta": meta(&state) }))
}

async fn summary(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "data": state.report.summary, "meta": meta(&state) }))
}

async fn buckets(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "data": state.report.buckets, "meta": meta(&state) }))
}

async fn daily(State(state): State<AppState>) -> Json<Value> {
    let mut meta = meta(&state);
    meta["total"] = json!(state.report.daily.len());
    Json(json!({ "data": state.report.daily, "meta": meta }))
}

async fn monthly(State(state): State<AppState>) -> Json<Value> {
    let mut meta = meta(&state);
    meta["total"] = json!(state.report.monthly.len());
    Json(json!({ "data": state.report.monthly, "meta": meta }))
}

#[cfg(test)]
mod tests {
    use crate::api::{router, state::AppState};
    use crate::pipeline::{self, ParseOptions, RawRecord};
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    fn state() -> AppState {
        let records = vec![
            RawRecord::new("1", "2024-09-10 08:00", "2024-09-10 08:03"),
            RawRecord::new("2", "2024-09-10 14:00", "2024-09-10 14:12"),
            RawRecord::new("3", "2024-10-02 09:00", "2024-10-02 09:40"),
        ];
        AppState::new(pipeline::run(&records, &ParseOptions::default()), "test")
    }

    async fn get_json(uri: &str) -> (StatusCode, Value) {
        let response = router(state())
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = get_json("/api/v1/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], "ok");
    }

    #[tokio::test]
    async fn test_summary_and_buckets() {
        let (status, body) = get_json("/api/v1/summary").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["count"], 3);
        assert_eq!(body["data"]["min_minutes"], 3.0);
        assert_eq!(body["meta"]["source"], "test");

        let (_, body) = get_json("/api/v1/buckets").await;
        assert_eq!(body["data"]["up_to_5"], 1);
        assert_eq!(body["data"]["up_to_10"], 1);
        assert_eq!(body["data"]["up_to_15"], 2);
    }

    #[tokio::test]
    async fn test_daily_and_monthly() {
        let (_, body) = get_json("/api/v1/daily").await;
        assert_eq!(body["meta"]["total"], 2);
        assert_eq!(body["data"][0]["day"], "2024-09-10");
        assert_eq!(body["data"][0]["count"], 2);

        let (_, body) = get_json("/api/v1/monthly").await;
        assert_eq!(body["data"][0]["month"], "2024-09");
        assert_eq!(body["data"][0]["count"], 2);
    }

    #[tokio::test]
    async fn test_full_report_includes_exclusions() {
        let (_, body) = get_json("/api/v1/report").await;
        assert_eq!(body["data"]["exclusions"]["total_rows"], 3);
        assert!(body["data"]["daily"].is_array());
    }

    #[tokio::test]
    async fn test_unknown_path_is_404() {
        let (status, _) = get_json("/api/v1/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
