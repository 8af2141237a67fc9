// GET handlers: version, latest report, latest host summaries

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use super::AppState;
use crate::version::{NAME, VERSION};

/// GET /version: service name and version (from Cargo.toml at build time).
pub(super) async fn version_handler() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "name": NAME,
        "version": VERSION,
    }))
}

fn no_report() -> Response {
    (
        StatusCode::NOT_FOUND,
        axum::Json(serde_json::json!({ "error": "no report collected yet" })),
    )
        .into_response()
}

/// GET /api/report: most recent finished report, 404 before the first run completes.
pub(super) async fn report_handler(State(state): State<AppState>) -> Response {
    match state.latest.read().await.as_ref() {
        Some(report) => axum::Json(report.as_ref().clone()).into_response(),
        None => no_report(),
    }
}

/// GET /api/report/hosts
pub(super) async fn hosts_handler(State(state): State<AppState>) -> Response {
    match state.latest.read().await.as_ref() {
        Some(report) => axum::Json(report.host_summary.clone()).into_response(),
        None => no_report(),
    }
}
