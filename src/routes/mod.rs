// HTTP + WebSocket routes for the latest report

mod http;
mod ws;

use axum::{Router, routing::get};
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use tokio::sync::broadcast;
use tower_http::cors::{Any, CorsLayer};

use crate::models::ReportData;
use crate::scheduler::LatestReport;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) latest: LatestReport,
    pub(crate) reports_tx: broadcast::Sender<Arc<ReportData>>,
    pub(crate) ws_report_connections: Arc<AtomicUsize>,
}

pub fn app(
    latest: LatestReport,
    reports_tx: broadcast::Sender<Arc<ReportData>>,
    ws_report_connections: Arc<AtomicUsize>,
) -> Router {
    let state = AppState {
        latest,
        reports_tx,
        ws_report_connections,
    };
    Router::new()
        .route("/", get(|| async { "promreport: Prometheus inspection reports" })) // GET /
        .route("/version", get(http::version_handler)) // GET /version
        .route("/api/report", get(http::report_handler)) // GET /api/report
        .route("/api/report/hosts", get(http::hosts_handler)) // GET /api/report/hosts
        .route("/ws/reports", get(ws::ws_reports)) // WS /ws/reports
        .layer(CorsLayer::new().allow_origin(Any))
        .with_state(state)
}
