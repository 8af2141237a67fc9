// Integration tests: HTTP and WebSocket endpoints

mod common;

use axum_test::TestServer;
use common::{FakeClient, config_with, sample};
use promreport::models::{HostSummary, ReportData};
use promreport::pipeline::Collector;
use promreport::routes;
use promreport::scheduler::LatestReport;
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use tokio::sync::{RwLock, broadcast};

const METRICS: &str = r#"
[[metric_types]]
type = "基础资源"

[[metric_types.metrics]]
name = "CPU使用率"
query = "cpu_usage"
threshold = 80.0
labels = { instance = "主机" }
"#;

fn test_app() -> (axum::Router, LatestReport, broadcast::Sender<Arc<ReportData>>) {
    let latest: LatestReport = Arc::new(RwLock::new(None));
    let (tx, _) = broadcast::channel(4);
    let app = routes::app(latest.clone(), tx.clone(), Arc::new(AtomicUsize::new(0)));
    (app, latest, tx)
}

async fn collected_report() -> Arc<ReportData> {
    let client = FakeClient::new().with(
        "cpu_usage",
        vec![
            sample(&[("instance", "10.0.0.1:9100")], 50.0),
            sample(&[("instance", "10.0.0.2:9100")], 90.0),
        ],
    );
    let collector = Collector::new(client, Arc::new(config_with(METRICS)));
    Arc::new(collector.collect().await)
}

#[tokio::test]
async fn test_root_endpoint() {
    let (app, _, _) = test_app();
    let server = TestServer::new(app);
    let response = server.get("/").await;
    response.assert_status_ok();
    response.assert_text("promreport: Prometheus inspection reports");
}

#[tokio::test]
async fn test_version_endpoint() {
    let (app, _, _) = test_app();
    let server = TestServer::new(app);
    let response = server.get("/version").await;
    response.assert_status_ok();
    let json: serde_json::Value = response.json();
    assert_eq!(
        json.get("name").and_then(|v| v.as_str()),
        Some("promreport")
    );
    assert!(json.get("version").and_then(|v| v.as_str()).is_some());
}

#[tokio::test]
async fn test_report_endpoints_404_before_first_run() {
    let (app, _, _) = test_app();
    let server = TestServer::new(app);
    let response = server.get("/api/report").await;
    response.assert_status_not_found();
    let json: serde_json::Value = response.json();
    assert!(json.get("error").is_some());
    server.get("/api/report/hosts").await.assert_status_not_found();
}

#[tokio::test]
async fn test_report_endpoint_serves_latest() {
    let (app, latest, _) = test_app();
    *latest.write().await = Some(collected_report().await);
    let server = TestServer::new(app);

    let response = server.get("/api/report").await;
    response.assert_status_ok();
    let report: ReportData = response.json();
    assert_eq!(report.project, "测试项目");
    assert_eq!(report.metric_groups["基础资源"].stats.critical_count, 1);

    let hosts: Vec<HostSummary> = server.get("/api/report/hosts").await.json();
    let names: Vec<_> = hosts.iter().map(|h| h.hostname.as_str()).collect();
    assert_eq!(names, vec!["10.0.0.1:9100", "10.0.0.2:9100"]);
}

// Receive until we get valid JSON (server may send Ping first).
async fn receive_first_json_text<T: serde::de::DeserializeOwned>(
    ws: &mut axum_test::TestWebSocket,
) -> T {
    let deadline = tokio::time::Instant::now() + tokio::time::Duration::from_secs(3);
    loop {
        let text = ws.receive_text().await;
        if let Ok(v) = serde_json::from_str::<T>(&text) {
            return v;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "timed out waiting for JSON"
        );
    }
}

#[tokio::test]
async fn test_ws_reports_receives_broadcast() {
    let (app, _, tx) = test_app();
    let server = TestServer::builder().http_transport().build(app);
    let report = collected_report().await;
    let mut ws = server
        .get_websocket("/ws/reports")
        .await
        .into_websocket()
        .await;
    let tx_clone = tx.clone();
    let report_clone = report.clone();
    tokio::spawn(async move {
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
        let _ = tx_clone.send(report_clone);
    });
    let received: ReportData = receive_first_json_text(&mut ws).await;
    assert_eq!(received.timestamp, report.timestamp);
    assert_eq!(received.host_summary.len(), 2);
}
