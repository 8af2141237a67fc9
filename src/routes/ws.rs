// WS /ws/reports: pushes each finished report as JSON

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use bytes::Bytes;
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use tokio::sync::broadcast;
use tokio::time::{Duration, timeout};

use super::AppState;
use crate::models::ReportData;

/// Ping interval for WebSocket connection health.
const WS_PING_INTERVAL: Duration = Duration::from_secs(30);
/// Max time to wait for a send before treating client as too slow / dead.
const WS_SEND_TIMEOUT: Duration = Duration::from_secs(10);

/// Decrements the subscriber count on drop (connect = +1, drop = -1).
struct WsReportGuard(Arc<AtomicUsize>);

impl Drop for WsReportGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, std::sync::atomic::Ordering::Relaxed);
    }
}

pub(super) async fn ws_reports(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    let tx = state.reports_tx.clone();
    let conn_count = state.ws_report_connections.clone();
    ws.on_upgrade(move |socket| async move {
        let mut rx = tx.subscribe();
        if let Err(e) = stream_reports(socket, &mut rx, conn_count).await {
            tracing::info!("Report stream error: {}", e);
        }
    })
}

async fn stream_reports(
    mut socket: WebSocket,
    rx: &mut broadcast::Receiver<Arc<ReportData>>,
    conn_count: Arc<AtomicUsize>,
) -> anyhow::Result<()> {
    conn_count.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
    let _guard = WsReportGuard(conn_count);
    tracing::info!("Client connected to report stream");

    let mut ping_interval = tokio::time::interval(WS_PING_INTERVAL);
    ping_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    loop {
        tokio::select! {
            result = rx.recv() => {
                let report = match result {
                    Ok(r) => r,
                    // Reports are large and infrequent; a lagged client just gets the next one.
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(_) => break,
                };
                let json = serde_json::to_string(report.as_ref())?;
                let r = timeout(WS_SEND_TIMEOUT, socket.send(Message::Text(json.into()))).await;
                if r.is_err() || r.unwrap_or(Ok(())).is_err() {
                    break;
                }
            }
            _ = ping_interval.tick() => {
                let r = timeout(WS_SEND_TIMEOUT, socket.send(Message::Ping(Bytes::new()))).await;
                if r.is_err() || r.unwrap_or(Ok(())).is_err() {
                    break;
                }
            }
        }
    }
    Ok(())
}
