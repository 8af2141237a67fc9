// Cron-driven collection runs. Each finished report is stored as the latest report,
// broadcast to /ws/reports subscribers and written to disk.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{RwLock, broadcast, oneshot};
use tracing::{debug, info, warn};

use crate::models::ReportData;
use crate::pipeline::Collector;
use crate::prometheus_repo::QueryClient;
use crate::report_writer::ReportWriter;

/// Most recent finished report, shared with the HTTP handlers.
pub type LatestReport = Arc<RwLock<Option<Arc<ReportData>>>>;

/// Parses a cron expression. Classic five-field expressions ("0 3 * * *") are accepted
/// and fire at second 0.
pub fn parse_schedule(expr: &str) -> Result<cron::Schedule, cron::error::Error> {
    if expr.split_whitespace().count() == 5 {
        cron::Schedule::from_str(&format!("0 {expr}"))
    } else {
        cron::Schedule::from_str(expr)
    }
}

/// Collector, outputs and shutdown for the scheduler.
pub struct SchedulerDeps<C> {
    pub collector: Arc<Collector<C>>,
    pub writer: Arc<ReportWriter>,
    pub latest: LatestReport,
    pub tx: broadcast::Sender<Arc<ReportData>>,
    pub shutdown_rx: oneshot::Receiver<()>,
}

pub struct SchedulerConfig {
    pub schedule: cron::Schedule,
    pub run_on_startup: bool,
}

/// Runs one collection and publishes the result. The report is published even when
/// writing the file fails; the write error is returned.
pub async fn run_once<C: QueryClient>(
    collector: &Collector<C>,
    writer: &ReportWriter,
    latest: &LatestReport,
    tx: &broadcast::Sender<Arc<ReportData>>,
) -> anyhow::Result<Arc<ReportData>> {
    let report = Arc::new(collector.collect().await);
    *latest.write().await = Some(report.clone());
    if tx.send(report.clone()).is_err() {
        debug!(
            operation = "broadcast_report",
            "No active WebSocket clients; broadcast channel has no receivers"
        );
    }
    writer.write(&report).await?;
    Ok(report)
}

pub fn spawn<C: QueryClient + 'static>(
    deps: SchedulerDeps<C>,
    config: SchedulerConfig,
) -> tokio::task::JoinHandle<()> {
    let SchedulerDeps {
        collector,
        writer,
        latest,
        tx,
        mut shutdown_rx,
    } = deps;
    let SchedulerConfig {
        schedule,
        run_on_startup,
    } = config;

    tokio::spawn(async move {
        if run_on_startup {
            tokio::select! {
                result = run_once(&collector, &writer, &latest, &tx) => {
                    if let Err(e) = result {
                        warn!(error = %e, operation = "run_once", "startup collection failed");
                    }
                }
                _ = &mut shutdown_rx => {
                    debug!("Scheduler shutting down during startup collection");
                    return;
                }
            }
        }

        loop {
            let now = chrono::Local::now();
            let Some(next) = schedule.after(&now).next() else {
                warn!("cron schedule has no upcoming fire time; scheduler stopping");
                break;
            };
            let delay = (next - now).to_std().unwrap_or(Duration::from_secs(1));
            debug!(next = %next, "next collection scheduled");

            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = &mut shutdown_rx => {
                    debug!("Scheduler shutting down");
                    break;
                }
            }

            // A run still in progress is abandoned on shutdown.
            tokio::select! {
                result = run_once(&collector, &writer, &latest, &tx) => match result {
                    Ok(report) => info!(
                        hosts = report.host_summary.len(),
                        failed_queries = report.data_quality.failed_queries,
                        "scheduled collection complete"
                    ),
                    Err(e) => warn!(error = %e, operation = "run_once", "scheduled collection failed"),
                },
                _ = &mut shutdown_rx => {
                    debug!("Scheduler shutting down during collection");
                    break;
                }
            }
        }
    })
}
