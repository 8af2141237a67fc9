use anyhow::Result;
use promreport::*;
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use std::time::Duration;
use tokio::sync::{RwLock, broadcast};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .init();

    let app_config = Arc::new(config::AppConfig::load()?);
    tracing::info!(
        project = %app_config.project.name,
        prometheus = %app_config.prometheus.url,
        groups = app_config.metric_types.len(),
        "{} {} starting",
        version::NAME,
        version::VERSION
    );

    let client = prometheus_repo::PrometheusClient::new(
        app_config.prometheus.url.clone(),
        Duration::from_millis(app_config.prometheus.query_timeout_ms),
    )?;
    let collector = Arc::new(pipeline::Collector::new(client, app_config.clone()));
    let writer = Arc::new(report_writer::ReportWriter::new(
        app_config.report.output_dir.clone(),
    ));
    let latest: scheduler::LatestReport = Arc::new(RwLock::new(None));
    let capacity = app_config
        .server
        .as_ref()
        .map_or(1, |s| s.broadcast_capacity);
    let (tx, _) = broadcast::channel::<Arc<models::ReportData>>(capacity);

    let schedule = app_config
        .schedule
        .cron
        .as_deref()
        .map(scheduler::parse_schedule)
        .transpose()?;

    let Some(server) = app_config.server.clone() else {
        let Some(schedule) = schedule else {
            // One-shot: collect, write, exit.
            let report = scheduler::run_once(&collector, &writer, &latest, &tx).await?;
            for h in &report.host_summary {
                tracing::info!(
                    host = %h.hostname,
                    cpu_count = h.cpu_count,
                    mem_total = h.mem_total,
                    mem_used = h.mem_used,
                    disks = h.disk_data.len(),
                    "host summary"
                );
            }
            return Ok(());
        };
        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
        let handle = scheduler::spawn(
            scheduler::SchedulerDeps {
                collector,
                writer,
                latest,
                tx,
                shutdown_rx,
            },
            scheduler::SchedulerConfig {
                schedule,
                run_on_startup: app_config.schedule.run_on_startup,
            },
        );
        shutdown_signal().await;
        tracing::info!("Received shutdown signal");
        let _ = shutdown_tx.send(());
        let _ = handle.await;
        return Ok(());
    };

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
    let scheduler_handle = match schedule {
        Some(schedule) => Some(scheduler::spawn(
            scheduler::SchedulerDeps {
                collector,
                writer,
                latest: latest.clone(),
                tx: tx.clone(),
                shutdown_rx,
            },
            scheduler::SchedulerConfig {
                schedule,
                run_on_startup: app_config.schedule.run_on_startup,
            },
        )),
        None => {
            // No schedule: serve the single report collected now.
            if let Err(e) = scheduler::run_once(&collector, &writer, &latest, &tx).await {
                tracing::warn!(error = %e, operation = "run_once", "collection failed");
            }
            None
        }
    };

    let app = routes::app(latest, tx, Arc::new(AtomicUsize::new(0)));
    let addr = format!("{}:{}", server.host, server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on http://{}", addr);

    tokio::select! {
        result = axum::serve(listener, app) => {
            result?;
        }
        _ = shutdown_signal() => {
            tracing::info!("Received shutdown signal");
            let _ = shutdown_tx.send(());
            if let Some(handle) = scheduler_handle {
                let _ = handle.await;
            }
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        let mut sigterm =
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(s) => s,
                Err(_) => {
                    let _ = tokio::signal::ctrl_c().await;
                    return;
                }
            };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = sigterm.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
