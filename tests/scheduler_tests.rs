// Scheduler task: startup run, shutdown while a collection is in flight

mod common;

use common::{FakeClient, config_with, sample};
use promreport::pipeline::Collector;
use promreport::report_writer::ReportWriter;
use promreport::scheduler::{self, LatestReport, SchedulerConfig, SchedulerDeps};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{RwLock, broadcast, oneshot};

const METRICS: &str = r#"
[[metric_types]]
type = "基础资源"

[[metric_types.metrics]]
name = "CPU使用率"
query = "cpu_usage"
threshold = 80.0
labels = { instance = "主机" }
"#;

fn deps(
    client: FakeClient,
    dir: &std::path::Path,
) -> (SchedulerDeps<FakeClient>, LatestReport, oneshot::Sender<()>) {
    let latest: LatestReport = Arc::new(RwLock::new(None));
    let (tx, _) = broadcast::channel(4);
    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let deps = SchedulerDeps {
        collector: Arc::new(Collector::new(client, Arc::new(config_with(METRICS)))),
        writer: Arc::new(ReportWriter::new(dir)),
        latest: latest.clone(),
        tx,
        shutdown_rx,
    };
    (deps, latest, shutdown_tx)
}

fn yearly() -> SchedulerConfig {
    SchedulerConfig {
        schedule: scheduler::parse_schedule("0 0 0 1 1 *").unwrap(),
        run_on_startup: true,
    }
}

#[tokio::test]
async fn test_startup_run_publishes_report() {
    let dir = tempfile::tempdir().unwrap();
    let client = FakeClient::new().with("cpu_usage", vec![sample(&[("instance", "h:9100")], 10.0)]);
    let (deps, latest, shutdown_tx) = deps(client, dir.path());
    let handle = scheduler::spawn(deps, yearly());

    let deadline = tokio::time::Instant::now() + Duration::from_secs(3);
    while latest.read().await.is_none() {
        assert!(tokio::time::Instant::now() < deadline, "startup run never published");
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    let _ = shutdown_tx.send(());
    tokio::time::timeout(Duration::from_secs(1), handle)
        .await
        .expect("scheduler stops after shutdown")
        .unwrap();
}

#[tokio::test]
async fn test_shutdown_interrupts_running_collection() {
    let dir = tempfile::tempdir().unwrap();
    // query timeout is 2s in the base config; the slow query holds the run open
    let client = FakeClient::new().slow("cpu_usage", Duration::from_secs(30));
    let (deps, latest, shutdown_tx) = deps(client, dir.path());
    let handle = scheduler::spawn(deps, yearly());

    tokio::time::sleep(Duration::from_millis(50)).await;
    let _ = shutdown_tx.send(());
    tokio::time::timeout(Duration::from_millis(500), handle)
        .await
        .expect("scheduler stops without waiting for the collection")
        .unwrap();
    assert!(latest.read().await.is_none());
}
