// Per-instance resource summaries

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Severity;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiskInfo {
    pub mount_point: String,
    pub disk_total: f64,
    pub disk_used: f64,
    pub disk_usage: f64,
    pub status: Option<Severity>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiskIoInfo {
    pub device: String,
    pub avg_read_rate: f64,
    pub avg_write_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkIoInfo {
    pub interface: String,
    pub avg_download_rate: f64,
    pub avg_upload_rate: f64,
}

/// Aggregated view of one `instance`. Mount points, devices and interfaces are unique
/// within their lists.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostSummary {
    pub hostname: String,
    pub ip: String,
    pub cpu_count: i64,
    pub cpu_usage: f64,
    pub cpu_status: Option<Severity>,
    pub mem_total: f64,
    pub mem_used: f64,
    pub mem_usage: f64,
    pub mem_status: Option<Severity>,
    pub disk_data: Vec<DiskInfo>,
    pub disk_io_stats: Vec<DiskIoInfo>,
    pub network_stats: Vec<NetworkIoInfo>,
    /// Seconds.
    pub uptime: f64,
    pub load5: f64,
    pub tcp_connections: i64,
    pub tcp_time_wait: i64,
    /// Latest timestamp of any record attributed to this host.
    pub timestamp: DateTime<Utc>,
}

impl HostSummary {
    pub fn disk(&self, mount_point: &str) -> Option<&DiskInfo> {
        self.disk_data.iter().find(|d| d.mount_point == mount_point)
    }
}
