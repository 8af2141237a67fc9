// Host aggregation: re-keys records by their `instance` label and folds known metric
// names into typed per-host fields. Name -> field mapping is a handler table so new
// metrics can be wired without touching the fold loop.

use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};

use crate::models::{DiskInfo, DiskIoInfo, HostSummary, MetricRecord, NetworkIoInfo, Severity};

use super::diagnostics::Diagnostics;
use super::names;

pub type FieldHandler = Box<dyn Fn(&mut HostAccumulator, &MetricRecord) + Send + Sync>;

/// Raw disk observations for one mount point, reconciled in `finish`.
#[derive(Debug, Clone, Default)]
pub struct DiskAccumulator {
    pub mount_point: String,
    pub total: Option<f64>,
    pub available: Option<f64>,
    pub reported_usage: Option<f64>,
    pub status: Option<Severity>,
}

/// Mutable per-host state while records are being folded.
#[derive(Debug, Clone)]
pub struct HostAccumulator {
    pub hostname: String,
    pub cpu_count: i64,
    pub cpu_usage: f64,
    pub cpu_status: Option<Severity>,
    pub mem_total: Option<f64>,
    pub mem_used: Option<f64>,
    pub mem_reported_usage: Option<f64>,
    pub mem_status: Option<Severity>,
    pub disks: Vec<DiskAccumulator>,
    pub disk_io: Vec<DiskIoInfo>,
    pub network: Vec<NetworkIoInfo>,
    pub uptime: f64,
    pub load5: f64,
    pub tcp_connections: i64,
    pub tcp_time_wait: i64,
    pub timestamp: DateTime<Utc>,
}

impl HostAccumulator {
    fn new(hostname: &str, timestamp: DateTime<Utc>) -> Self {
        Self {
            hostname: hostname.to_string(),
            cpu_count: 0,
            cpu_usage: 0.0,
            cpu_status: None,
            mem_total: None,
            mem_used: None,
            mem_reported_usage: None,
            mem_status: None,
            disks: Vec::new(),
            disk_io: Vec::new(),
            network: Vec::new(),
            uptime: 0.0,
            load5: 0.0,
            tcp_connections: 0,
            tcp_time_wait: 0,
            timestamp,
        }
    }

    /// Existing entry for `mount_point`, or a new one.
    pub fn disk_mut(&mut self, mount_point: &str) -> &mut DiskAccumulator {
        let idx = match self.disks.iter().position(|d| d.mount_point == mount_point) {
            Some(i) => i,
            None => {
                self.disks.push(DiskAccumulator {
                    mount_point: mount_point.to_string(),
                    ..Default::default()
                });
                self.disks.len() - 1
            }
        };
        &mut self.disks[idx]
    }

    pub fn disk_io_mut(&mut self, device: &str) -> &mut DiskIoInfo {
        let idx = match self.disk_io.iter().position(|d| d.device == device) {
            Some(i) => i,
            None => {
                self.disk_io.push(DiskIoInfo {
                    device: device.to_string(),
                    avg_read_rate: 0.0,
                    avg_write_rate: 0.0,
                });
                self.disk_io.len() - 1
            }
        };
        &mut self.disk_io[idx]
    }

    pub fn network_mut(&mut self, interface: &str) -> &mut NetworkIoInfo {
        let idx = match self.network.iter().position(|n| n.interface == interface) {
            Some(i) => i,
            None => {
                self.network.push(NetworkIoInfo {
                    interface: interface.to_string(),
                    avg_download_rate: 0.0,
                    avg_upload_rate: 0.0,
                });
                self.network.len() - 1
            }
        };
        &mut self.network[idx]
    }

    fn finish(self, tolerance_pct: f64, diagnostics: &mut Diagnostics) -> HostSummary {
        let mem_usage = match (self.mem_total, self.mem_used) {
            (Some(total), Some(used)) if total > 0.0 => used / total * 100.0,
            _ => self.mem_reported_usage.unwrap_or(0.0),
        };
        let hostname = self.hostname;
        let disk_data = self
            .disks
            .into_iter()
            .map(|d| d.finish(&hostname, tolerance_pct, diagnostics))
            .collect();
        HostSummary {
            ip: extract_ip(&hostname),
            hostname,
            cpu_count: self.cpu_count,
            cpu_usage: self.cpu_usage,
            cpu_status: self.cpu_status,
            mem_total: self.mem_total.unwrap_or(0.0),
            mem_used: self.mem_used.unwrap_or(0.0),
            mem_usage,
            mem_status: self.mem_status,
            disk_data,
            disk_io_stats: self.disk_io,
            network_stats: self.network,
            uptime: self.uptime,
            load5: self.load5,
            tcp_connections: self.tcp_connections,
            tcp_time_wait: self.tcp_time_wait,
            timestamp: self.timestamp,
        }
    }
}

impl DiskAccumulator {
    fn finish(self, host: &str, tolerance_pct: f64, diagnostics: &mut Diagnostics) -> DiskInfo {
        let derived = match (self.total, self.available) {
            (Some(total), Some(available)) => Some(total - available),
            _ => None,
        }
        .filter(|used| used.is_finite());
        let total = finite_or_zero(self.total.unwrap_or(0.0));
        let computed_usage = derived
            .filter(|_| total > 0.0)
            .map(|used| used / total * 100.0);
        let mut disk = DiskInfo {
            mount_point: self.mount_point,
            disk_total: total,
            disk_used: derived.unwrap_or(0.0),
            disk_usage: self.reported_usage.or(computed_usage).unwrap_or(0.0),
            status: self.status,
        };
        if derived.is_some() {
            if let Some(c) = reconcile_disk(&mut disk, tolerance_pct) {
                diagnostics.disk_usage_corrected(host, &disk.mount_point, c.reported, c.computed);
            }
        } else {
            // Without a used figure there is nothing to check the reported usage against.
            disk.disk_usage = finite_or_zero(disk.disk_usage).clamp(0.0, 100.0);
        }
        disk
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UsageCorrection {
    pub reported: f64,
    pub computed: f64,
}

/// Clamps used bytes to >= 0 and usage to [0, 100]; non-finite figures count as 0.
/// When total is known and the reported usage is more than `tolerance_pct` points away
/// from used/total, the computed usage replaces it and the correction is returned.
pub fn reconcile_disk(disk: &mut DiskInfo, tolerance_pct: f64) -> Option<UsageCorrection> {
    disk.disk_used = finite_or_zero(disk.disk_used).max(0.0);
    disk.disk_usage = finite_or_zero(disk.disk_usage);
    let mut correction = None;
    if disk.disk_total.is_finite() && disk.disk_total > 0.0 {
        let computed = finite_or_zero(disk.disk_used / disk.disk_total * 100.0);
        if (disk.disk_usage - computed).abs() > tolerance_pct {
            correction = Some(UsageCorrection {
                reported: disk.disk_usage,
                computed,
            });
            disk.disk_usage = computed;
        }
    }
    disk.disk_usage = disk.disk_usage.clamp(0.0, 100.0);
    correction
}

fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() { v } else { 0.0 }
}

/// `host:9100` -> `host`. Instances without a port are returned unchanged.
pub fn extract_ip(instance: &str) -> String {
    match instance.rfind(':') {
        Some(idx) => instance[..idx].to_string(),
        None => instance.to_string(),
    }
}

pub struct HostAggregator {
    handlers: HashMap<String, FieldHandler>,
    disk_usage_tolerance_pct: f64,
}

impl HostAggregator {
    /// Aggregator with the node_exporter inspection metrics wired in.
    pub fn new(disk_usage_tolerance_pct: f64) -> Self {
        let mut aggregator = Self::without_handlers(disk_usage_tolerance_pct);
        aggregator
            .register(names::CPU_USAGE, |h, r| {
                h.cpu_usage = r.value;
                h.cpu_status = Some(r.status);
            })
            .register(names::CPU_COUNT, |h, r| h.cpu_count = r.value as i64)
            .register(names::MEM_TOTAL, |h, r| h.mem_total = Some(r.value))
            .register(names::MEM_USED, |h, r| h.mem_used = Some(r.value))
            .register(names::MEM_USAGE, |h, r| {
                h.mem_reported_usage = Some(r.value);
                h.mem_status = Some(r.status);
            })
            .register(names::UPTIME, |h, r| h.uptime = r.value)
            .register(names::LOAD5, |h, r| h.load5 = r.value)
            .register(names::TCP_CONNECTIONS, |h, r| {
                h.tcp_connections = r.value as i64
            })
            .register(names::TCP_TIME_WAIT, |h, r| h.tcp_time_wait = r.value as i64)
            .register(names::DISK_READ_RATE, |h, r| {
                if let Some(device) = r.label(names::DEVICE_LABEL) {
                    h.disk_io_mut(device).avg_read_rate = r.value;
                }
            })
            .register(names::DISK_WRITE_RATE, |h, r| {
                if let Some(device) = r.label(names::DEVICE_LABEL) {
                    h.disk_io_mut(device).avg_write_rate = r.value;
                }
            })
            .register(names::NET_DOWNLOAD_RATE, |h, r| {
                if let Some(device) = r.label(names::DEVICE_LABEL) {
                    h.network_mut(device).avg_download_rate = r.value;
                }
            })
            .register(names::NET_UPLOAD_RATE, |h, r| {
                if let Some(device) = r.label(names::DEVICE_LABEL) {
                    h.network_mut(device).avg_upload_rate = r.value;
                }
            })
            .register(names::DISK_TOTAL, |h, r| {
                if let Some(mount) = r.label(names::MOUNTPOINT_LABEL) {
                    h.disk_mut(mount).total = Some(r.value);
                }
            })
            .register(names::DISK_AVAILABLE, |h, r| {
                if let Some(mount) = r.label(names::MOUNTPOINT_LABEL) {
                    h.disk_mut(mount).available = Some(r.value);
                }
            })
            .register(names::DISK_USAGE, |h, r| {
                if let Some(mount) = r.label(names::MOUNTPOINT_LABEL) {
                    let disk = h.disk_mut(mount);
                    disk.reported_usage = Some(r.value);
                    disk.status = Some(r.status);
                }
            });
        aggregator
    }

    pub fn without_handlers(disk_usage_tolerance_pct: f64) -> Self {
        Self {
            handlers: HashMap::new(),
            disk_usage_tolerance_pct,
        }
    }

    /// Maps `metric_name` to `handler`, replacing any previous mapping.
    pub fn register<F>(&mut self, metric_name: impl Into<String>, handler: F) -> &mut Self
    where
        F: Fn(&mut HostAccumulator, &MetricRecord) + Send + Sync + 'static,
    {
        self.handlers.insert(metric_name.into(), Box::new(handler));
        self
    }

    pub fn handles(&self, metric_name: &str) -> bool {
        self.handlers.contains_key(metric_name)
    }

    /// Folds records into host summaries, sorted by hostname. Records without an
    /// `instance` label are skipped; unknown metric names only bump the host timestamp.
    pub fn aggregate<'a>(
        &self,
        records: impl IntoIterator<Item = &'a MetricRecord>,
        diagnostics: &mut Diagnostics,
    ) -> Vec<HostSummary> {
        let mut hosts: BTreeMap<String, HostAccumulator> = BTreeMap::new();
        for record in records {
            let Some(instance) = record.label(names::INSTANCE_LABEL) else {
                continue;
            };
            let host = hosts
                .entry(instance.to_string())
                .or_insert_with(|| HostAccumulator::new(instance, record.timestamp));
            if record.timestamp > host.timestamp {
                host.timestamp = record.timestamp;
            }
            if let Some(handler) = self.handlers.get(record.name.as_str()) {
                handler(host, record);
            }
        }
        hosts
            .into_values()
            .map(|h| h.finish(self.disk_usage_tolerance_pct, diagnostics))
            .collect()
    }
}
