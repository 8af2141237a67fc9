// Metric names with special meaning in validation and host aggregation.
// These are the names used by the shipped node_exporter inspection configs.

pub const CPU_USAGE: &str = "CPU使用率";
pub const CPU_COUNT: &str = "CPU核心数";
pub const MEM_TOTAL: &str = "内存总量";
pub const MEM_USED: &str = "内存使用量";
pub const MEM_USAGE: &str = "内存使用率";
pub const UPTIME: &str = "运行时间";
pub const LOAD5: &str = "5分钟负载";
pub const TCP_CONNECTIONS: &str = "TCP连接数";
pub const TCP_TIME_WAIT: &str = "TCP_TW数";
pub const DISK_READ_RATE: &str = "30分钟内磁盘平均读取值";
pub const DISK_WRITE_RATE: &str = "30分钟内磁盘平均写入值";
pub const NET_DOWNLOAD_RATE: &str = "30分钟内下载速率";
pub const NET_UPLOAD_RATE: &str = "30分钟内上传速率";
pub const DISK_TOTAL: &str = "磁盘总量";
pub const DISK_AVAILABLE: &str = "磁盘可用量";
pub const DISK_USAGE: &str = "磁盘使用率";

/// Substring marking a metric as disk-related for anomaly accounting.
pub const DISK_MARKER: &str = "磁盘";

pub const INSTANCE_LABEL: &str = "instance";
pub const MOUNTPOINT_LABEL: &str = "mountpoint";
pub const DEVICE_LABEL: &str = "device";

/// Placeholder for a configured label the sample did not carry.
pub const MISSING_LABEL_VALUE: &str = "-";

pub fn is_disk_metric(name: &str) -> bool {
    name.contains(DISK_MARKER)
}
