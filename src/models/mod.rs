// Report data model: classified records, groups, host summaries

mod host;
mod metric;
mod report;

pub use host::{DiskInfo, DiskIoInfo, HostSummary, NetworkIoInfo};
pub use metric::{GroupStats, LabelValue, MetricGroup, MetricRecord, Severity};
pub use report::{ChartData, DataQuality, ReportData};
