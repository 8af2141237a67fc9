// Finished report handed to renderers and the HTTP/WS endpoints

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{HostSummary, MetricGroup};

/// Sample counts for one collection run. `total_samples = valid_samples + invalid_samples`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataQuality {
    pub total_samples: usize,
    pub valid_samples: usize,
    pub invalid_samples: usize,
    /// Disk metrics rejected by value plausibility checks.
    pub disk_anomalies: usize,
    /// Samples dropped for missing/empty labels (subset of invalid).
    pub incomplete_labels: usize,
    pub failed_queries: usize,
}

/// Chart-ready arrays: `labels` are all label values seen, sorted; each series is keyed
/// by `<group>_<metric>`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartData {
    pub labels: Vec<String>,
    pub series: BTreeMap<String, Vec<f64>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportData {
    pub timestamp: DateTime<Utc>,
    pub project: String,
    pub metric_groups: BTreeMap<String, MetricGroup>,
    pub group_order: Vec<String>,
    pub host_summary: Vec<HostSummary>,
    pub chart_data: ChartData,
    pub data_quality: DataQuality,
}

impl ReportData {
    /// Groups in configured order.
    pub fn groups(&self) -> impl Iterator<Item = &MetricGroup> {
        self.group_order
            .iter()
            .filter_map(|t| self.metric_groups.get(t))
    }

    pub fn host(&self, hostname: &str) -> Option<&HostSummary> {
        self.host_summary.iter().find(|h| h.hostname == hostname)
    }
}
