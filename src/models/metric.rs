// Classified metric records and per-group storage

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Normal,
    Warning,
    Critical,
}

impl Severity {
    /// Display text used in rendered reports.
    pub fn status_text(self) -> &'static str {
        match self {
            Severity::Critical => "严重",
            Severity::Warning => "警告",
            Severity::Normal => "正常",
        }
    }

    pub fn is_alert(self) -> bool {
        !matches!(self, Severity::Normal)
    }
}

/// One configured label resolved against a sample.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelValue {
    pub name: String,
    pub alias: String,
    pub value: String,
}

/// A validated, classified sample. Labels follow the metric's configured label order
/// and never carry an empty or "-" value.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricRecord {
    pub name: String,
    pub description: String,
    pub value: f64,
    pub threshold: f64,
    pub unit: String,
    pub status: Severity,
    pub status_text: String,
    pub timestamp: DateTime<Utc>,
    pub labels: Vec<LabelValue>,
}

impl MetricRecord {
    /// Resolved value of the label with backend name `name`.
    pub fn label(&self, name: &str) -> Option<&str> {
        self.labels
            .iter()
            .find(|l| l.name == name)
            .map(|l| l.value.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupStats {
    pub total_count: usize,
    pub warning_count: usize,
    pub critical_count: usize,
    /// warning + critical
    pub alert_count: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricGroup {
    #[serde(rename = "type")]
    pub group_type: String,
    /// Every collected metric, including ones hidden from the table.
    pub metrics_by_name: BTreeMap<String, Vec<MetricRecord>>,
    /// Table order; excludes metrics configured with `show_in_table = false`.
    pub metric_order: Vec<String>,
    pub stats: GroupStats,
}
