use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};

/// 1 PiB in bytes. Upper plausibility bound for a single filesystem's total capacity.
pub const PIB: f64 = 1024.0 * 1024.0 * 1024.0 * 1024.0 * 1024.0;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub prometheus: PrometheusConfig,
    pub project: ProjectConfig,
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
    /// HTTP/WS endpoints for the latest report. Omit to run without a server.
    pub server: Option<ServerConfig>,
    #[serde(default)]
    pub validation: ValidationConfig,
    pub metric_types: Vec<MetricGroupConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PrometheusConfig {
    pub url: String,
    /// Upper bound for a single instant query; a query that exceeds it is skipped.
    #[serde(default = "default_query_timeout_ms")]
    pub query_timeout_ms: u64,
}

fn default_query_timeout_ms() -> u64 {
    10_000
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProjectConfig {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportConfig {
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
        }
    }
}

fn default_output_dir() -> String {
    "reports".into()
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleConfig {
    /// Cron expression (local time). Five-field expressions get a leading seconds field.
    /// When unset the binary collects once and exits (or serves that single report).
    pub cron: Option<String>,
    #[serde(default = "default_true")]
    pub run_on_startup: bool,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            cron: None,
            run_on_startup: true,
        }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    /// Max number of finished reports buffered for /ws/reports subscribers.
    #[serde(default = "default_broadcast_capacity")]
    pub broadcast_capacity: usize,
}

fn default_broadcast_capacity() -> usize {
    16
}

/// Data-quality constants. Defaults are the historical values; deployments with
/// unusual storage should review both.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ValidationConfig {
    #[serde(default = "default_disk_total_max_bytes")]
    pub disk_total_max_bytes: f64,
    /// Max disagreement (percentage points) between a reported disk usage and the
    /// usage computed from total/available before the computed value wins.
    #[serde(default = "default_disk_usage_tolerance_pct")]
    pub disk_usage_tolerance_pct: f64,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            disk_total_max_bytes: default_disk_total_max_bytes(),
            disk_usage_tolerance_pct: default_disk_usage_tolerance_pct(),
        }
    }
}

fn default_disk_total_max_bytes() -> f64 {
    PIB
}

fn default_disk_usage_tolerance_pct() -> f64 {
    5.0
}

/// One report section: a named, ordered list of metric definitions.
#[derive(Debug, Clone, Deserialize)]
pub struct MetricGroupConfig {
    #[serde(rename = "type")]
    pub group_type: String,
    pub metrics: Vec<MetricDefinition>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricDefinition {
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: MetricKind,
    pub query: String,
    #[serde(default)]
    pub threshold: f64,
    #[serde(default)]
    pub threshold_type: ThresholdMode,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub description: String,
    /// Backend label name -> display alias.
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    #[serde(default)]
    pub show_in_table: Visibility,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    /// Informational only; never alerts.
    Display,
    /// Threshold-checked. Unknown kinds are treated as monitoring.
    #[default]
    #[serde(other)]
    Monitoring,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdMode {
    #[default]
    #[serde(alias = "")]
    Greater,
    GreaterEqual,
    Less,
    LessEqual,
    Equal,
    /// Any other comparison string; classifies as normal.
    #[serde(other)]
    Unrecognized,
}

/// Table visibility. `Unspecified` (key absent) shows the metric, same as `Visible`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(from = "Option<bool>")]
pub enum Visibility {
    Visible,
    Hidden,
    #[default]
    Unspecified,
}

impl Visibility {
    pub fn is_displayed(self) -> bool {
        !matches!(self, Visibility::Hidden)
    }
}

impl From<Option<bool>> for Visibility {
    fn from(flag: Option<bool>) -> Self {
        match flag {
            Some(true) => Visibility::Visible,
            Some(false) => Visibility::Hidden,
            None => Visibility::Unspecified,
        }
    }
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        let s = std::fs::read_to_string(&path)?;
        Self::load_from_str(&s)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            !self.prometheus.url.trim().is_empty(),
            "prometheus.url must be non-empty"
        );
        anyhow::ensure!(
            self.prometheus.query_timeout_ms > 0,
            "prometheus.query_timeout_ms must be > 0, got {}",
            self.prometheus.query_timeout_ms
        );
        anyhow::ensure!(
            !self.report.output_dir.is_empty(),
            "report.output_dir must be non-empty"
        );
        if let Some(ref expr) = self.schedule.cron {
            crate::scheduler::parse_schedule(expr).map_err(|e| {
                anyhow::anyhow!("schedule.cron is not a valid cron expression ({expr}): {e}")
            })?;
        }
        if let Some(ref server) = self.server {
            anyhow::ensure!(
                server.port > 0,
                "server.port must be between 1 and 65535, got {}",
                server.port
            );
            anyhow::ensure!(
                server.broadcast_capacity > 0,
                "server.broadcast_capacity must be > 0, got {}",
                server.broadcast_capacity
            );
        }
        anyhow::ensure!(
            self.validation.disk_total_max_bytes > 0.0,
            "validation.disk_total_max_bytes must be > 0, got {}",
            self.validation.disk_total_max_bytes
        );
        anyhow::ensure!(
            self.validation.disk_usage_tolerance_pct >= 0.0,
            "validation.disk_usage_tolerance_pct must be >= 0, got {}",
            self.validation.disk_usage_tolerance_pct
        );
        anyhow::ensure!(
            !self.metric_types.is_empty(),
            "metric_types must contain at least one group"
        );

        let mut group_types = HashSet::new();
        for group in &self.metric_types {
            anyhow::ensure!(
                !group.group_type.trim().is_empty(),
                "metric_types.type must be non-empty"
            );
            anyhow::ensure!(
                group_types.insert(group.group_type.as_str()),
                "metric_types.type must be unique, got duplicate {:?}",
                group.group_type
            );
            let mut names = HashSet::new();
            for metric in &group.metrics {
                anyhow::ensure!(
                    !metric.name.trim().is_empty(),
                    "metric_types.metrics.name must be non-empty (group {:?})",
                    group.group_type
                );
                anyhow::ensure!(
                    names.insert(metric.name.as_str()),
                    "metric_types.metrics.name must be unique within a group, got duplicate {:?} in {:?}",
                    metric.name,
                    group.group_type
                );
                anyhow::ensure!(
                    !metric.query.trim().is_empty(),
                    "metric_types.metrics.query must be non-empty (metric {:?})",
                    metric.name
                );
                anyhow::ensure!(
                    metric.threshold.is_finite(),
                    "metric_types.metrics.threshold must be finite (metric {:?})",
                    metric.name
                );
            }
        }
        Ok(())
    }
}
