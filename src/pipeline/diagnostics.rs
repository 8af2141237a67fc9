// Per-run diagnostics: counters + ordered events, mirrored to tracing.
// Passed explicitly through the pipeline as `&mut Diagnostics`.

use crate::models::DataQuality;
use crate::prometheus_repo::QueryError;

use super::names::is_disk_metric;
use super::validator::ValidationError;

#[derive(Debug, Clone, PartialEq)]
pub enum DiagnosticEvent {
    QueryFailed {
        metric: String,
        query: String,
        error: String,
    },
    ValueRejected {
        metric: String,
        value: f64,
        reason: String,
    },
    LabelMissing {
        metric: String,
        label: String,
    },
    RecordDropped {
        metric: String,
        reason: String,
    },
    DiskUsageCorrected {
        host: String,
        mount_point: String,
        reported: f64,
        computed: f64,
    },
}

#[derive(Debug, Default)]
pub struct Diagnostics {
    events: Vec<DiagnosticEvent>,
    quality: DataQuality,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[DiagnosticEvent] {
        &self.events
    }

    pub fn quality(&self) -> DataQuality {
        self.quality
    }

    pub fn query_failed(&mut self, metric: &str, query: &str, error: &QueryError) {
        tracing::warn!(metric = %metric, query = %query, error = %error, "query failed; metric skipped");
        self.quality.failed_queries += 1;
        self.events.push(DiagnosticEvent::QueryFailed {
            metric: metric.to_string(),
            query: query.to_string(),
            error: error.to_string(),
        });
    }

    pub fn sample_seen(&mut self) {
        self.quality.total_samples += 1;
    }

    pub fn sample_accepted(&mut self) {
        self.quality.valid_samples += 1;
    }

    pub fn value_rejected(&mut self, metric: &str, value: f64, error: &ValidationError) {
        tracing::warn!(metric = %metric, value, error = %error, "sample value rejected");
        self.quality.invalid_samples += 1;
        if is_disk_metric(metric) {
            self.quality.disk_anomalies += 1;
        }
        self.events.push(DiagnosticEvent::ValueRejected {
            metric: metric.to_string(),
            value,
            reason: error.to_string(),
        });
    }

    pub fn label_missing(&mut self, metric: &str, label: &str) {
        tracing::debug!(metric = %metric, label = %label, "label missing or empty");
        self.events.push(DiagnosticEvent::LabelMissing {
            metric: metric.to_string(),
            label: label.to_string(),
        });
    }

    /// Sample dropped because its labels are incomplete.
    pub fn record_dropped(&mut self, metric: &str, reason: impl Into<String>) {
        let reason = reason.into();
        tracing::warn!(metric = %metric, reason = %reason, "incomplete labels; sample dropped");
        self.quality.invalid_samples += 1;
        self.quality.incomplete_labels += 1;
        self.events.push(DiagnosticEvent::RecordDropped {
            metric: metric.to_string(),
            reason,
        });
    }

    pub fn disk_usage_corrected(
        &mut self,
        host: &str,
        mount_point: &str,
        reported: f64,
        computed: f64,
    ) {
        tracing::warn!(
            host = %host,
            mount_point = %mount_point,
            reported,
            computed,
            "disk usage inconsistent with total/used; using computed value"
        );
        self.events.push(DiagnosticEvent::DiskUsageCorrected {
            host: host.to_string(),
            mount_point: mount_point.to_string(),
            reported,
            computed,
        });
    }

    /// Logs the run's data-quality counters at INFO.
    pub fn log_summary(&self) {
        let q = &self.quality;
        tracing::info!(
            total_samples = q.total_samples,
            valid_samples = q.valid_samples,
            invalid_samples = q.invalid_samples,
            disk_anomalies = q.disk_anomalies,
            incomplete_labels = q.incomplete_labels,
            failed_queries = q.failed_queries,
            "collection data quality"
        );
    }
}
