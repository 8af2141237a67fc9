// One collection run over every configured metric. Queries run sequentially; a failed
// or timed-out query skips that metric and never aborts the run.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;

use crate::config::{AppConfig, MetricDefinition};
use crate::models::{LabelValue, MetricGroup, MetricRecord, ReportData};
use crate::prometheus_repo::{QueryClient, QueryError, Sample};

use super::chart::build_chart_data;
use super::classifier::classify;
use super::diagnostics::Diagnostics;
use super::host::HostAggregator;
use super::names::MISSING_LABEL_VALUE;
use super::stats::apply_group_stats;
use super::validator::{validate_labels, validate_metric_value, validate_record_completeness};

pub struct Collector<C> {
    client: C,
    config: Arc<AppConfig>,
    aggregator: HostAggregator,
}

impl<C: QueryClient> Collector<C> {
    pub fn new(client: C, config: Arc<AppConfig>) -> Self {
        let aggregator = HostAggregator::new(config.validation.disk_usage_tolerance_pct);
        Self {
            client,
            config,
            aggregator,
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// For wiring extra metric-name handlers into host aggregation.
    pub fn aggregator_mut(&mut self) -> &mut HostAggregator {
        &mut self.aggregator
    }

    pub async fn collect(&self) -> ReportData {
        let mut diagnostics = Diagnostics::new();
        self.collect_with(&mut diagnostics).await
    }

    #[instrument(skip_all, fields(project = %self.config.project.name))]
    pub async fn collect_with(&self, diagnostics: &mut Diagnostics) -> ReportData {
        let timestamp = Utc::now();
        let query_timeout = Duration::from_millis(self.config.prometheus.query_timeout_ms);
        let disk_total_max = self.config.validation.disk_total_max_bytes;

        let mut metric_groups = BTreeMap::new();
        let mut group_order = Vec::with_capacity(self.config.metric_types.len());

        for group_config in &self.config.metric_types {
            let mut group = MetricGroup::new(&group_config.group_type);
            for definition in &group_config.metrics {
                let at = Utc::now();
                let query = self.client.query(&definition.query, at);
                let samples = match tokio::time::timeout(query_timeout, query).await {
                    Ok(Ok(samples)) => samples,
                    Ok(Err(e)) => {
                        diagnostics.query_failed(&definition.name, &definition.query, &e);
                        continue;
                    }
                    Err(_) => {
                        let e = QueryError::Timeout(query_timeout);
                        diagnostics.query_failed(&definition.name, &definition.query, &e);
                        continue;
                    }
                };
                tracing::debug!(
                    metric = %definition.name,
                    samples = samples.len(),
                    "query returned"
                );
                let records = samples
                    .iter()
                    .filter_map(|s| build_record(definition, s, at, disk_total_max, diagnostics))
                    .collect();
                group.insert_metric(definition, records);
            }
            group_order.push(group_config.group_type.clone());
            metric_groups.insert(group_config.group_type.clone(), group);
        }

        apply_group_stats(metric_groups.values_mut());

        let host_summary = self.aggregator.aggregate(
            group_order
                .iter()
                .filter_map(|t| metric_groups.get(t))
                .flat_map(MetricGroup::records),
            diagnostics,
        );
        let chart_data = build_chart_data(metric_groups.values());
        diagnostics.log_summary();

        ReportData {
            timestamp,
            project: self.config.project.name.clone(),
            metric_groups,
            group_order,
            host_summary,
            chart_data,
            data_quality: diagnostics.quality(),
        }
    }
}

/// Validates and classifies one sample. Returns `None` (and records why) when the value
/// is implausible or a configured label is missing.
pub fn build_record(
    definition: &MetricDefinition,
    sample: &Sample,
    at: DateTime<Utc>,
    disk_total_max: f64,
    diagnostics: &mut Diagnostics,
) -> Option<MetricRecord> {
    diagnostics.sample_seen();
    if let Err(e) = validate_metric_value(&definition.name, sample.value, disk_total_max) {
        diagnostics.value_rejected(&definition.name, sample.value, &e);
        return None;
    }

    let labels: Vec<LabelValue> = definition
        .labels
        .iter()
        .map(|(name, alias)| {
            let value = match sample.labels.get(name) {
                Some(v) if !v.is_empty() => v.clone(),
                _ => {
                    diagnostics.label_missing(&definition.name, name);
                    MISSING_LABEL_VALUE.to_string()
                }
            };
            LabelValue {
                name: name.clone(),
                alias: alias.clone(),
                value,
            }
        })
        .collect();
    if !validate_labels(&labels) {
        diagnostics.record_dropped(&definition.name, "label missing or empty");
        return None;
    }

    let status = classify(
        sample.value,
        definition.threshold,
        definition.threshold_type,
        definition.kind,
    );
    let record = MetricRecord {
        name: definition.name.clone(),
        description: definition.description.clone(),
        value: sample.value,
        threshold: definition.threshold,
        unit: definition.unit.clone(),
        status,
        status_text: status.status_text().to_string(),
        timestamp: at,
        labels,
    };
    if let Err(e) = validate_record_completeness(&record, &definition.labels) {
        diagnostics.record_dropped(&definition.name, e.to_string());
        return None;
    }

    diagnostics.sample_accepted();
    Some(record)
}
