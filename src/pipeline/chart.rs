// Chart-ready label/value arrays for the renderer

use std::collections::{BTreeMap, BTreeSet};

use crate::models::{ChartData, MetricGroup};

pub fn chart_key(group_type: &str, metric_name: &str) -> String {
    format!("{group_type}_{metric_name}")
}

/// One series per group/metric. Slots follow that metric's sorted label values and hold
/// the value of the record whose first label matches (0 when none does).
pub fn build_chart_data<'a>(groups: impl IntoIterator<Item = &'a MetricGroup>) -> ChartData {
    let mut all_labels = BTreeSet::new();
    let mut series = BTreeMap::new();

    for group in groups {
        for (metric_name, records) in &group.metrics_by_name {
            let mut slots: BTreeMap<&str, f64> = BTreeMap::new();
            for record in records {
                for label in &record.labels {
                    slots.entry(label.value.as_str()).or_insert(0.0);
                    all_labels.insert(label.value.clone());
                }
            }
            for record in records {
                if let Some(first) = record.labels.first() {
                    slots.insert(first.value.as_str(), record.value);
                }
            }
            series.insert(
                chart_key(&group.group_type, metric_name),
                slots.into_values().collect(),
            );
        }
    }

    ChartData {
        labels: all_labels.into_iter().collect(),
        series,
    }
}
