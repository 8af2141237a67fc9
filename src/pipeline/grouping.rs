// Filing records into their configured group

use crate::config::MetricDefinition;
use crate::models::{MetricGroup, MetricRecord};

impl MetricGroup {
    pub fn new(group_type: impl Into<String>) -> Self {
        Self {
            group_type: group_type.into(),
            ..Default::default()
        }
    }

    /// Stores all records for `definition` and appends it to the table order unless it
    /// is explicitly hidden. Records are kept even when hidden.
    pub fn insert_metric(&mut self, definition: &MetricDefinition, records: Vec<MetricRecord>) {
        self.metrics_by_name.insert(definition.name.clone(), records);
        let listed = self.metric_order.contains(&definition.name);
        if definition.show_in_table.is_displayed() && !listed {
            self.metric_order.push(definition.name.clone());
        }
    }

    /// All records across metric names.
    pub fn records(&self) -> impl Iterator<Item = &MetricRecord> {
        self.metrics_by_name.values().flatten()
    }
}
