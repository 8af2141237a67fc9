// Per-group alert counts, computed once after collection

use crate::models::{GroupStats, MetricGroup, Severity};

pub fn group_stats(group: &MetricGroup) -> GroupStats {
    let mut stats = GroupStats::default();
    for record in group.records() {
        stats.total_count += 1;
        match record.status {
            Severity::Warning => stats.warning_count += 1,
            Severity::Critical => stats.critical_count += 1,
            Severity::Normal => {}
        }
    }
    stats.alert_count = stats.warning_count + stats.critical_count;
    stats
}

/// Replaces each group's stats with a fresh count.
pub fn apply_group_stats<'a>(groups: impl IntoIterator<Item = &'a mut MetricGroup>) {
    for group in groups {
        group.stats = group_stats(group);
    }
}
