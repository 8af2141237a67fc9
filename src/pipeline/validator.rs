// Sample plausibility and label completeness checks.
// Only the disk capacity metrics are range-checked; other names pass unconditionally.

use std::collections::BTreeMap;

use crate::models::{LabelValue, MetricRecord};

use super::names::{DISK_AVAILABLE, DISK_TOTAL, DISK_USAGE, MISSING_LABEL_VALUE};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("disk total must be a positive number, got {0:.2}")]
    DiskTotalNotPositive(f64),
    #[error("disk total implausibly large: {value:.2} bytes (max {max:.2})")]
    DiskTotalTooLarge { value: f64, max: f64 },
    #[error("disk available must be a finite number >= 0, got {0:.2}")]
    DiskAvailableNegative(f64),
    #[error("disk usage outside 0-100%: {0:.2}%")]
    DiskUsageOutOfRange(f64),
    #[error("label count mismatch: expected {expected}, got {actual}")]
    LabelCountMismatch { expected: usize, actual: usize },
    #[error("label {0:?} is not configured for this metric")]
    UnconfiguredLabel(String),
    #[error("label {0:?} has no value")]
    EmptyLabel(String),
}

/// Value plausibility. `disk_total_max` is the configured ceiling for disk total bytes.
/// NaN never passes a disk check.
pub fn validate_metric_value(
    name: &str,
    value: f64,
    disk_total_max: f64,
) -> Result<(), ValidationError> {
    match name {
        DISK_TOTAL => {
            if value.is_nan() || value <= 0.0 {
                return Err(ValidationError::DiskTotalNotPositive(value));
            }
            if value > disk_total_max {
                return Err(ValidationError::DiskTotalTooLarge {
                    value,
                    max: disk_total_max,
                });
            }
        }
        DISK_AVAILABLE => {
            if !value.is_finite() || value < 0.0 {
                return Err(ValidationError::DiskAvailableNegative(value));
            }
        }
        DISK_USAGE => {
            if !(0.0..=100.0).contains(&value) {
                return Err(ValidationError::DiskUsageOutOfRange(value));
            }
        }
        _ => {}
    }
    Ok(())
}

fn is_blank(value: &str) -> bool {
    value.is_empty() || value == MISSING_LABEL_VALUE
}

/// False if any resolved label is empty or the "-" placeholder.
pub fn validate_labels(labels: &[LabelValue]) -> bool {
    labels.iter().all(|l| !is_blank(&l.value))
}

/// Checks a built record against the metric's configured labels (name -> alias).
pub fn validate_record_completeness(
    record: &MetricRecord,
    configured: &BTreeMap<String, String>,
) -> Result<(), ValidationError> {
    if record.labels.len() != configured.len() {
        return Err(ValidationError::LabelCountMismatch {
            expected: configured.len(),
            actual: record.labels.len(),
        });
    }
    for label in &record.labels {
        if !configured.contains_key(&label.name) {
            return Err(ValidationError::UnconfiguredLabel(label.name.clone()));
        }
        if is_blank(&label.value) {
            return Err(ValidationError::EmptyLabel(label.name.clone()));
        }
    }
    Ok(())
}
