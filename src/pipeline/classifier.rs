// Threshold classification. Pure; the warning band is 80% of the threshold for
// upper bounds and 120% for lower bounds.

use crate::config::{MetricKind, ThresholdMode};
use crate::models::Severity;

const UPPER_WARNING_RATIO: f64 = 0.8;
const LOWER_WARNING_RATIO: f64 = 1.2;

pub fn classify(value: f64, threshold: f64, mode: ThresholdMode, kind: MetricKind) -> Severity {
    if kind == MetricKind::Display {
        return Severity::Normal;
    }
    match mode {
        ThresholdMode::Greater => {
            if value > threshold {
                Severity::Critical
            } else if value >= threshold * UPPER_WARNING_RATIO {
                Severity::Warning
            } else {
                Severity::Normal
            }
        }
        ThresholdMode::GreaterEqual => {
            if value >= threshold {
                Severity::Critical
            } else if value >= threshold * UPPER_WARNING_RATIO {
                Severity::Warning
            } else {
                Severity::Normal
            }
        }
        ThresholdMode::Less => {
            if value < threshold {
                Severity::Normal
            } else if value <= threshold * LOWER_WARNING_RATIO {
                Severity::Warning
            } else {
                Severity::Critical
            }
        }
        ThresholdMode::LessEqual => {
            if value <= threshold {
                Severity::Normal
            } else if value <= threshold * LOWER_WARNING_RATIO {
                Severity::Warning
            } else {
                Severity::Critical
            }
        }
        ThresholdMode::Equal => {
            if value == threshold {
                Severity::Normal
            } else {
                Severity::Critical
            }
        }
        ThresholdMode::Unrecognized => Severity::Normal,
    }
}
