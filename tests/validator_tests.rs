// Sample validation: disk plausibility bounds and label completeness

mod common;

use common::{GIB, record};
use promreport::config::PIB;
use promreport::models::{LabelValue, Severity};
use promreport::pipeline::{
    ValidationError, validate_labels, validate_metric_value, validate_record_completeness,
};
use std::collections::BTreeMap;

fn check(name: &str, value: f64) -> Result<(), ValidationError> {
    validate_metric_value(name, value, PIB)
}

#[test]
fn test_disk_total_bounds() {
    assert!(check("磁盘总量", 100.0 * GIB).is_ok());
    assert!(check("磁盘总量", PIB).is_ok(), "ceiling is inclusive");
    assert_eq!(
        check("磁盘总量", 0.0),
        Err(ValidationError::DiskTotalNotPositive(0.0))
    );
    assert!(matches!(
        check("磁盘总量", -1024.0),
        Err(ValidationError::DiskTotalNotPositive(_))
    ));
    assert!(matches!(
        check("磁盘总量", 2.0 * PIB),
        Err(ValidationError::DiskTotalTooLarge { .. })
    ));
}

#[test]
fn test_disk_total_ceiling_is_configurable() {
    assert!(validate_metric_value("磁盘总量", 2.0 * PIB, 4.0 * PIB).is_ok());
    assert!(validate_metric_value("磁盘总量", 2.0 * GIB, GIB).is_err());
}

#[test]
fn test_disk_values_reject_non_finite() {
    for name in ["磁盘总量", "磁盘可用量", "磁盘使用率"] {
        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert!(check(name, bad).is_err(), "{name} = {bad}");
        }
    }
    // non-disk metrics are not second-guessed
    assert!(check("CPU使用率", f64::NAN).is_ok());
}

#[test]
fn test_disk_available_bounds() {
    assert!(check("磁盘可用量", 50.0 * GIB).is_ok());
    assert!(check("磁盘可用量", 0.0).is_ok(), "a full disk has zero available");
    assert_eq!(
        check("磁盘可用量", -1024.0),
        Err(ValidationError::DiskAvailableNegative(-1024.0))
    );
}

#[test]
fn test_disk_usage_bounds() {
    for ok in [0.0, 50.5, 100.0] {
        assert!(check("磁盘使用率", ok).is_ok(), "{ok}");
    }
    for bad in [-0.1, 100.01, 105.8] {
        assert_eq!(
            check("磁盘使用率", bad),
            Err(ValidationError::DiskUsageOutOfRange(bad)),
            "{bad}"
        );
    }
}

#[test]
fn test_other_metrics_pass_unconditionally() {
    for value in [-5.0, 0.0, 1e300, 250.0] {
        assert!(check("CPU使用率", value).is_ok());
        assert!(check("内存使用率", value).is_ok());
        assert!(check("disk_usage_custom", value).is_ok());
    }
}

fn labels(pairs: &[(&str, &str)]) -> Vec<LabelValue> {
    pairs
        .iter()
        .map(|(n, v)| LabelValue {
            name: n.to_string(),
            alias: n.to_string(),
            value: v.to_string(),
        })
        .collect()
}

#[test]
fn test_validate_labels() {
    assert!(validate_labels(&labels(&[("instance", "10.0.0.1:9100")])));
    assert!(validate_labels(&[]));
    assert!(!validate_labels(&labels(&[("instance", "")])));
    assert!(!validate_labels(&labels(&[
        ("instance", "10.0.0.1:9100"),
        ("mountpoint", "-")
    ])));
}

fn configured(names: &[&str]) -> BTreeMap<String, String> {
    names
        .iter()
        .map(|n| (n.to_string(), format!("{n}-alias")))
        .collect()
}

#[test]
fn test_record_completeness_accepts_matching_labels() {
    let r = record(
        "磁盘使用率",
        40.0,
        Severity::Normal,
        &[("instance", "h1:9100"), ("mountpoint", "/")],
    );
    assert!(validate_record_completeness(&r, &configured(&["instance", "mountpoint"])).is_ok());
}

#[test]
fn test_record_completeness_count_mismatch() {
    let r = record("CPU使用率", 40.0, Severity::Normal, &[("instance", "h1:9100")]);
    assert_eq!(
        validate_record_completeness(&r, &configured(&["instance", "job"])),
        Err(ValidationError::LabelCountMismatch {
            expected: 2,
            actual: 1
        })
    );
}

#[test]
fn test_record_completeness_unconfigured_label() {
    let r = record("CPU使用率", 40.0, Severity::Normal, &[("job", "node")]);
    assert_eq!(
        validate_record_completeness(&r, &configured(&["instance"])),
        Err(ValidationError::UnconfiguredLabel("job".into()))
    );
}

#[test]
fn test_record_completeness_placeholder_value() {
    let r = record("CPU使用率", 40.0, Severity::Normal, &[("instance", "-")]);
    assert_eq!(
        validate_record_completeness(&r, &configured(&["instance"])),
        Err(ValidationError::EmptyLabel("instance".into()))
    );
}
