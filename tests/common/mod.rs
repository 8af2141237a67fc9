// Shared test helpers: in-memory query client, record builders, config fixtures

#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use promreport::config::AppConfig;
use promreport::models::{LabelValue, MetricRecord, Severity};
use promreport::prometheus_repo::{QueryClient, QueryError, Sample};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

pub const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Answers queries from a fixed table. Unknown queries return an empty vector.
#[derive(Default)]
pub struct FakeClient {
    responses: HashMap<String, Result<Vec<Sample>, String>>,
    slow: HashMap<String, Duration>,
    calls: Mutex<Vec<String>>,
}

impl FakeClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, query: &str, samples: Vec<Sample>) -> Self {
        self.responses.insert(query.to_string(), Ok(samples));
        self
    }

    pub fn failing(mut self, query: &str, message: &str) -> Self {
        self.responses
            .insert(query.to_string(), Err(message.to_string()));
        self
    }

    /// Query that sleeps for `delay` before answering.
    pub fn slow(mut self, query: &str, delay: Duration) -> Self {
        self.slow.insert(query.to_string(), delay);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl QueryClient for FakeClient {
    async fn query(&self, query: &str, _at: DateTime<Utc>) -> Result<Vec<Sample>, QueryError> {
        self.calls.lock().unwrap().push(query.to_string());
        if let Some(delay) = self.slow.get(query) {
            tokio::time::sleep(*delay).await;
        }
        match self.responses.get(query) {
            Some(Ok(samples)) => Ok(samples.clone()),
            Some(Err(message)) => Err(QueryError::Api {
                error_type: "bad_data".into(),
                error: message.clone(),
            }),
            None => Ok(Vec::new()),
        }
    }
}

pub fn sample(labels: &[(&str, &str)], value: f64) -> Sample {
    Sample {
        labels: labels
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
        value,
    }
}

pub fn ts(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
}

/// Record with `(label name, value)` pairs; aliases mirror the label name.
pub fn record(name: &str, value: f64, status: Severity, labels: &[(&str, &str)]) -> MetricRecord {
    record_at(name, value, status, labels, ts(0))
}

pub fn record_at(
    name: &str,
    value: f64,
    status: Severity,
    labels: &[(&str, &str)],
    timestamp: DateTime<Utc>,
) -> MetricRecord {
    MetricRecord {
        name: name.to_string(),
        description: String::new(),
        value,
        threshold: 0.0,
        unit: String::new(),
        status,
        status_text: status.status_text().to_string(),
        timestamp,
        labels: labels
            .iter()
            .map(|(n, v)| LabelValue {
                name: n.to_string(),
                alias: n.to_string(),
                value: v.to_string(),
            })
            .collect(),
    }
}

pub const BASE_CONFIG: &str = r#"
[prometheus]
url = "http://localhost:9090"
query_timeout_ms = 2000

[project]
name = "测试项目"
"#;

/// BASE_CONFIG followed by `metric_types` TOML.
pub fn config_with(metric_types: &str) -> AppConfig {
    AppConfig::load_from_str(&format!("{BASE_CONFIG}\n{metric_types}")).expect("valid config")
}
