// Metrics backend: query interface + Prometheus HTTP API client

mod response;

pub use response::parse_query_response;

use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::Client;
use std::collections::BTreeMap;
use std::future::Future;
use std::time::Duration;
use tracing::instrument;

/// One element of an instant-vector result.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub labels: BTreeMap<String, String>,
    pub value: f64,
}

#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected HTTP status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("query rejected ({error_type}): {error}")]
    Api { error_type: String, error: String },
    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("unsupported result type {0:?}, expected vector")]
    UnexpectedResultType(String),
    #[error("invalid sample value {0:?}")]
    InvalidValue(String),
    #[error("query timed out after {0:?}")]
    Timeout(Duration),
}

/// Point-in-time query against a metrics backend.
pub trait QueryClient: Send + Sync {
    fn query(
        &self,
        query: &str,
        at: DateTime<Utc>,
    ) -> impl Future<Output = Result<Vec<Sample>, QueryError>> + Send;
}

pub struct PrometheusClient {
    base_url: String,
    http_client: Client,
}

impl PrometheusClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let http_client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(base_url, http_client))
    }

    pub fn with_client(base_url: impl Into<String>, http_client: Client) -> Self {
        Self {
            base_url: base_url.into(),
            http_client,
        }
    }

    pub fn query_url(&self) -> String {
        format!("{}/api/v1/query", self.base_url.trim_end_matches('/'))
    }
}

impl QueryClient for PrometheusClient {
    #[instrument(skip(self), fields(repo = "prometheus", operation = "query"))]
    async fn query(&self, query: &str, at: DateTime<Utc>) -> Result<Vec<Sample>, QueryError> {
        let time = at.to_rfc3339_opts(SecondsFormat::Millis, true);
        let response = self
            .http_client
            .get(self.query_url())
            .query(&[("query", query), ("time", time.as_str())])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        match parse_query_response(&body) {
            // Error bodies from proxies in front of Prometheus are usually not JSON.
            Err(QueryError::Decode(_)) if !status.is_success() => Err(QueryError::Status {
                status: status.as_u16(),
                body,
            }),
            other => other,
        }
    }
}
