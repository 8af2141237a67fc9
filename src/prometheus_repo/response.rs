// Decoding of /api/v1/query response bodies

use serde::Deserialize;
use std::collections::BTreeMap;

use super::{QueryError, Sample};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiResponse {
    status: String,
    data: Option<QueryData>,
    error_type: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QueryData {
    result_type: String,
    #[serde(default)]
    result: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct VectorSample {
    #[serde(default)]
    metric: BTreeMap<String, String>,
    /// [unix_seconds, "value"]
    value: (f64, String),
}

/// Parses an instant-query body into samples. Only `vector` results are accepted.
pub fn parse_query_response(body: &str) -> Result<Vec<Sample>, QueryError> {
    let response: ApiResponse = serde_json::from_str(body)?;
    if response.status != "success" {
        return Err(QueryError::Api {
            error_type: response.error_type.unwrap_or_else(|| "unknown".into()),
            error: response.error.unwrap_or_default(),
        });
    }
    let Some(data) = response.data else {
        return Ok(Vec::new());
    };
    if data.result_type != "vector" {
        return Err(QueryError::UnexpectedResultType(data.result_type));
    }
    let raw: Vec<VectorSample> = serde_json::from_value(data.result)?;
    raw.into_iter()
        .map(|s| {
            let (_, text) = s.value;
            let value = text
                .parse::<f64>()
                .map_err(|_| QueryError::InvalidValue(text.clone()))?;
            Ok(Sample {
                labels: s.metric,
                value,
            })
        })
        .collect()
}
