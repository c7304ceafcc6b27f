use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;

use super::QueryError;
use crate::engine::{Labels, QuerySource, Sample, Vector};

/// Instant-query client for one source's metrics backend.
pub struct HttpQuerier {
    base_url: String,
    client: Client,
}

impl HttpQuerier {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            client: Client::new(),
        }
    }
}

#[async_trait]
impl QuerySource for HttpQuerier {
    async fn query(&self, expr: &str, at: DateTime<Utc>) -> Result<Vector, QueryError> {
        let url = format!("{}/api/v1/query", self.base_url);
        let time = at.to_rfc3339();
        let resp = self
            .client
            .get(&url)
            .query(&[("query", expr), ("time", time.as_str())])
            .send()
            .await?;
        let body = resp.bytes().await?;
        let vector = parse_response(expr, &body)?;
        tracing::debug!(query = expr, samples = vector.len(), "instant query succeeded");
        Ok(vector)
    }
}

#[derive(Deserialize)]
struct ApiResponse {
    status: String,
    #[serde(default)]
    data: Option<ResultData>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Deserialize)]
struct ResultData {
    #[serde(rename = "resultType")]
    result_type: String,
    #[serde(default)]
    result: serde_json::Value,
}

#[derive(Deserialize)]
struct VectorSample {
    metric: Labels,
    value: (f64, String),
}

/// Maps a backend response body onto the engine's vector type. Only the
/// `vector` result shape is supported; anything else is a hard error naming
/// the shape and the original expression.
pub(crate) fn parse_response(expr: &str, body: &[u8]) -> Result<Vector, QueryError> {
    let resp: ApiResponse = serde_json::from_slice(body)?;
    if resp.status != "success" {
        return Err(QueryError::Backend {
            status: resp.status,
            message: resp.error.unwrap_or_default(),
        });
    }
    let data = resp.data.ok_or_else(|| QueryError::Backend {
        status: "success".into(),
        message: "missing data section".into(),
    })?;
    if data.result_type != "vector" {
        return Err(QueryError::UnsupportedShape {
            shape: data.result_type,
            expr: expr.to_string(),
        });
    }

    let samples: Vec<VectorSample> = serde_json::from_value(data.result)?;
    samples
        .into_iter()
        .map(|s| {
            let value = s
                .value
                .1
                .parse::<f64>()
                .map_err(|e| QueryError::Decode(format!("sample value {:?}: {e}", s.value.1)))?;
            Ok(Sample {
                labels: s.metric,
                timestamp_ms: (s.value.0 * 1000.0).round() as i64,
                value,
            })
        })
        .collect()
}
