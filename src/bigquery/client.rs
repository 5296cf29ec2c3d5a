//! Call-scoped BigQuery REST client.
//!
//! One client is built per tool invocation and dropped afterwards:
//! credentials are resolved fresh each call, so concurrent invocations
//! never share a handle and a revoked key is never served from a cache.

use crate::bigquery::credentials::{self, ServiceAccountKey};
use crate::bigquery::rows;
use crate::error::{GatewayError, GatewayResult};
use crate::models::QueryRequest;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::time::Duration;
use tracing::debug;

/// Authenticated warehouse client, scoped to a single tool call.
pub struct BigQueryClient {
    http: reqwest::Client,
    access_token: String,
    endpoint: String,
}

impl BigQueryClient {
    /// Authenticate with a resolved service account key.
    ///
    /// The endpoint is the configured API base URL. The HTTP timeout
    /// bounds both the token exchange and the query round trip.
    pub async fn connect(
        key: &ServiceAccountKey,
        endpoint: impl Into<String>,
        timeout: Duration,
    ) -> GatewayResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::execution(format!("Failed to build HTTP client: {}", e)))?;

        let access_token = credentials::fetch_access_token(&http, key).await?;

        Ok(Self {
            http,
            access_token,
            endpoint: endpoint.into(),
        })
    }

    /// Submit a query and materialize the complete result set.
    ///
    /// Blocking from the caller's perspective: the future resolves only
    /// when the warehouse has answered or the timeout elapsed. No retry
    /// is performed here; a raw caller query is not known to be
    /// idempotent against the billing model.
    pub async fn query(
        &self,
        project_id: &str,
        request: &QueryRequest,
    ) -> GatewayResult<Vec<serde_json::Map<String, JsonValue>>> {
        let url = format!("{}/projects/{}/queries", self.endpoint, project_id);
        let body = ApiQueryRequest::from_request(request);

        debug!(project = %project_id, params = body.query_parameters.len(), "Submitting query");

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let payload = response.bytes().await.unwrap_or_default();
            return Err(classify_api_error(status.as_u16(), &payload));
        }

        let query_response: ApiQueryResponse = response
            .json()
            .await
            .map_err(|_| GatewayError::execution("Warehouse returned an unexpected payload"))?;

        if !query_response.job_complete.unwrap_or(true) {
            return Err(GatewayError::timeout(
                "Query did not complete within the warehouse timeout",
            ));
        }

        Ok(rows::materialize(
            query_response.schema.as_ref(),
            query_response.rows.unwrap_or_default(),
        ))
    }
}

/// Classify a non-success API response into the error taxonomy.
///
/// Uses the canonical status enum from the error payload when present,
/// falling back to the HTTP code. A payload we cannot parse still maps
/// by HTTP code with a generic message so no internal detail leaks.
fn classify_api_error(http_code: u16, payload: &[u8]) -> GatewayError {
    match serde_json::from_slice::<ApiErrorEnvelope>(payload) {
        Ok(envelope) => GatewayError::from_api_status(
            http_code,
            envelope.error.status.as_deref(),
            &envelope.error.message,
        ),
        Err(_) => GatewayError::from_api_status(
            http_code,
            None,
            &format!("Warehouse request failed with status {}", http_code),
        ),
    }
}

// REST wire types for jobs.query.

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiQueryRequest {
    query: String,
    use_legacy_sql: bool,
    max_results: u32,
    timeout_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    parameter_mode: Option<&'static str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    query_parameters: Vec<ApiQueryParameter>,
}

impl ApiQueryRequest {
    fn from_request(request: &QueryRequest) -> Self {
        let query_parameters: Vec<ApiQueryParameter> = request
            .params
            .iter()
            .map(|p| ApiQueryParameter::string(&p.name, &p.value))
            .collect();
        Self {
            query: request.sql.clone(),
            use_legacy_sql: false,
            max_results: request.max_results,
            timeout_ms: request.timeout.as_millis() as u64,
            parameter_mode: (!query_parameters.is_empty()).then_some("NAMED"),
            query_parameters,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiQueryParameter {
    name: String,
    parameter_type: ApiParameterType,
    parameter_value: ApiParameterValue,
}

impl ApiQueryParameter {
    fn string(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            parameter_type: ApiParameterType {
                r#type: "STRING".to_string(),
            },
            parameter_value: ApiParameterValue {
                value: value.to_string(),
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct ApiParameterType {
    r#type: String,
}

#[derive(Debug, Serialize)]
struct ApiParameterValue {
    value: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiQueryResponse {
    #[serde(default)]
    schema: Option<TableSchema>,
    #[serde(default)]
    rows: Option<Vec<ApiRow>>,
    #[serde(default)]
    job_complete: Option<bool>,
}

/// Result schema as reported by the warehouse.
#[derive(Debug, Clone, Deserialize)]
pub struct TableSchema {
    pub fields: Vec<FieldSchema>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FieldSchema {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: String,
    #[serde(default)]
    pub mode: Option<String>,
    /// Subfields for RECORD columns.
    #[serde(default)]
    pub fields: Option<Vec<FieldSchema>>,
}

/// One result row in the API's field/value encoding.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiRow {
    pub f: Vec<ApiCell>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiCell {
    #[serde(default)]
    pub v: JsonValue,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
    #[serde(default)]
    status: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{QueryParameter, QueryRequest};

    #[test]
    fn test_request_serialization_binds_named_params() {
        let request = QueryRequest::new("SELECT 1", 100, Duration::from_secs(30))
            .with_param(QueryParameter::new("client_name", "%acme%"));
        let body = ApiQueryRequest::from_request(&request);
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(json["useLegacySql"], serde_json::json!(false));
        assert_eq!(json["parameterMode"], serde_json::json!("NAMED"));
        assert_eq!(json["queryParameters"][0]["name"], "client_name");
        assert_eq!(
            json["queryParameters"][0]["parameterValue"]["value"],
            "%acme%"
        );
        assert_eq!(json["maxResults"], serde_json::json!(100));
    }

    #[test]
    fn test_request_without_params_omits_parameter_mode() {
        let request = QueryRequest::new("SELECT 1", 100, Duration::from_secs(30));
        let json = serde_json::to_value(ApiQueryRequest::from_request(&request)).unwrap();
        assert!(json.get("parameterMode").is_none());
        assert!(json.get("queryParameters").is_none());
    }

    #[test]
    fn test_classify_structured_error() {
        let payload = serde_json::json!({
            "error": {
                "code": 404,
                "message": "Not found: Dataset insightsprod:missing",
                "status": "NOT_FOUND"
            }
        });
        let err = classify_api_error(404, payload.to_string().as_bytes());
        assert!(matches!(err, GatewayError::NotFound { .. }));
        assert_eq!(err.status_code(), 404);
    }

    #[test]
    fn test_classify_invalid_query_error() {
        let payload = serde_json::json!({
            "error": {
                "code": 400,
                "message": "Syntax error: Unexpected identifier \"SELEKT\"",
                "status": "INVALID_ARGUMENT"
            }
        });
        let err = classify_api_error(400, payload.to_string().as_bytes());
        assert!(matches!(err, GatewayError::Query { .. }));
        assert!((400..500).contains(&err.status_code()));
    }

    #[test]
    fn test_classify_unparsable_payload_by_http_code() {
        let err = classify_api_error(403, b"<html>forbidden</html>");
        assert!(matches!(err, GatewayError::Access { .. }));
    }

    #[test]
    fn test_response_parses_incomplete_job() {
        let json = r#"{"kind": "bigquery#queryResponse", "jobComplete": false}"#;
        let response: ApiQueryResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.job_complete, Some(false));
        assert!(response.rows.is_none());
    }
}
