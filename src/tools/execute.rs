//! Raw query execution tool.
//!
//! `execute_bigquery` forwards caller SQL to the warehouse verbatim.
//! This is a trusted-caller tool: the caller is the LLM host under
//! organizational trust, not an open internet surface, so the SQL is
//! not rewritten or sanitized here. The service account's read-only
//! grants are the enforcement boundary.

use crate::config::GatewayConfig;
use crate::models::{QueryRequest, ResultEnvelope};
use crate::tools::run_query;
use schemars::JsonSchema;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Input for the execute_bigquery tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ExecuteBigQueryInput {
    /// SQL query to execute
    pub query: String,
    /// Project to bill and scope the query to. Defaults to the configured project.
    #[serde(default)]
    pub project_id: Option<String>,
    /// Path to a service account JSON key file. Defaults to the configured credential.
    #[serde(default)]
    pub service_account_path: Option<String>,
}

/// Handler for raw query execution.
pub struct ExecuteToolHandler {
    config: Arc<GatewayConfig>,
}

impl ExecuteToolHandler {
    pub fn new(config: Arc<GatewayConfig>) -> Self {
        Self { config }
    }

    /// Handle the execute_bigquery tool call.
    pub async fn execute(&self, input: ExecuteBigQueryInput) -> ResultEnvelope {
        let request_id = Uuid::new_v4();
        let project = self
            .config
            .effective_project(input.project_id.as_deref())
            .to_string();
        let start = Instant::now();

        debug!(request_id = %request_id, sql = %input.query, "Raw query received");

        let request = QueryRequest::new(
            input.query,
            self.config.row_cap,
            self.config.query_timeout,
        );
        let outcome = run_query(
            &self.config,
            input.service_account_path.as_deref(),
            &project,
            &request,
        )
        .await;

        let execution_time_ms = start.elapsed().as_millis() as u64;
        match &outcome {
            Ok(rows) => info!(
                tool = "execute_bigquery",
                request_id = %request_id,
                project = %project,
                row_count = rows.len(),
                execution_time_ms,
                "Query executed"
            ),
            Err(err) => warn!(
                tool = "execute_bigquery",
                request_id = %request_id,
                project = %project,
                category = err.category(),
                execution_time_ms,
                "Query failed"
            ),
        }

        ResultEnvelope::from_outcome(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_deserialization() {
        let json = r#"{"query": "SELECT 1 AS x"}"#;
        let input: ExecuteBigQueryInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.query, "SELECT 1 AS x");
        assert!(input.project_id.is_none());
        assert!(input.service_account_path.is_none());
    }

    #[test]
    fn test_input_with_overrides() {
        let json = r#"{
            "query": "SELECT 1",
            "project_id": "otherproj",
            "service_account_path": "/keys/sa.json"
        }"#;
        let input: ExecuteBigQueryInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.project_id.as_deref(), Some("otherproj"));
        assert_eq!(input.service_account_path.as_deref(), Some("/keys/sa.json"));
    }

    #[tokio::test]
    async fn test_missing_credentials_yield_failure_envelope() {
        let config = Arc::new(crate::config::Config::default_config().gateway().unwrap());
        let handler = ExecuteToolHandler::new(config);

        let envelope = handler
            .execute(ExecuteBigQueryInput {
                query: "SELECT 1 AS x".to_string(),
                project_id: None,
                service_account_path: None,
            })
            .await;

        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(value["success"], serde_json::json!(false));
        assert_eq!(value["error"], serde_json::json!("Credential Error"));
        assert_eq!(value["code"], serde_json::json!(401));
    }
}
