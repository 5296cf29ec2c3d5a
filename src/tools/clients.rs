//! Client metadata lookup tools.
//!
//! `get_client_details` and `get_client_datasets` accept the same
//! optional (client_id, client_name) filter pair and translate it into
//! parameterized lookups over the client metadata tables and
//! INFORMATION_SCHEMA dataset listings.

use crate::config::GatewayConfig;
use crate::models::{ClientFilter, ResultEnvelope};
use crate::tools::run_query;
use crate::{bigquery::sql, error::GatewayResult};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};
use uuid::Uuid;

/// Input shared by the client lookup tools.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ClientLookupInput {
    /// Specific client ID to filter by. Takes precedence over client_name.
    #[serde(default)]
    pub client_id: String,
    /// Client name to search for (case-insensitive substring match)
    #[serde(default)]
    pub client_name: String,
    /// Project to scope the lookup to. Defaults to the configured project.
    #[serde(default)]
    pub project_id: Option<String>,
    /// Path to a service account JSON key file. Defaults to the configured credential.
    #[serde(default)]
    pub service_account_path: Option<String>,
}

/// Handler for the client metadata lookups.
pub struct ClientToolHandler {
    config: Arc<GatewayConfig>,
}

impl ClientToolHandler {
    pub fn new(config: Arc<GatewayConfig>) -> Self {
        Self { config }
    }

    /// Handle the get_client_details tool call.
    pub async fn details(&self, input: ClientLookupInput) -> ResultEnvelope {
        self.lookup("get_client_details", input, sql::client_details_query)
            .await
    }

    /// Handle the get_client_datasets tool call.
    pub async fn datasets(&self, input: ClientLookupInput) -> ResultEnvelope {
        self.lookup("get_client_datasets", input, sql::client_datasets_query)
            .await
    }

    async fn lookup(
        &self,
        tool: &'static str,
        input: ClientLookupInput,
        build: impl Fn(
            &str,
            &ClientFilter,
            u32,
            std::time::Duration,
        ) -> GatewayResult<crate::models::QueryRequest>,
    ) -> ResultEnvelope {
        let request_id = Uuid::new_v4();
        let project = self
            .config
            .effective_project(input.project_id.as_deref())
            .to_string();
        let filter = ClientFilter::from_params(&input.client_id, &input.client_name);
        let start = Instant::now();

        let outcome = async {
            let request = build(
                &project,
                &filter,
                self.config.row_cap,
                self.config.query_timeout,
            )?;
            run_query(
                &self.config,
                input.service_account_path.as_deref(),
                &project,
                &request,
            )
            .await
        }
        .await;

        log_outcome(tool, request_id, &project, filter.mode(), start, &outcome);
        ResultEnvelope::from_outcome(outcome)
    }
}

pub(crate) fn log_outcome(
    tool: &'static str,
    request_id: Uuid,
    project: &str,
    filter_mode: &'static str,
    start: Instant,
    outcome: &GatewayResult<Vec<serde_json::Map<String, JsonValue>>>,
) {
    let execution_time_ms = start.elapsed().as_millis() as u64;
    match outcome {
        Ok(rows) => info!(
            tool,
            request_id = %request_id,
            project = %project,
            filter = filter_mode,
            row_count = rows.len(),
            execution_time_ms,
            "Lookup completed"
        ),
        Err(err) => warn!(
            tool,
            request_id = %request_id,
            project = %project,
            filter = filter_mode,
            category = err.category(),
            execution_time_ms,
            "Lookup failed"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_defaults_to_empty_filters() {
        let input: ClientLookupInput = serde_json::from_str("{}").unwrap();
        assert!(input.client_id.is_empty());
        assert!(input.client_name.is_empty());
        let filter = ClientFilter::from_params(&input.client_id, &input.client_name);
        assert_eq!(filter, ClientFilter::None);
    }

    #[test]
    fn test_input_id_takes_precedence() {
        let json = r#"{"client_id": "42", "client_name": "acme"}"#;
        let input: ClientLookupInput = serde_json::from_str(json).unwrap();
        let filter = ClientFilter::from_params(&input.client_id, &input.client_name);
        assert_eq!(filter, ClientFilter::Exact("42".to_string()));
    }

    #[tokio::test]
    async fn test_missing_credentials_yield_failure_envelope() {
        let config = Arc::new(crate::config::Config::default_config().gateway().unwrap());
        let handler = ClientToolHandler::new(config);

        let envelope = handler
            .details(serde_json::from_str("{}").unwrap())
            .await;

        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(value["success"], serde_json::json!(false));
        assert_eq!(value["error"], serde_json::json!("Credential Error"));
    }

    #[tokio::test]
    async fn test_hostile_project_fails_before_credential_lookup() {
        let config = Arc::new(crate::config::Config::default_config().gateway().unwrap());
        let handler = ClientToolHandler::new(config);

        let input: ClientLookupInput =
            serde_json::from_str(r#"{"project_id": "p`.evil"}"#).unwrap();
        let envelope = handler.datasets(input).await;

        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(value["error"], serde_json::json!("Query Error"));
        assert_eq!(value["code"], serde_json::json!(400));
    }
}
