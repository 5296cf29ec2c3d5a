//! Dataset table listing tool.
//!
//! `get_dataset_tables` lists the tables of one dataset via its
//! INFORMATION_SCHEMA.TABLES view.

use crate::bigquery::sql;
use crate::config::GatewayConfig;
use crate::models::ResultEnvelope;
use crate::tools::{clients::log_outcome, run_query};
use schemars::JsonSchema;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

/// Input for the get_dataset_tables tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct DatasetTablesInput {
    /// Dataset to list tables from
    pub dataset_id: String,
    /// Project the dataset resides in. Defaults to the configured project.
    #[serde(default)]
    pub project_id: Option<String>,
    /// Path to a service account JSON key file. Defaults to the configured credential.
    #[serde(default)]
    pub service_account_path: Option<String>,
}

/// Handler for dataset table listings.
pub struct TableToolHandler {
    config: Arc<GatewayConfig>,
}

impl TableToolHandler {
    pub fn new(config: Arc<GatewayConfig>) -> Self {
        Self { config }
    }

    /// Handle the get_dataset_tables tool call.
    pub async fn tables(&self, input: DatasetTablesInput) -> ResultEnvelope {
        let request_id = Uuid::new_v4();
        let project = self
            .config
            .effective_project(input.project_id.as_deref())
            .to_string();
        let start = Instant::now();

        let outcome = async {
            let request = sql::dataset_tables_query(
                &project,
                input.dataset_id.trim(),
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

        log_outcome(
            "get_dataset_tables",
            request_id,
            &project,
            "dataset",
            start,
            &outcome,
        );
        ResultEnvelope::from_outcome(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_requires_dataset_id() {
        let result: Result<DatasetTablesInput, _> = serde_json::from_str("{}");
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_invalid_dataset_id_yields_query_error() {
        let config = Arc::new(crate::config::Config::default_config().gateway().unwrap());
        let handler = TableToolHandler::new(config);

        let envelope = handler
            .tables(DatasetTablesInput {
                dataset_id: "bad.dataset; DROP".to_string(),
                project_id: None,
                service_account_path: None,
            })
            .await;

        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(value["success"], serde_json::json!(false));
        assert_eq!(value["error"], serde_json::json!("Query Error"));
    }
}
