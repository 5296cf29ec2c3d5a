//! Tool handlers for the BigQuery MCP Server.
//!
//! Each handler runs one tool invocation end to end: resolve the
//! credential, build or accept the SQL, execute against the warehouse,
//! and fold the outcome into a result envelope. Handlers never return
//! errors to the dispatch surface; every failure becomes a failure
//! envelope.

pub mod clients;
pub mod execute;
pub mod tables;

pub use clients::ClientToolHandler;
pub use execute::ExecuteToolHandler;
pub use tables::TableToolHandler;

use crate::bigquery::{BigQueryClient, credentials};
use crate::config::GatewayConfig;
use crate::error::GatewayResult;
use crate::models::QueryRequest;
use serde_json::Value as JsonValue;

/// Execute one query with a call-scoped credential and client.
///
/// Credential resolution happens here on every invocation; handles are
/// never shared between calls.
pub(crate) async fn run_query(
    config: &GatewayConfig,
    service_account_path: Option<&str>,
    project_id: &str,
    request: &QueryRequest,
) -> GatewayResult<Vec<serde_json::Map<String, JsonValue>>> {
    let key = credentials::resolve_key(service_account_path, config.credentials_path.as_deref())?;
    let client =
        BigQueryClient::connect(&key, config.api_endpoint.as_str(), config.query_timeout).await?;
    client.query(project_id, request).await
}
