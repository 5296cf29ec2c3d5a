//! MCP service implementation using rmcp.
//!
//! This module defines the BigQueryService struct with the warehouse
//! tools exposed via the MCP protocol using the rmcp framework's
//! macros. Every tool resolves to a result envelope; failures are
//! folded into the envelope inside the handlers, so no tool call ever
//! surfaces a protocol-level error to the host.

use crate::config::GatewayConfig;
use crate::models::ResultEnvelope;
use crate::tools::clients::ClientLookupInput;
use crate::tools::execute::ExecuteBigQueryInput;
use crate::tools::tables::DatasetTablesInput;
use crate::tools::{ClientToolHandler, ExecuteToolHandler, TableToolHandler};
use rmcp::Json;
use rmcp::{
    ServerHandler,
    handler::server::tool::ToolRouter,
    handler::server::wrapper::Parameters,
    model::{Implementation, ProtocolVersion, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router,
};
use std::sync::Arc;

#[derive(Clone)]
pub struct BigQueryService {
    /// Immutable gateway configuration shared by all tool calls
    config: Arc<GatewayConfig>,
    /// Tool router for MCP tool dispatch (auto-generated)
    tool_router: ToolRouter<Self>,
}

impl BigQueryService {
    /// Create a new BigQueryService instance.
    pub fn new(config: Arc<GatewayConfig>) -> Self {
        Self {
            config,
            tool_router: Self::tool_router(),
        }
    }
}

#[tool_router]
impl BigQueryService {
    #[tool(
        description = "Execute a BigQuery SQL query and return the results.\nThe query is forwarded to the warehouse as written; values you compute into the SQL are your responsibility.\nReturns {success, results, row_count} or {success, error, message, code}."
    )]
    async fn execute_bigquery(
        &self,
        Parameters(input): Parameters<ExecuteBigQueryInput>,
    ) -> Json<ResultEnvelope> {
        let handler = ExecuteToolHandler::new(self.config.clone());
        Json(handler.execute(input).await)
    }

    #[tool(
        description = "Retrieve Pulse client details from the data warehouse.\nReturns the most recent details per client: updated_at, client_id, client_name, sources (platforms enabled), and git_url.\nFilter by client_id (exact) or client_name (case-insensitive substring); client_id wins when both are given. With no filter, lists all clients up to the row cap."
    )]
    async fn get_client_details(
        &self,
        Parameters(input): Parameters<ClientLookupInput>,
    ) -> Json<ResultEnvelope> {
        let handler = ClientToolHandler::new(self.config.clone());
        Json(handler.details(input).await)
    }

    #[tool(
        description = "Retrieve Pulse client datasets from the data warehouse.\nDataset names come from the INFORMATION_SCHEMA views of the target project.\nFilter by client_id (exact dataset name) or client_name (case-insensitive substring); with no filter, lists all visible datasets up to the row cap."
    )]
    async fn get_client_datasets(
        &self,
        Parameters(input): Parameters<ClientLookupInput>,
    ) -> Json<ResultEnvelope> {
        let handler = ClientToolHandler::new(self.config.clone());
        Json(handler.datasets(input).await)
    }

    #[tool(
        description = "List the tables in a specific BigQuery dataset using INFORMATION_SCHEMA views.\nReturns table_catalog, table_schema, table_name, table_type, and creation_time, ordered by table name."
    )]
    async fn get_dataset_tables(
        &self,
        Parameters(input): Parameters<DatasetTablesInput>,
    ) -> Json<ResultEnvelope> {
        let handler = TableToolHandler::new(self.config.clone());
        Json(handler.tables(input).await)
    }
}

#[tool_handler]
impl ServerHandler for BigQueryService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2025_03_26,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "bigquery-mcp-server".to_owned(),
                title: Some("BigQuery MCP Server".to_owned()),
                version: env!("CARGO_PKG_VERSION").to_owned(),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Read-only tools for querying the BigQuery data warehouse.\n\
                \n\
                ## Tools\n\
                - `execute_bigquery`: run arbitrary SQL against the warehouse\n\
                - `get_client_details`: latest Pulse client metadata, filterable by id or name\n\
                - `get_client_datasets`: datasets visible in the project, filterable by id or name\n\
                - `get_dataset_tables`: tables of one dataset\n\
                \n\
                ## Results\n\
                Every tool returns the same envelope: on success\n\
                {success: true, results: [...], row_count: N}; on failure\n\
                {success: false, error, message, code}. Inspect `success`\n\
                before reading `results`.\n\
                \n\
                ## Credentials and scope\n\
                Calls use the server's configured service account and project\n\
                by default. Pass `service_account_path` or `project_id` to\n\
                override either for a single call.\n\
                \n\
                ## Limits\n\
                Result sets are capped (default 1000 rows) and lookups are\n\
                ordered by recency. The gateway is read-only; do not attempt\n\
                DML or DDL."
                    .to_string(),
            ),
        }
    }
}
