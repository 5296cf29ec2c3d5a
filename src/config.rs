//! Configuration handling for the BigQuery MCP Server.
//!
//! This module provides configuration management via CLI arguments and
//! environment variables. Process-wide defaults (project id, credential
//! path) are captured once at startup into an explicit [`GatewayConfig`]
//! that is passed into the dispatch surface, so tool calls never read
//! hidden globals.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

/// Production BigQuery REST endpoint.
pub const DEFAULT_API_ENDPOINT: &str = "https://bigquery.googleapis.com/bigquery/v2";

pub const DEFAULT_HTTP_HOST: &str = "127.0.0.1";
pub const DEFAULT_HTTP_PORT: u16 = 8080;
pub const DEFAULT_MCP_ENDPOINT: &str = "/";
pub const DEFAULT_QUERY_TIMEOUT_SECS: u64 = 30;

/// Fallback project when neither the tool call nor the environment
/// names one.
pub const DEFAULT_PROJECT_ID: &str = "insightsprod";

/// Row cap applied to structured lookups and to the result page of raw
/// queries. Bounded listing, never an unbounded scan.
pub const DEFAULT_ROW_CAP: u32 = 1000;

/// Transport mode for the MCP server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum TransportMode {
    /// Standard input/output (for CLI integration)
    #[default]
    Stdio,
    /// HTTP with streamable responses (for web clients)
    Http,
}

impl std::fmt::Display for TransportMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stdio => write!(f, "stdio"),
            Self::Http => write!(f, "http"),
        }
    }
}

/// Configuration for the BigQuery MCP Server.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "bigquery-mcp-server",
    about = "MCP server for Google BigQuery - enables AI assistants to query the data warehouse",
    version,
    author
)]
pub struct Config {
    /// Default Google Cloud project to bill and scope queries to.
    /// Tool calls may override this per invocation.
    #[arg(
        short = 'p',
        long = "project-id",
        value_name = "PROJECT",
        default_value = DEFAULT_PROJECT_ID,
        env = "GOOGLE_PROJECT_ID"
    )]
    pub project_id: String,

    /// Default path to a service account JSON key file.
    /// Tool calls may override this per invocation.
    #[arg(
        long = "service-account",
        value_name = "PATH",
        env = "GOOGLE_APPLICATION_CREDENTIALS"
    )]
    pub service_account_path: Option<PathBuf>,

    /// BigQuery API base URL. Only changed when pointing at an emulator.
    #[arg(
        long = "api-endpoint",
        value_name = "URL",
        default_value = DEFAULT_API_ENDPOINT,
        env = "BIGQUERY_API_ENDPOINT"
    )]
    pub api_endpoint: String,

    /// Transport mode (stdio or http)
    #[arg(
        short,
        long,
        value_enum,
        default_value = "stdio",
        env = "MCP_TRANSPORT"
    )]
    pub transport: TransportMode,

    /// HTTP host to bind to (only used with http transport)
    #[arg(
        long,
        default_value = DEFAULT_HTTP_HOST,
        env = "MCP_HTTP_HOST"
    )]
    pub http_host: String,

    /// HTTP port to bind to (only used with http transport)
    #[arg(
        long,
        default_value_t = DEFAULT_HTTP_PORT,
        env = "MCP_HTTP_PORT"
    )]
    pub http_port: u16,

    /// MCP endpoint path (only used with http transport)
    #[arg(
        long,
        default_value = DEFAULT_MCP_ENDPOINT,
        env = "MCP_ENDPOINT"
    )]
    pub mcp_endpoint: String,

    /// Warehouse query timeout in seconds
    #[arg(
        long,
        default_value_t = DEFAULT_QUERY_TIMEOUT_SECS,
        env = "MCP_QUERY_TIMEOUT"
    )]
    pub query_timeout: u64,

    /// Maximum rows returned by any tool call
    #[arg(
        long,
        default_value_t = DEFAULT_ROW_CAP,
        env = "MCP_ROW_CAP"
    )]
    pub row_cap: u32,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "MCP_LOG_LEVEL")]
    pub log_level: String,

    /// Enable JSON logging format
    #[arg(long, env = "MCP_JSON_LOGS")]
    pub json_logs: bool,
}

impl Config {
    /// Create a default configuration (useful for testing).
    pub fn default_config() -> Self {
        Self {
            project_id: DEFAULT_PROJECT_ID.to_string(),
            service_account_path: None,
            api_endpoint: DEFAULT_API_ENDPOINT.to_string(),
            transport: TransportMode::Stdio,
            http_host: DEFAULT_HTTP_HOST.to_string(),
            http_port: DEFAULT_HTTP_PORT,
            mcp_endpoint: DEFAULT_MCP_ENDPOINT.to_string(),
            query_timeout: DEFAULT_QUERY_TIMEOUT_SECS,
            row_cap: DEFAULT_ROW_CAP,
            log_level: "info".to_string(),
            json_logs: false,
        }
    }

    /// Lower the CLI/environment configuration into the runtime gateway
    /// configuration shared by all tool handlers.
    pub fn gateway(&self) -> Result<GatewayConfig, String> {
        let project_id = self.project_id.trim();
        if project_id.is_empty() {
            return Err("project_id must not be empty".to_string());
        }
        if self.row_cap == 0 {
            return Err("row_cap must be greater than 0".to_string());
        }
        let api_endpoint = self.api_endpoint.trim().trim_end_matches('/');
        if api_endpoint.is_empty() {
            return Err("api_endpoint must not be empty".to_string());
        }
        Ok(GatewayConfig {
            project_id: project_id.to_string(),
            credentials_path: self.service_account_path.clone(),
            api_endpoint: api_endpoint.to_string(),
            query_timeout: Duration::from_secs(self.query_timeout),
            row_cap: self.row_cap,
        })
    }
}

/// Runtime configuration shared by all tool invocations.
///
/// Immutable after startup; holds the process-wide defaults that a tool
/// call can override per invocation.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Default project scope. Always non-empty.
    pub project_id: String,
    /// Default service account key path, typically sourced from
    /// GOOGLE_APPLICATION_CREDENTIALS. None means no default credential.
    pub credentials_path: Option<PathBuf>,
    /// BigQuery API base URL, without a trailing slash.
    pub api_endpoint: String,
    /// Client-side warehouse timeout.
    pub query_timeout: Duration,
    /// Maximum rows returned by any tool call.
    pub row_cap: u32,
}

impl GatewayConfig {
    /// Resolve the effective project for a tool call: a non-empty
    /// per-call value wins, otherwise the configured default.
    pub fn effective_project<'a>(&'a self, requested: Option<&'a str>) -> &'a str {
        match requested.map(str::trim) {
            Some(p) if !p.is_empty() => p,
            _ => &self.project_id,
        }
    }
}
