//! BigQuery MCP Server Library
//!
//! This library provides MCP (Model Context Protocol) tools for AI
//! assistants to query the Google BigQuery data warehouse: raw SQL
//! execution plus structured client metadata lookups.

pub mod bigquery;
pub mod config;
pub mod error;
pub mod mcp;
pub mod models;
pub mod tools;
pub mod transport;

pub use config::{Config, GatewayConfig};
pub use error::GatewayError;
pub use mcp::BigQueryService;
pub use models::ResultEnvelope;
