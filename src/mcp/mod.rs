//! MCP protocol integration.
//!
//! This module contains the MCP service implementation that exposes
//! the warehouse tools to AI assistants via the rmcp framework.

pub mod service;

pub use service::BigQueryService;
