//! Data models for the BigQuery MCP Server.
//!
//! This module contains the core data structures used throughout
//! the gateway: the result envelope returned by every tool, the
//! client lookup filter, and warehouse query requests.

pub mod envelope;
pub mod filter;
pub mod query;

pub use envelope::ResultEnvelope;
pub use filter::ClientFilter;
pub use query::{QueryParameter, QueryRequest};
