//! BigQuery warehouse layer.
//!
//! This module owns everything between a tool handler and the warehouse:
//! credential resolution, the REST query client, SQL generation for the
//! structured lookups, and row materialization.

pub mod client;
pub mod credentials;
pub mod rows;
pub mod sql;

pub use client::BigQueryClient;
pub use credentials::ServiceAccountKey;
