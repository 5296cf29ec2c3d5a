//! Result envelope returned by every tool.
//!
//! Every tool call resolves to exactly one of two fixed shapes: a
//! success envelope carrying the materialized rows, or a failure
//! envelope carrying the error category, a short message, and a numeric
//! status code. Nothing else ever crosses the tool boundary.

use crate::error::GatewayError;
use schemars::JsonSchema;
use serde::Serialize;
use serde_json::Value as JsonValue;

/// Tagged success/failure wrapper for tool results.
#[derive(Debug, Clone, Serialize, JsonSchema)]
#[serde(untagged)]
#[schemars(extend("type" = "object"))]
pub enum ResultEnvelope {
    Success {
        /// Always true
        success: bool,
        /// Query result rows in warehouse-returned order
        results: Vec<serde_json::Map<String, JsonValue>>,
        /// Number of rows in `results`
        row_count: usize,
    },
    Failure {
        /// Always false
        success: bool,
        /// Error category label
        error: String,
        /// Human-readable detail, free of internal state
        message: String,
        /// Numeric status code for the category
        code: u16,
    },
}

impl ResultEnvelope {
    /// Wrap materialized rows into a success envelope.
    /// Row order is preserved; row_count is derived, never supplied.
    pub fn success(results: Vec<serde_json::Map<String, JsonValue>>) -> Self {
        let row_count = results.len();
        Self::Success {
            success: true,
            results,
            row_count,
        }
    }

    /// Wrap a gateway error into a failure envelope.
    pub fn failure(err: &GatewayError) -> Self {
        Self::Failure {
            success: false,
            error: err.category().to_string(),
            message: err.message().to_string(),
            code: err.status_code(),
        }
    }

    /// Collapse a gateway outcome into the envelope.
    pub fn from_outcome(
        outcome: Result<Vec<serde_json::Map<String, JsonValue>>, GatewayError>,
    ) -> Self {
        match outcome {
            Ok(rows) => Self::success(rows),
            Err(err) => Self::failure(&err),
        }
    }

    /// True for the success shape.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}
