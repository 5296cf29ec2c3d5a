//! Error types for the BigQuery MCP Server.
//!
//! This module defines the gateway error taxonomy using `thiserror`.
//! Each variant corresponds to one failure category surfaced in the
//! result envelope, with a stable label and numeric status code.
//! Classification is kind-based (API status enum, reqwest error kind),
//! never message string matching.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GatewayError {
    /// Missing, unreadable, or invalid credential material.
    #[error("Credential error: {message}")]
    Credential { message: String },

    /// Authenticated but unauthorized for the requested scope or table.
    #[error("Access denied: {message}")]
    Access { message: String },

    /// Referenced project, dataset, or table does not exist.
    #[error("Not found: {message}")]
    NotFound { message: String },

    /// Malformed or syntactically invalid query text.
    #[error("Query error: {message}")]
    Query { message: String },

    /// Network failure or warehouse timeout.
    #[error("Transport error: {message}")]
    Transport { message: String, timeout: bool },

    /// Uncategorized failure. Never used to mask a known category.
    #[error("Execution error: {message}")]
    Execution { message: String },
}

impl GatewayError {
    /// Create a credential error.
    pub fn credential(message: impl Into<String>) -> Self {
        Self::Credential {
            message: message.into(),
        }
    }

    /// Create an access (permission) error.
    pub fn access(message: impl Into<String>) -> Self {
        Self::Access {
            message: message.into(),
        }
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Create a query error.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }

    /// Create a transport error for a network failure.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            timeout: false,
        }
    }

    /// Create a transport error for a timeout.
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            timeout: true,
        }
    }

    /// Create an execution (catch-all) error.
    pub fn execution(message: impl Into<String>) -> Self {
        Self::Execution {
            message: message.into(),
        }
    }

    /// Stable category label surfaced in the failure envelope.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Credential { .. } => "Credential Error",
            Self::Access { .. } => "Access Denied",
            Self::NotFound { .. } => "Not Found",
            Self::Query { .. } => "Query Error",
            Self::Transport { .. } => "Transport Error",
            Self::Execution { .. } => "Execution Error",
        }
    }

    /// Numeric status code surfaced in the failure envelope.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Credential { .. } => 401,
            Self::Access { .. } => 403,
            Self::NotFound { .. } => 404,
            Self::Query { .. } => 400,
            Self::Transport { timeout: true, .. } => 504,
            Self::Transport { timeout: false, .. } => 502,
            Self::Execution { .. } => 500,
        }
    }

    /// Human-readable detail for the failure envelope.
    ///
    /// Internal detail (credential paths, raw SQL) is kept out of the
    /// message at construction time, so this is safe to surface as-is.
    pub fn message(&self) -> &str {
        match self {
            Self::Credential { message }
            | Self::Access { message }
            | Self::NotFound { message }
            | Self::Query { message }
            | Self::Transport { message, .. }
            | Self::Execution { message } => message,
        }
    }

    /// Classify a BigQuery REST error payload into a gateway error.
    ///
    /// The API reports a canonical status enum alongside the HTTP code.
    /// The enum is the stable kind; the numeric code is the fallback for
    /// payloads that omit it. Messages are never inspected.
    pub fn from_api_status(http_code: u16, status: Option<&str>, message: &str) -> Self {
        match status {
            Some("UNAUTHENTICATED") => Self::credential(message),
            Some("PERMISSION_DENIED") => Self::access(message),
            Some("NOT_FOUND") => Self::not_found(message),
            Some("INVALID_ARGUMENT") => Self::query(message),
            Some("DEADLINE_EXCEEDED") => Self::timeout(message),
            Some("UNAVAILABLE") => Self::transport(message),
            _ => match http_code {
                401 => Self::credential(message),
                403 => Self::access(message),
                404 => Self::not_found(message),
                400 => Self::query(message),
                504 => Self::timeout(message),
                502 | 503 => Self::transport(message),
                _ => Self::execution(message),
            },
        }
    }
}

/// Convert reqwest errors to GatewayError by error kind.
impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GatewayError::timeout("Warehouse request timed out")
        } else if err.is_connect() {
            GatewayError::transport(format!("Failed to reach the warehouse: {}", err))
        } else if err.is_decode() {
            GatewayError::execution(format!("Failed to decode warehouse response: {}", err))
        } else {
            GatewayError::transport(format!("Warehouse request failed: {}", err))
        }
    }
}

/// Result type alias for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;
