//! Warehouse query request models.

use std::time::Duration;

/// A named string parameter bound to a query.
///
/// All values the structured tools bind are strings; predicates that
/// target non-string columns must compare in string space, since the
/// warehouse rejects mixed-type comparisons rather than coercing.
/// Values never appear in the SQL text itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryParameter {
    pub name: String,
    pub value: String,
}

impl QueryParameter {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A query ready for submission to the warehouse.
#[derive(Debug, Clone)]
pub struct QueryRequest {
    pub sql: String,
    pub params: Vec<QueryParameter>,
    /// Page cap for the result set.
    pub max_results: u32,
    /// Client-side completion timeout.
    pub timeout: Duration,
}

impl QueryRequest {
    /// Create a request with no bound parameters.
    pub fn new(sql: impl Into<String>, max_results: u32, timeout: Duration) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
            max_results,
            timeout,
        }
    }

    /// Bind a named parameter.
    pub fn with_param(mut self, param: QueryParameter) -> Self {
        self.params.push(param);
        self
    }
}
