//! Client lookup filter.
//!
//! Structured lookups accept an optional exact client id and an optional
//! partial client name. The filter collapses the pair into a single mode
//! with a fixed precedence so criteria never stack silently.

/// Filter derived from the (client_id, client_name) parameter pair.
///
/// Precedence: `Exact` if the id is non-empty, else `Partial` if the
/// name is non-empty, else `None`. Emptiness, not presence, drives the
/// chain: an explicit empty string behaves like an absent parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientFilter {
    /// No filter. Broadest result set, bounded by the row cap.
    None,
    /// Equality match on the identifier column.
    Exact(String),
    /// Case-insensitive substring containment on the name column.
    /// Wildcard wrapping is applied by the query builder, not here.
    Partial(String),
}

impl ClientFilter {
    /// Build a filter from the raw tool parameters.
    ///
    /// When both are supplied, the exact id wins and the partial name is
    /// ignored, not combined.
    pub fn from_params(client_id: &str, client_name: &str) -> Self {
        let id = client_id.trim();
        if !id.is_empty() {
            return Self::Exact(id.to_string());
        }
        let name = client_name.trim();
        if !name.is_empty() {
            return Self::Partial(name.to_string());
        }
        Self::None
    }

    /// Mode label for structured logging.
    pub fn mode(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Exact(_) => "exact",
            Self::Partial(_) => "partial",
        }
    }
}
