//! SQL generation for the structured lookup tools.
//!
//! Caller-supplied identifier values are always bound as named query
//! parameters, never interpolated into the SQL text. Table paths embed
//! the project and dataset identifiers, which cannot be parameterized;
//! those are validated against a strict character set first.

use crate::error::{GatewayError, GatewayResult};
use crate::models::{ClientFilter, QueryParameter, QueryRequest};
use std::time::Duration;

/// INFORMATION_SCHEMA region qualifier for dataset listings.
const SCHEMATA_REGION: &str = "region-us-central1";

/// Latest client metadata joined with the git registry. One row per
/// client, most recently updated first.
const CLIENT_DETAILS_BASE: &str = "\
WITH
  sources AS (
    SELECT updated_at, client_id, client_name, sources
    FROM `{project}.edm_insights_metadata.client`
    QUALIFY ROW_NUMBER() OVER (PARTITION BY client_id, client_name ORDER BY updated_at DESC) = 1
  ),
  git AS (
    SELECT client_id, git_url
    FROM `{project}.edm_insights_metadata.client_git`
    QUALIFY ROW_NUMBER() OVER (PARTITION BY client_id ORDER BY updated_at DESC) = 1
  ),
  final AS (
    SELECT src.*, g.git_url
    FROM sources AS src
    LEFT JOIN git AS g ON src.client_id = g.client_id
  )
SELECT * FROM final";

/// Build the client-details lookup.
pub fn client_details_query(
    project_id: &str,
    filter: &ClientFilter,
    row_cap: u32,
    timeout: Duration,
) -> GatewayResult<QueryRequest> {
    validate_identifier(project_id, "project")?;

    let mut sql = CLIENT_DETAILS_BASE.replace("{project}", project_id);
    let mut request = match filter {
        ClientFilter::Exact(id) => {
            // client_id is a numeric column and every bound parameter is a
            // STRING; the warehouse rejects INT64 = STRING rather than
            // coercing, so the comparison happens in string space.
            sql.push_str("\nWHERE CAST(client_id AS STRING) = @client_id");
            QueryRequest::new(String::new(), row_cap, timeout)
                .with_param(QueryParameter::new("client_id", id))
        }
        ClientFilter::Partial(name) => {
            sql.push_str("\nWHERE LOWER(client_name) LIKE LOWER(@client_name)");
            QueryRequest::new(String::new(), row_cap, timeout)
                .with_param(QueryParameter::new("client_name", wildcard_wrap(name)))
        }
        ClientFilter::None => QueryRequest::new(String::new(), row_cap, timeout),
    };
    sql.push_str(&format!("\nORDER BY updated_at DESC\nLIMIT {}", row_cap));
    request.sql = sql;
    Ok(request)
}

/// Build the client-datasets lookup over INFORMATION_SCHEMA.SCHEMATA.
///
/// With no filter this lists every dataset visible in the project
/// scope, bounded by the row cap.
pub fn client_datasets_query(
    project_id: &str,
    filter: &ClientFilter,
    row_cap: u32,
    timeout: Duration,
) -> GatewayResult<QueryRequest> {
    validate_identifier(project_id, "project")?;

    let mut sql = format!(
        "SELECT
  schema_name AS dataset_id,
  catalog_name AS project_id,
  creation_time,
  last_modified_time,
  location
FROM `{}.{}.INFORMATION_SCHEMA.SCHEMATA`",
        project_id, SCHEMATA_REGION
    );

    let mut request = match filter {
        ClientFilter::Exact(id) => {
            sql.push_str("\nWHERE schema_name = @client_id");
            QueryRequest::new(String::new(), row_cap, timeout)
                .with_param(QueryParameter::new("client_id", id))
        }
        ClientFilter::Partial(name) => {
            sql.push_str("\nWHERE LOWER(schema_name) LIKE LOWER(@client_name)");
            QueryRequest::new(String::new(), row_cap, timeout)
                .with_param(QueryParameter::new("client_name", wildcard_wrap(name)))
        }
        ClientFilter::None => QueryRequest::new(String::new(), row_cap, timeout),
    };
    sql.push_str(&format!(
        "\nORDER BY last_modified_time DESC\nLIMIT {}",
        row_cap
    ));
    request.sql = sql;
    Ok(request)
}

/// Build the dataset-tables lookup over INFORMATION_SCHEMA.TABLES.
pub fn dataset_tables_query(
    project_id: &str,
    dataset_id: &str,
    row_cap: u32,
    timeout: Duration,
) -> GatewayResult<QueryRequest> {
    validate_identifier(project_id, "project")?;
    validate_identifier(dataset_id, "dataset")?;

    let sql = format!(
        "SELECT
  table_catalog,
  table_schema,
  table_name,
  table_type,
  creation_time
FROM `{}.{}.INFORMATION_SCHEMA.TABLES`
ORDER BY table_name
LIMIT {}",
        project_id, dataset_id, row_cap
    );
    Ok(QueryRequest::new(sql, row_cap, timeout))
}

/// Wrap a partial-match value for substring containment.
/// Applied here, never by the caller.
fn wildcard_wrap(value: &str) -> String {
    format!("%{}%", value)
}

/// Validate an identifier destined for a table path.
///
/// Project ids allow lowercase letters, digits and hyphens; dataset ids
/// allow letters, digits and underscores. A single permissive set
/// covers both while still excluding everything that could break out of
/// a backtick-quoted path.
fn validate_identifier(value: &str, kind: &str) -> GatewayResult<()> {
    let valid = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(GatewayError::query(format!(
            "Invalid {} identifier: must contain only letters, digits, '_' or '-'",
            kind
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIMEOUT: Duration = Duration::from_secs(30);

    #[test]
    fn test_details_exact_filter() {
        let filter = ClientFilter::Exact("42".to_string());
        let request = client_details_query("insightsprod", &filter, 1000, TIMEOUT).unwrap();

        assert!(
            request
                .sql
                .contains("WHERE CAST(client_id AS STRING) = @client_id")
        );
        assert_eq!(request.params.len(), 1);
        assert_eq!(request.params[0].name, "client_id");
        assert_eq!(request.params[0].value, "42");
        // The value is bound, never inlined
        assert!(!request.sql.contains("42"));
    }

    #[test]
    fn test_details_exact_compares_numeric_column_in_string_space() {
        // The string parameter must never be compared against the raw
        // numeric column; that predicate fails warehouse-side with a
        // type mismatch on an otherwise valid lookup.
        let filter = ClientFilter::Exact("42".to_string());
        let request = client_details_query("insightsprod", &filter, 1000, TIMEOUT).unwrap();

        assert!(!request.sql.contains("WHERE client_id = @client_id"));
        assert!(request.sql.contains("CAST(client_id AS STRING)"));
    }

    #[test]
    fn test_details_partial_filter_wraps_wildcards() {
        let filter = ClientFilter::Partial("acme".to_string());
        let request = client_details_query("insightsprod", &filter, 1000, TIMEOUT).unwrap();

        assert!(
            request
                .sql
                .contains("LOWER(client_name) LIKE LOWER(@client_name)")
        );
        assert_eq!(request.params[0].value, "%acme%");
        assert!(!request.sql.contains("acme"));
    }

    #[test]
    fn test_details_none_filter_is_capped() {
        let request =
            client_details_query("insightsprod", &ClientFilter::None, 1000, TIMEOUT).unwrap();

        assert!(!request.sql.contains("WHERE"));
        assert!(request.sql.contains("LIMIT 1000"));
        assert!(request.sql.contains("ORDER BY updated_at DESC"));
        assert!(request.params.is_empty());
    }

    #[test]
    fn test_details_targets_project_metadata_tables() {
        let request =
            client_details_query("otherproj", &ClientFilter::None, 1000, TIMEOUT).unwrap();
        assert!(
            request
                .sql
                .contains("`otherproj.edm_insights_metadata.client`")
        );
        assert!(
            request
                .sql
                .contains("`otherproj.edm_insights_metadata.client_git`")
        );
    }

    #[test]
    fn test_injection_attempt_stays_out_of_sql() {
        let hostile = "x'; DROP TABLE clients; --".to_string();
        let request = client_details_query(
            "insightsprod",
            &ClientFilter::Partial(hostile.clone()),
            1000,
            TIMEOUT,
        )
        .unwrap();

        assert!(!request.sql.contains("DROP TABLE"));
        assert_eq!(request.params[0].value, format!("%{}%", hostile));
    }

    #[test]
    fn test_datasets_filters() {
        let exact = client_datasets_query(
            "insightsprod",
            &ClientFilter::Exact("client_42_prod".to_string()),
            1000,
            TIMEOUT,
        )
        .unwrap();
        assert!(exact.sql.contains("WHERE schema_name = @client_id"));
        assert_eq!(exact.params[0].value, "client_42_prod");

        let partial = client_datasets_query(
            "insightsprod",
            &ClientFilter::Partial("acme".to_string()),
            1000,
            TIMEOUT,
        )
        .unwrap();
        assert!(
            partial
                .sql
                .contains("LOWER(schema_name) LIKE LOWER(@client_name)")
        );
        assert_eq!(partial.params[0].value, "%acme%");
    }

    #[test]
    fn test_datasets_none_lists_all_capped() {
        let request =
            client_datasets_query("insightsprod", &ClientFilter::None, 500, TIMEOUT).unwrap();
        assert!(!request.sql.contains("WHERE"));
        assert!(request.sql.contains("LIMIT 500"));
        assert!(
            request
                .sql
                .contains("`insightsprod.region-us-central1.INFORMATION_SCHEMA.SCHEMATA`")
        );
    }

    #[test]
    fn test_dataset_tables_query() {
        let request =
            dataset_tables_query("insightsprod", "client_42_prod", 1000, TIMEOUT).unwrap();
        assert!(
            request
                .sql
                .contains("`insightsprod.client_42_prod.INFORMATION_SCHEMA.TABLES`")
        );
        assert!(request.sql.contains("ORDER BY table_name"));
    }

    #[test]
    fn test_identifier_validation_rejects_path_breakouts() {
        for hostile in ["bad.dataset", "x`;--", "a b", "", "x\ny"] {
            let err = dataset_tables_query("insightsprod", hostile, 1000, TIMEOUT).unwrap_err();
            assert!(matches!(err, GatewayError::Query { .. }), "{:?}", hostile);
        }
    }

    #[test]
    fn test_hostile_project_id_rejected() {
        let err = client_details_query("p`.evil", &ClientFilter::None, 1000, TIMEOUT).unwrap_err();
        assert!(matches!(err, GatewayError::Query { .. }));
    }
}
