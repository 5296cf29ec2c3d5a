//! Row materialization.
//!
//! The warehouse returns rows in a positional field/value encoding with
//! every scalar rendered as a string. This module pairs cells with the
//! result schema and decodes them into ordered name/value maps. Column
//! types are not statically known at the gateway layer, so values stay
//! dynamically typed JSON; decoding is best-effort by schema type and
//! falls back to the string form rather than failing a whole row.

use crate::bigquery::client::{ApiRow, FieldSchema, TableSchema};
use serde_json::Value as JsonValue;

/// Materialize API rows into name/value maps, preserving row order and
/// the schema's column order within each row.
pub fn materialize(
    schema: Option<&TableSchema>,
    rows: Vec<ApiRow>,
) -> Vec<serde_json::Map<String, JsonValue>> {
    let Some(schema) = schema else {
        return Vec::new();
    };

    rows.into_iter()
        .map(|row| decode_row(&schema.fields, row))
        .collect()
}

fn decode_row(fields: &[FieldSchema], row: ApiRow) -> serde_json::Map<String, JsonValue> {
    let mut map = serde_json::Map::with_capacity(fields.len());
    for (field, cell) in fields.iter().zip(row.f.into_iter()) {
        map.insert(field.name.clone(), decode_value(field, cell.v));
    }
    map
}

fn decode_value(field: &FieldSchema, value: JsonValue) -> JsonValue {
    if value.is_null() {
        return JsonValue::Null;
    }

    // REPEATED columns arrive as [{"v": item}, ...]
    if field.mode.as_deref() == Some("REPEATED") {
        if let JsonValue::Array(items) = value {
            let decoded = items
                .into_iter()
                .map(|item| match item {
                    JsonValue::Object(mut obj) => {
                        let inner = obj.remove("v").unwrap_or(JsonValue::Null);
                        decode_scalar(field, inner)
                    }
                    other => decode_scalar(field, other),
                })
                .collect();
            return JsonValue::Array(decoded);
        }
        return value;
    }

    decode_scalar(field, value)
}

fn decode_scalar(field: &FieldSchema, value: JsonValue) -> JsonValue {
    // RECORD values nest another field/value row
    if field.field_type == "RECORD" || field.field_type == "STRUCT" {
        if let (Some(subfields), Ok(row)) = (
            field.fields.as_deref(),
            serde_json::from_value::<ApiRow>(value.clone()),
        ) {
            return JsonValue::Object(decode_row(subfields, row));
        }
        return value;
    }

    let JsonValue::String(text) = value else {
        return value;
    };

    match field.field_type.as_str() {
        "INTEGER" | "INT64" => text
            .parse::<i64>()
            .map(JsonValue::from)
            .unwrap_or(JsonValue::String(text)),
        "FLOAT" | "FLOAT64" => text
            .parse::<f64>()
            .ok()
            .and_then(|f| serde_json::Number::from_f64(f).map(JsonValue::Number))
            .unwrap_or(JsonValue::String(text)),
        "BOOLEAN" | "BOOL" => match text.as_str() {
            "true" => JsonValue::Bool(true),
            "false" => JsonValue::Bool(false),
            _ => JsonValue::String(text),
        },
        // Timestamps, dates, NUMERIC, strings and everything else keep
        // their wire form; NUMERIC in particular must not round-trip
        // through f64.
        _ => JsonValue::String(text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema(json: serde_json::Value) -> TableSchema {
        serde_json::from_value(json).unwrap()
    }

    fn rows(json: serde_json::Value) -> Vec<ApiRow> {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_select_one_as_x() {
        let schema = schema(json!({"fields": [{"name": "x", "type": "INTEGER"}]}));
        let rows = rows(json!([{"f": [{"v": "1"}]}]));

        let result = materialize(Some(&schema), rows);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0]["x"], json!(1));
    }

    #[test]
    fn test_row_order_preserved() {
        let schema = schema(json!({"fields": [{"name": "id", "type": "INTEGER"}]}));
        let rows = rows(json!([
            {"f": [{"v": "3"}]},
            {"f": [{"v": "1"}]},
            {"f": [{"v": "2"}]}
        ]));

        let result = materialize(Some(&schema), rows);
        let ids: Vec<_> = result.iter().map(|r| r["id"].clone()).collect();
        assert_eq!(ids, vec![json!(3), json!(1), json!(2)]);
    }

    #[test]
    fn test_scalar_decoding() {
        let schema = schema(json!({"fields": [
            {"name": "n", "type": "INTEGER"},
            {"name": "f", "type": "FLOAT"},
            {"name": "b", "type": "BOOLEAN"},
            {"name": "s", "type": "STRING"},
            {"name": "ts", "type": "TIMESTAMP"}
        ]}));
        let rows = rows(json!([{"f": [
            {"v": "42"},
            {"v": "2.5"},
            {"v": "true"},
            {"v": "Acme Corp"},
            {"v": "1.7e9"}
        ]}]));

        let result = materialize(Some(&schema), rows);
        assert_eq!(result[0]["n"], json!(42));
        assert_eq!(result[0]["f"], json!(2.5));
        assert_eq!(result[0]["b"], json!(true));
        assert_eq!(result[0]["s"], json!("Acme Corp"));
        // Non-scalar-typed columns keep the wire form
        assert_eq!(result[0]["ts"], json!("1.7e9"));
    }

    #[test]
    fn test_null_values() {
        let schema = schema(json!({"fields": [{"name": "git_url", "type": "STRING"}]}));
        let rows = rows(json!([{"f": [{"v": null}]}]));

        let result = materialize(Some(&schema), rows);
        assert_eq!(result[0]["git_url"], JsonValue::Null);
    }

    #[test]
    fn test_repeated_column() {
        let schema = schema(json!({"fields": [
            {"name": "sources", "type": "STRING", "mode": "REPEATED"}
        ]}));
        let rows = rows(json!([{"f": [{"v": [{"v": "jira"}, {"v": "github"}]}]}]));

        let result = materialize(Some(&schema), rows);
        assert_eq!(result[0]["sources"], json!(["jira", "github"]));
    }

    #[test]
    fn test_record_column() {
        let schema = schema(json!({"fields": [
            {"name": "meta", "type": "RECORD", "fields": [
                {"name": "region", "type": "STRING"},
                {"name": "count", "type": "INTEGER"}
            ]}
        ]}));
        let rows = rows(json!([{"f": [{"v": {"f": [{"v": "us-central1"}, {"v": "3"}]}}]}]));

        let result = materialize(Some(&schema), rows);
        assert_eq!(result[0]["meta"], json!({"region": "us-central1", "count": 3}));
    }

    #[test]
    fn test_unparsable_integer_falls_back_to_string() {
        let schema = schema(json!({"fields": [{"name": "n", "type": "INTEGER"}]}));
        let rows = rows(json!([{"f": [{"v": "not-a-number"}]}]));

        let result = materialize(Some(&schema), rows);
        assert_eq!(result[0]["n"], json!("not-a-number"));
    }

    #[test]
    fn test_missing_schema_yields_no_rows() {
        let rows = rows(json!([{"f": [{"v": "1"}]}]));
        assert!(materialize(None, rows).is_empty());
    }
}
