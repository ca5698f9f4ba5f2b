//! Collection query shape, parsed from query-string parameters and open
//! to rewriting by query-stage hooks.

use crate::model::{FieldType, Schema};
use serde_json::Value;
use std::collections::HashMap;

/// A list request: exact-match field filters plus limit/offset. Filter
/// values are typed according to the schema so hooks can inspect them;
/// fields unknown to the schema never enter from the query string.
#[derive(Clone, Debug, Default)]
pub struct DocumentQuery {
    pub filters: Vec<(String, Value)>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl DocumentQuery {
    /// Build from query-string parameters. `limit` and `offset` are
    /// recognized; every other key is kept as a filter only when it names
    /// a schema field, with the raw value coerced by the field's type.
    pub fn from_params(schema: &Schema, params: HashMap<String, String>) -> Self {
        let mut query = DocumentQuery::default();
        for (key, raw) in params {
            match key.as_str() {
                "limit" => query.limit = raw.parse().ok(),
                "offset" => query.offset = raw.parse().ok(),
                _ => {
                    if let Some(field) = schema.field(&key) {
                        let value = coerce_param(field.field_type, &raw);
                        query.filters.push((key, value));
                    }
                }
            }
        }
        query
    }

    pub fn push_filter(&mut self, field: impl Into<String>, value: Value) {
        self.filters.push((field.into(), value));
    }
}

/// Coerce a raw query-string value by field type. Values that do not
/// parse stay strings and fall through to the database comparison.
pub fn coerce_param(field_type: FieldType, raw: &str) -> Value {
    match field_type {
        FieldType::Integer => raw
            .parse::<i64>()
            .map(|n| Value::Number(n.into()))
            .unwrap_or_else(|_| Value::String(raw.to_string())),
        FieldType::Float => raw
            .parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(raw.to_string())),
        FieldType::Boolean => {
            if raw.eq_ignore_ascii_case("true") {
                Value::Bool(true)
            } else if raw.eq_ignore_ascii_case("false") {
                Value::Bool(false)
            } else {
                Value::String(raw.to_string())
            }
        }
        FieldType::Text | FieldType::Timestamp | FieldType::Uuid | FieldType::Json => {
            Value::String(raw.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FieldDef, FieldType};

    fn schema() -> Schema {
        Schema::new(vec![
            FieldDef::new("name", FieldType::Text),
            FieldDef::new("age", FieldType::Integer),
            FieldDef::new("active", FieldType::Boolean),
        ])
        .unwrap()
    }

    #[test]
    fn recognizes_limit_offset_and_schema_fields() {
        let params = HashMap::from([
            ("limit".to_string(), "10".to_string()),
            ("offset".to_string(), "20".to_string()),
            ("age".to_string(), "42".to_string()),
            ("active".to_string(), "true".to_string()),
            ("no_such_field".to_string(), "x".to_string()),
        ]);
        let q = DocumentQuery::from_params(&schema(), params);
        assert_eq!(q.limit, Some(10));
        assert_eq!(q.offset, Some(20));
        assert_eq!(q.filters.len(), 2);
        let by_name: HashMap<_, _> = q.filters.iter().cloned().collect();
        assert_eq!(by_name["age"], serde_json::json!(42));
        assert_eq!(by_name["active"], serde_json::json!(true));
    }

    #[test]
    fn unparseable_values_stay_strings() {
        let params = HashMap::from([("age".to_string(), "forty".to_string())]);
        let q = DocumentQuery::from_params(&schema(), params);
        assert_eq!(q.filters[0].1, serde_json::json!("forty"));
    }
}
