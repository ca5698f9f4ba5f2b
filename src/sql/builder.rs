//! Builds parameterized SELECT, INSERT, UPDATE, DELETE against a
//! resource's document table (`id`, `doc` JSONB, `created_at`,
//! `updated_at`). Field filters compare `doc->>'field'` with a cast
//! matching the field's declared type.

use crate::model::{FieldType, Schema};
use crate::service::DocumentQuery;
use crate::sql::params::BindValue;
use serde_json::{Map, Value};

/// Columns returned by every statement that yields documents.
pub const DOC_COLUMNS: &str = "id, doc, created_at, updated_at";

pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<BindValue>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf {
            sql: String::new(),
            params: Vec::new(),
        }
    }

    fn push_param(&mut self, value: BindValue) -> usize {
        self.params.push(value);
        self.params.len()
    }
}

/// How a single document is addressed: by primary key, or by a unique
/// document field (`find_by`).
#[derive(Clone, Debug)]
pub enum Selector {
    Id(uuid::Uuid),
    Field {
        name: String,
        field_type: FieldType,
        value: Value,
    },
}

/// SQL cast applied to both sides of a typed field comparison. Text-like
/// types compare as the raw `->>` text.
fn cast_for(field_type: FieldType) -> Option<&'static str> {
    match field_type {
        FieldType::Integer => Some("bigint"),
        FieldType::Float => Some("double precision"),
        FieldType::Boolean => Some("boolean"),
        FieldType::Text | FieldType::Timestamp | FieldType::Uuid | FieldType::Json => None,
    }
}

/// Field names come from the validated schema (identifier characters
/// only).
fn field_expr(name: &str, field_type: FieldType, param: usize) -> String {
    match cast_for(field_type) {
        Some(cast) => format!("(doc->>'{}')::{} = ${}::{}", name, cast, param, cast),
        None => format!("doc->>'{}' = ${}", name, param),
    }
}

fn selector_clause(q: &mut QueryBuf, selector: &Selector) -> String {
    match selector {
        Selector::Id(id) => {
            let n = q.push_param(BindValue::Uuid(*id));
            format!("id = ${}", n)
        }
        Selector::Field {
            name,
            field_type,
            value,
        } => {
            let n = q.push_param(BindValue::text_from(value));
            field_expr(name, *field_type, n)
        }
    }
}

/// SELECT over the collection with typed filters, limit, and offset.
/// Filters naming fields unknown to the schema are dropped.
pub fn select_list(table: &str, schema: &Schema, query: &DocumentQuery) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut where_parts = Vec::new();
    for (name, value) in &query.filters {
        if let Some(field) = schema.field(name) {
            let n = q.push_param(BindValue::text_from(value));
            where_parts.push(field_expr(name, field.field_type, n));
        }
    }
    q.sql = format!("SELECT {} FROM {}", DOC_COLUMNS, table);
    if !where_parts.is_empty() {
        q.sql.push_str(" WHERE ");
        q.sql.push_str(&where_parts.join(" AND "));
    }
    q.sql.push_str(" ORDER BY created_at, id");
    if let Some(limit) = query.limit {
        let n = q.push_param(BindValue::Text(limit.to_string()));
        q.sql.push_str(&format!(" LIMIT ${}::bigint", n));
    }
    if let Some(offset) = query.offset {
        let n = q.push_param(BindValue::Text(offset.to_string()));
        q.sql.push_str(&format!(" OFFSET ${}::bigint", n));
    }
    q
}

/// SELECT a single document by selector.
pub fn select_one(table: &str, selector: &Selector) -> QueryBuf {
    let mut q = QueryBuf::new();
    let clause = selector_clause(&mut q, selector);
    q.sql = format!("SELECT {} FROM {} WHERE {}", DOC_COLUMNS, table, clause);
    q
}

/// INSERT one document, returning the stored row.
pub fn insert(table: &str, doc: &Map<String, Value>) -> QueryBuf {
    let mut q = QueryBuf::new();
    let n = q.push_param(BindValue::Json(Value::Object(doc.clone())));
    q.sql = format!(
        "INSERT INTO {} (doc) VALUES (${}) RETURNING {}",
        table, n, DOC_COLUMNS
    );
    q
}

/// UPDATE by selector: merge the partial document into `doc` and bump
/// `updated_at`, returning the stored row.
pub fn update(table: &str, selector: &Selector, patch: &Map<String, Value>) -> QueryBuf {
    let mut q = QueryBuf::new();
    let patch_n = q.push_param(BindValue::Json(Value::Object(patch.clone())));
    let clause = selector_clause(&mut q, selector);
    q.sql = format!(
        "UPDATE {} SET doc = doc || ${}, updated_at = NOW() WHERE {} RETURNING {}",
        table, patch_n, clause, DOC_COLUMNS
    );
    q
}

/// DELETE by selector, returning the deleted id.
pub fn delete(table: &str, selector: &Selector) -> QueryBuf {
    let mut q = QueryBuf::new();
    let clause = selector_clause(&mut q, selector);
    q.sql = format!("DELETE FROM {} WHERE {} RETURNING id", table, clause);
    q
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FieldDef, FieldType};

    fn schema() -> Schema {
        Schema::new(vec![
            FieldDef::new("email", FieldType::Text).unique(),
            FieldDef::new("age", FieldType::Integer),
        ])
        .unwrap()
    }

    #[test]
    fn list_with_typed_filters_limit_offset() {
        let mut query = DocumentQuery::default();
        query.push_filter("email", serde_json::json!("a@b.c"));
        query.push_filter("age", serde_json::json!(30));
        query.limit = Some(10);
        query.offset = Some(5);
        let q = select_list("public.users", &schema(), &query);
        assert_eq!(
            q.sql,
            "SELECT id, doc, created_at, updated_at FROM public.users \
             WHERE doc->>'email' = $1 AND (doc->>'age')::bigint = $2::bigint \
             ORDER BY created_at, id LIMIT $3::bigint OFFSET $4::bigint"
        );
        assert_eq!(q.params.len(), 4);
    }

    #[test]
    fn unknown_filter_fields_are_dropped() {
        let mut query = DocumentQuery::default();
        query.push_filter("nope", serde_json::json!("x"));
        let q = select_list("public.users", &schema(), &query);
        assert!(!q.sql.contains("WHERE"));
        assert!(q.params.is_empty());
    }

    #[test]
    fn select_one_by_id_and_by_field() {
        let id = uuid::Uuid::nil();
        let q = select_one("public.users", &Selector::Id(id));
        assert!(q.sql.ends_with("WHERE id = $1"));

        let q = select_one(
            "public.users",
            &Selector::Field {
                name: "email".into(),
                field_type: FieldType::Text,
                value: serde_json::json!("a@b.c"),
            },
        );
        assert!(q.sql.ends_with("WHERE doc->>'email' = $1"));
    }

    #[test]
    fn update_merges_patch_before_selector_param() {
        let mut patch = Map::new();
        patch.insert("name".into(), serde_json::json!("new"));
        let q = update("public.users", &Selector::Id(uuid::Uuid::nil()), &patch);
        assert_eq!(
            q.sql,
            "UPDATE public.users SET doc = doc || $1, updated_at = NOW() \
             WHERE id = $2 RETURNING id, doc, created_at, updated_at"
        );
    }
}
