//! CRUD execution against the resource's document table.

use crate::error::AppError;
use crate::model::Schema;
use crate::service::DocumentQuery;
use crate::sql::{self, BindValue, QueryBuf, Selector};
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

const DEFAULT_LIMIT: u32 = 100;
const MAX_LIMIT: u32 = 1000;

pub struct CrudService;

impl CrudService {
    /// List documents with filters, limit (default 100, max 1000), and
    /// offset (default 0).
    pub async fn list(
        pool: &PgPool,
        table: &str,
        schema: &Schema,
        query: &DocumentQuery,
    ) -> Result<Vec<Value>, AppError> {
        let mut query = query.clone();
        query.limit = Some(query.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT));
        query.offset = Some(query.offset.unwrap_or(0));
        let q = sql::select_list(table, schema, &query);
        tracing::debug!(sql = %q.sql, "list");
        let rows = bind_all(sqlx::query(&q.sql), &q.params).fetch_all(pool).await?;
        rows.iter().map(row_to_document).collect()
    }

    /// Fetch one document by selector.
    pub async fn find_one(
        pool: &PgPool,
        table: &str,
        selector: &Selector,
    ) -> Result<Option<Value>, AppError> {
        let q = sql::select_one(table, selector);
        tracing::debug!(sql = %q.sql, "find_one");
        let row = bind_all(sqlx::query(&q.sql), &q.params)
            .fetch_optional(pool)
            .await?;
        row.as_ref().map(row_to_document).transpose()
    }

    /// Insert one document, returning the stored form. Unique-index
    /// violations surface as conflicts.
    pub async fn create(
        pool: &PgPool,
        table: &str,
        body: &Map<String, Value>,
    ) -> Result<Value, AppError> {
        let q = sql::insert(table, body);
        tracing::debug!(sql = %q.sql, "create");
        let row = run_returning_one(pool, &q).await?;
        row.as_ref()
            .map(row_to_document)
            .transpose()?
            .ok_or(AppError::Db(sqlx::Error::RowNotFound))
    }

    /// Merge a partial document into the selected one. Returns the
    /// updated form, or None when no document matches.
    pub async fn update(
        pool: &PgPool,
        table: &str,
        selector: &Selector,
        patch: &Map<String, Value>,
    ) -> Result<Option<Value>, AppError> {
        let q = sql::update(table, selector, patch);
        tracing::debug!(sql = %q.sql, "update");
        let row = run_returning_one(pool, &q).await?;
        row.as_ref().map(row_to_document).transpose()
    }

    /// Delete the selected document. Returns whether a document existed.
    pub async fn delete(
        pool: &PgPool,
        table: &str,
        selector: &Selector,
    ) -> Result<bool, AppError> {
        let q = sql::delete(table, selector);
        tracing::debug!(sql = %q.sql, "delete");
        let row = bind_all(sqlx::query(&q.sql), &q.params)
            .fetch_optional(pool)
            .await?;
        Ok(row.is_some())
    }
}

fn bind_all<'q>(
    mut query: sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments>,
    params: &'q [BindValue],
) -> sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments> {
    for p in params {
        query = match p {
            BindValue::Text(s) => query.bind(s),
            BindValue::Json(v) => query.bind(v),
            BindValue::Uuid(u) => query.bind(*u),
        };
    }
    query
}

async fn run_returning_one(pool: &PgPool, q: &QueryBuf) -> Result<Option<PgRow>, AppError> {
    bind_all(sqlx::query(&q.sql), &q.params)
        .fetch_optional(pool)
        .await
        .map_err(map_write_err)
}

/// PostgreSQL unique_violation maps to a conflict; everything else stays
/// a database error.
fn map_write_err(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db) = &e {
        if db.code().as_deref() == Some("23505") {
            return AppError::Conflict(db.message().to_string());
        }
    }
    AppError::Db(e)
}

/// Compose the API document: `id`, the document's own fields, then the
/// storage timestamps.
fn row_to_document(row: &PgRow) -> Result<Value, AppError> {
    let id: uuid::Uuid = row.try_get("id")?;
    let doc: Value = row.try_get("doc")?;
    let created_at: DateTime<Utc> = row.try_get("created_at")?;
    let updated_at: DateTime<Utc> = row.try_get("updated_at")?;

    let mut out = Map::new();
    out.insert("id".to_string(), Value::String(id.to_string()));
    if let Value::Object(fields) = doc {
        for (k, v) in fields {
            out.insert(k, v);
        }
    }
    out.insert(
        "created_at".to_string(),
        Value::String(created_at.to_rfc3339()),
    );
    out.insert(
        "updated_at".to_string(),
        Value::String(updated_at.to_rfc3339()),
    );
    Ok(Value::Object(out))
}
