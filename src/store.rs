//! Storage bootstrap: database creation and per-resource document
//! tables. Tables live in the schema named by `RESTKIT_SCHEMA`
//! (default `public`).

use crate::error::AppError;
use crate::model::Schema;
use sqlx::ConnectOptions;
use sqlx::PgPool;
use std::str::FromStr;

/// Schema name for document tables. From env `RESTKIT_SCHEMA`, default
/// `public`. Must be a valid PostgreSQL identifier.
pub fn storage_schema() -> String {
    std::env::var("RESTKIT_SCHEMA").unwrap_or_else(|_| "public".into())
}

/// Schema-qualified table name for a collection (e.g. `public.users`).
pub fn qualified_collection(collection: &str) -> String {
    format!(
        "{}.{}",
        quote_ident(&storage_schema()),
        quote_ident(collection)
    )
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Create the document table for a collection (idempotent), plus one
/// unique expression index per unique schema field.
pub async fn ensure_collection(
    pool: &PgPool,
    collection: &str,
    schema: &Schema,
) -> Result<(), AppError> {
    let storage = storage_schema();
    if storage != "public" {
        sqlx::query(&format!(
            "CREATE SCHEMA IF NOT EXISTS {}",
            quote_ident(&storage)
        ))
        .execute(pool)
        .await?;
    }

    let table = qualified_collection(collection);
    let ddl = format!(
        r#"
        CREATE TABLE IF NOT EXISTS {} (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            doc JSONB NOT NULL DEFAULT '{{}}'::jsonb,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
        table
    );
    sqlx::query(&ddl).execute(pool).await?;

    for field in schema.unique_fields() {
        let index_name = quote_ident(&format!("{}_{}_key", collection, field.name));
        let index_ddl = format!(
            "CREATE UNIQUE INDEX IF NOT EXISTS {} ON {} ((doc->>'{}'))",
            index_name, table, field.name
        );
        sqlx::query(&index_ddl).execute(pool).await?;
    }

    tracing::debug!(collection, "collection ensured");
    Ok(())
}

/// Create the database named in the URL if it does not exist. No-op for
/// the maintenance database itself.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), AppError> {
    let (admin_url, db_name) = split_db_name(database_url)?;
    if db_name.is_empty() || db_name == "postgres" {
        return Ok(());
    }
    let opts = sqlx::postgres::PgConnectOptions::from_str(&admin_url)
        .map_err(|e| AppError::BadRequest(format!("invalid DATABASE_URL: {}", e)))?;
    let mut conn: sqlx::PgConnection = opts.connect().await.map_err(AppError::Db)?;
    let exists: (bool,) =
        sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
            .bind(&db_name)
            .fetch_one(&mut conn)
            .await
            .map_err(AppError::Db)?;
    if !exists.0 {
        sqlx::query(&format!("CREATE DATABASE {}", quote_ident(&db_name)))
            .execute(&mut conn)
            .await
            .map_err(AppError::Db)?;
        tracing::info!(database = %db_name, "database created");
    }
    Ok(())
}

fn split_db_name(url: &str) -> Result<(String, String), AppError> {
    let path_start = url
        .rfind('/')
        .ok_or_else(|| AppError::BadRequest("DATABASE_URL: no path".into()))?
        + 1;
    let path_and_query = url.get(path_start..).unwrap_or("");
    let db_name = path_and_query.split('?').next().unwrap_or("").trim();
    let base = url.get(..path_start).unwrap_or(url);
    Ok((format!("{}postgres", base), db_name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_database_name_from_url() {
        let (admin, name) = split_db_name("postgres://localhost/app").unwrap();
        assert_eq!(admin, "postgres://localhost/postgres");
        assert_eq!(name, "app");

        let (_, name) = split_db_name("postgres://u:p@host:5432/app?sslmode=disable").unwrap();
        assert_eq!(name, "app");
    }

    #[test]
    fn qualifies_collection_names() {
        std::env::remove_var("RESTKIT_SCHEMA");
        assert_eq!(qualified_collection("users"), "\"public\".\"users\"");
    }
}
