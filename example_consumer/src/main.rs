//! Example consumer: a `user` resource mounted under /api/v1.
//!
//! Run from repo root: `cargo run -p example-consumer`
//! Requires a reachable PostgreSQL (`DATABASE_URL`, default
//! `postgres://localhost/restkit`).

use axum::{routing::get, Json, Router};
use restkit::{
    common_routes, ensure_collection, ensure_database_exists, Controller, ControllerOptions,
    FieldDef, FieldRule, FieldType, Hook, MiddlewareRegistry, MiddlewareRule, Model, Schema,
    SchemaIntrospect, SettingsAccess, Stage,
};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("restkit=info")),
        )
        .init();

    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "postgres://localhost/restkit".into());
    ensure_database_exists(&database_url).await?;
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;

    let schema = Schema::new(vec![
        FieldDef::new("email", FieldType::Text)
            .required()
            .unique()
            .rule(FieldRule {
                format: Some("email".into()),
                ..Default::default()
            }),
        FieldDef::new("name", FieldType::Text).required(),
        FieldDef::new("age", FieldType::Integer).rule(FieldRule {
            minimum: Some(0.0),
            ..Default::default()
        }),
    ])?;
    let model = Model::new("user", schema);

    let mut controller = Controller::new(
        model,
        ControllerOptions::named("user")
            .base_path("/users")
            .find_by("email"),
    )?;
    controller.register(
        MiddlewareRule::new(
            Stage::Documents,
            Hook::documents(|document, _scratch| {
                tracing::debug!(?document, "outgoing user");
                Ok(())
            }),
        )
        .verbs("get")?,
    )?;

    ensure_collection(&pool, controller.settings().collection(), controller.schema()).await?;

    let api_docs = controller.openapi_document();
    let app = Router::new()
        .merge(common_routes(pool.clone()))
        .route(
            "/docs",
            get(move || {
                let docs = api_docs.clone();
                async move { Json(docs) }
            }),
        )
        .nest("/api/v1", controller.into_router(pool));

    let listener = TcpListener::bind("0.0.0.0:3000").await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
