//! Resource handlers: each runs the staged pipeline around the storage
//! call — request hooks, query hooks (collection reads), the CRUD
//! operation, then document hooks over everything outgoing.

use crate::error::AppError;
use crate::middleware::{Scope, Verb};
use crate::response::{created_one, ok_many, ok_one};
use crate::scratch::Scratch;
use crate::service::{query::coerce_param, CrudService, DocumentQuery, DocumentValidator};
use crate::sql::Selector;
use crate::state::ControllerState;
use crate::store::qualified_collection;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Resolve the `:id` path segment through the controller's `find_by`
/// setting: the primary key parses as a UUID, any other lookup field
/// coerces by its declared type.
fn selector_for(state: &ControllerState, raw: &str) -> Result<Selector, AppError> {
    let find_by = state.settings.find_by.as_str();
    if find_by == "id" {
        let id = uuid::Uuid::parse_str(raw)
            .map_err(|_| AppError::BadRequest(format!("invalid id '{}'", raw)))?;
        return Ok(Selector::Id(id));
    }
    // construction validated the lookup field exists and is unique
    let field = state
        .model
        .schema()
        .field(find_by)
        .ok_or_else(|| AppError::BadRequest(format!("unknown lookup field '{}'", find_by)))?;
    Ok(Selector::Field {
        name: field.name.clone(),
        field_type: field.field_type,
        value: coerce_param(field.field_type, raw),
    })
}

fn body_to_map(value: Value) -> Result<Map<String, Value>, AppError> {
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(AppError::BadRequest("body must be a JSON object".into())),
    }
}

pub async fn list(
    State(state): State<ControllerState>,
    scratch: Scratch,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let mut scratch = scratch;
    state
        .pipeline
        .run_request(Verb::Get, Scope::Collection, &mut scratch)?;

    let mut query = DocumentQuery::from_params(state.model.schema(), params);
    state
        .pipeline
        .run_query(Verb::Get, Scope::Collection, &mut query, &scratch)?;

    let table = qualified_collection(state.settings.collection());
    let mut documents =
        CrudService::list(&state.pool, &table, state.model.schema(), &query).await?;
    for document in &mut documents {
        state
            .pipeline
            .run_documents(Verb::Get, Scope::Collection, document, &scratch)?;
    }
    Ok(ok_many(documents))
}

pub async fn read(
    State(state): State<ControllerState>,
    scratch: Scratch,
    Path(id): Path<String>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let mut scratch = scratch;
    state
        .pipeline
        .run_request(Verb::Get, Scope::Instance, &mut scratch)?;

    let selector = selector_for(&state, &id)?;
    let table = qualified_collection(state.settings.collection());
    let mut document = CrudService::find_one(&state.pool, &table, &selector)
        .await?
        .ok_or(AppError::NotFound(id))?;
    state
        .pipeline
        .run_documents(Verb::Get, Scope::Instance, &mut document, &scratch)?;
    Ok(ok_one(document))
}

pub async fn create(
    State(state): State<ControllerState>,
    scratch: Scratch,
    Json(body): Json<Value>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let mut scratch = scratch;
    state
        .pipeline
        .run_request(Verb::Post, Scope::Collection, &mut scratch)?;

    let body = body_to_map(body)?;
    DocumentValidator::validate(&body, state.model.schema())?;

    let table = qualified_collection(state.settings.collection());
    let mut document = CrudService::create(&state.pool, &table, &body).await?;
    state
        .pipeline
        .run_documents(Verb::Post, Scope::Collection, &mut document, &scratch)?;
    Ok(created_one(document))
}

pub async fn update(
    State(state): State<ControllerState>,
    scratch: Scratch,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let mut scratch = scratch;
    state
        .pipeline
        .run_request(Verb::Put, Scope::Instance, &mut scratch)?;

    let body = body_to_map(body)?;
    DocumentValidator::validate_partial(&body, state.model.schema())?;

    let selector = selector_for(&state, &id)?;
    let table = qualified_collection(state.settings.collection());
    let mut document = CrudService::update(&state.pool, &table, &selector, &body)
        .await?
        .ok_or(AppError::NotFound(id))?;
    state
        .pipeline
        .run_documents(Verb::Put, Scope::Instance, &mut document, &scratch)?;
    Ok(ok_one(document))
}

pub async fn destroy(
    State(state): State<ControllerState>,
    scratch: Scratch,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let mut scratch = scratch;
    state
        .pipeline
        .run_request(Verb::Delete, Scope::Instance, &mut scratch)?;

    let selector = selector_for(&state, &id)?;
    let table = qualified_collection(state.settings.collection());
    if !CrudService::delete(&state.pool, &table, &selector).await? {
        return Err(AppError::NotFound(id));
    }
    Ok(StatusCode::NO_CONTENT)
}
