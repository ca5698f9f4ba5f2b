//! Typed errors and HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Construction-time failures. Building a controller either succeeds fully
/// or aborts with one of these; nothing is recovered internally.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("resource options must include a singular name")]
    MissingSingular,
    #[error("singular '{singular}' does not match model '{model}'")]
    ModelMismatch { singular: String, model: String },
    #[error("base path '{0}' must start with '/'")]
    BasePathMissingSlash(String),
    #[error("base path '{0}' must not end with '/'")]
    BasePathTrailingSlash(String),
    #[error("find_by field '{field}' does not exist on '{singular}'")]
    UnknownLookupField { singular: String, field: String },
    #[error("find_by field '{field}' on '{singular}' is not unique")]
    NonUniqueLookup { singular: String, field: String },
    #[error("'{0}' is a reserved field name")]
    ReservedField(String),
    #[error("duplicate field '{0}' in schema")]
    DuplicateField(String),
    #[error("'{0}' is not a valid field name")]
    InvalidFieldName(String),
    #[error("unknown verb '{0}' in verb filter")]
    UnknownVerb(String),
    #[error("verb filter must name at least one verb")]
    EmptyVerbFilter,
    #[error("{hook} hook cannot run in the {stage} stage")]
    StageMismatch {
        stage: &'static str,
        hook: &'static str,
    },
    #[error("controller is already initialized")]
    AlreadyInitialized,
}

/// Request-time failures, mapped onto HTTP statuses by `IntoResponse`.
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("validation: {0}")]
    Validation(String),
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("bad request: {0}")]
    BadRequest(String),
}

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: &'static str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            AppError::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "config_error"),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            AppError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "validation_error"),
            AppError::Db(sqlx::Error::RowNotFound) => (StatusCode::NOT_FOUND, "not_found"),
            AppError::Db(_) => (StatusCode::INTERNAL_SERVER_ERROR, "database_error"),
            AppError::Conflict(_) => (StatusCode::CONFLICT, "conflict"),
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
        };
        let body = ErrorBody {
            error: ErrorDetail {
                code,
                message: self.to_string(),
            },
        };
        (status, Json(body)).into_response()
    }
}
