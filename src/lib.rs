//! restkit: model-driven CRUD resource controllers for axum + PostgreSQL.

pub mod controller;
pub mod docs;
pub mod error;
pub mod handlers;
pub mod inflect;
pub mod middleware;
pub mod model;
pub mod response;
pub mod routes;
pub mod scratch;
pub mod service;
pub mod sql;
pub mod state;
pub mod store;

pub use controller::{
    Controller, ControllerOptions, MiddlewareRegistry, ResourceSpec, SchemaIntrospect, Settings,
    SettingsAccess,
};
pub use error::{AppError, ConfigError};
pub use middleware::{Hook, MiddlewareRule, Pipeline, Scope, Stage, Verb, VerbSet};
pub use model::{FieldDef, FieldRule, FieldType, Model, Schema};
pub use routes::common_routes;
pub use scratch::Scratch;
pub use service::{CrudService, DocumentQuery, DocumentValidator};
pub use state::ControllerState;
pub use store::{ensure_collection, ensure_database_exists};
