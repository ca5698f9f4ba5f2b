//! The resource controller: validates options, derives conventions,
//! collects middleware rules, and turns into a mountable axum router.

mod options;
mod settings;

pub use options::{ControllerOptions, ResourceSpec};
pub use settings::Settings;

use crate::docs;
use crate::error::ConfigError;
use crate::middleware::{MiddlewareRule, Pipeline};
use crate::model::{Model, Schema};
use crate::routes;
use crate::state::ControllerState;
use axum::Router;
use serde_json::Value;
use sqlx::PgPool;
use std::sync::Arc;

/// Read and write access to the controller's settings store.
pub trait SettingsAccess {
    fn settings(&self) -> &Settings;
    fn settings_mut(&mut self) -> &mut Settings;
}

/// Registration of user middleware rules.
pub trait MiddlewareRegistry {
    fn register(&mut self, rule: MiddlewareRule) -> Result<(), ConfigError>;
}

/// Introspection over the injected model and its schema.
pub trait SchemaIntrospect {
    fn model(&self) -> &Model;
    fn schema(&self) -> &Schema;
    /// OpenAPI 3.0 document describing the mounted endpoints.
    fn openapi_document(&self) -> Value;
}

#[derive(Debug)]
pub struct Controller {
    model: Arc<Model>,
    settings: Settings,
    rules: Vec<MiddlewareRule>,
    pipeline: Option<Arc<Pipeline>>,
    initialized: bool,
}

impl Controller {
    /// Build a controller for `model` from a bare name or an options
    /// record. All validation happens here; construction either succeeds
    /// fully or aborts with the first failure.
    pub fn new(model: Model, spec: impl Into<ResourceSpec>) -> Result<Self, ConfigError> {
        let options = spec.into().into_options();

        if options.singular.trim().is_empty() {
            return Err(ConfigError::MissingSingular);
        }
        if options.singular != model.name() {
            return Err(ConfigError::ModelMismatch {
                singular: options.singular.clone(),
                model: model.name().to_string(),
            });
        }
        if let Some(base_path) = &options.base_path {
            if !base_path.starts_with('/') {
                return Err(ConfigError::BasePathMissingSlash(base_path.clone()));
            }
            if base_path.ends_with('/') {
                return Err(ConfigError::BasePathTrailingSlash(base_path.clone()));
            }
        }
        if let Some(find_by) = &options.find_by {
            if find_by != "id" {
                match model.schema().field(find_by) {
                    None => {
                        return Err(ConfigError::UnknownLookupField {
                            singular: options.singular.clone(),
                            field: find_by.clone(),
                        })
                    }
                    Some(field) if !field.unique => {
                        return Err(ConfigError::NonUniqueLookup {
                            singular: options.singular.clone(),
                            field: find_by.clone(),
                        })
                    }
                    Some(_) => {}
                }
            }
        }

        let settings = Settings::derive(&options);
        tracing::debug!(
            singular = %settings.singular,
            plural = %settings.plural,
            base_path = %settings.base_path,
            find_by = %settings.find_by,
            "controller configured"
        );

        Ok(Controller {
            model: Arc::new(model),
            settings,
            rules: Vec::new(),
            pipeline: None,
            initialized: false,
        })
    }

    /// Activate the controller: freeze registered rules into the run
    /// pipeline. Idempotent; only the first call activates.
    pub fn initialize(&mut self) -> &mut Self {
        if !self.initialized {
            self.activate();
            self.initialized = true;
        }
        self
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    fn activate(&mut self) {
        let rules = std::mem::take(&mut self.rules);
        tracing::info!(
            resource = %self.settings.singular,
            rules = rules.len(),
            "controller activated"
        );
        self.pipeline = Some(Arc::new(Pipeline::new(rules)));
    }

    /// Initialize (if not already) and build the mountable sub-router:
    /// active verbs wired to handlers under the derived paths, behind the
    /// baseline body-limit and scratch layers.
    pub fn into_router(mut self, pool: PgPool) -> Router {
        self.initialize();
        let pipeline = match &self.pipeline {
            Some(pipeline) => Arc::clone(pipeline),
            None => Arc::new(Pipeline::empty()),
        };
        let state = ControllerState {
            pool,
            model: Arc::clone(&self.model),
            settings: Arc::new(self.settings),
            pipeline,
        };
        routes::resource_router(state)
    }
}

impl SettingsAccess for Controller {
    fn settings(&self) -> &Settings {
        &self.settings
    }

    fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }
}

impl MiddlewareRegistry for Controller {
    fn register(&mut self, rule: MiddlewareRule) -> Result<(), ConfigError> {
        if self.initialized {
            return Err(ConfigError::AlreadyInitialized);
        }
        rule.check_stage()?;
        self.rules.push(rule);
        Ok(())
    }
}

impl SchemaIntrospect for Controller {
    fn model(&self) -> &Model {
        &self.model
    }

    fn schema(&self) -> &Schema {
        self.model.schema()
    }

    fn openapi_document(&self) -> Value {
        docs::openapi_document(&self.settings, &self.model)
    }
}
