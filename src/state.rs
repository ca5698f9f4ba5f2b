//! Shared state cloned into every handler of a controller's router.

use crate::controller::Settings;
use crate::middleware::Pipeline;
use crate::model::Model;
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct ControllerState {
    pub pool: PgPool,
    pub model: Arc<Model>,
    pub settings: Arc<Settings>,
    pub pipeline: Arc<Pipeline>,
}
