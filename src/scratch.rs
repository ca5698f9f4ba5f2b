//! Per-request scratch namespace. A baseline middleware layer seeds an
//! empty `Scratch` into request extensions; request-stage hooks write to
//! it and later pipeline stages read from it.

use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Request},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use serde_json::Value;
use std::collections::HashMap;

#[derive(Clone, Debug, Default)]
pub struct Scratch {
    values: HashMap<String, Value>,
}

impl Scratch {
    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.values.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.values.remove(key)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Scratch
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts.extensions.get::<Scratch>().cloned().unwrap_or_default())
    }
}

/// Baseline middleware: seed an empty scratch namespace for the request.
pub async fn attach_scratch(mut request: Request, next: Next) -> Response {
    request.extensions_mut().insert(Scratch::default());
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_get_remove() {
        let mut s = Scratch::default();
        assert!(s.is_empty());
        s.insert("conditions", serde_json::json!({ "owner": "alice" }));
        assert_eq!(s.get("conditions").unwrap()["owner"], "alice");
        assert!(s.remove("conditions").is_some());
        assert!(s.get("conditions").is_none());
    }
}
