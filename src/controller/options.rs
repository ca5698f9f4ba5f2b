//! Construction input: a bare resource name or an options record.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// What `Controller::new` accepts: either a bare singular name or a full
/// options record. A bare name means `{ singular: <name> }`.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResourceSpec {
    Name(String),
    Options(ControllerOptions),
}

impl ResourceSpec {
    pub fn into_options(self) -> ControllerOptions {
        match self {
            ResourceSpec::Name(name) => ControllerOptions::named(name),
            ResourceSpec::Options(options) => options,
        }
    }
}

impl From<&str> for ResourceSpec {
    fn from(name: &str) -> Self {
        ResourceSpec::Name(name.to_string())
    }
}

impl From<String> for ResourceSpec {
    fn from(name: String) -> Self {
        ResourceSpec::Name(name)
    }
}

impl From<ControllerOptions> for ResourceSpec {
    fn from(options: ControllerOptions) -> Self {
        ResourceSpec::Options(options)
    }
}

/// Controller options. `singular` is required; everything else is
/// optional and named. Keys outside the recognized set are kept and
/// copied verbatim onto the settings store.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ControllerOptions {
    #[serde(default)]
    pub singular: String,
    #[serde(default)]
    pub plural: Option<String>,
    #[serde(default)]
    pub base_path: Option<String>,
    #[serde(default)]
    pub find_by: Option<String>,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

impl ControllerOptions {
    pub fn named(singular: impl Into<String>) -> Self {
        ControllerOptions {
            singular: singular.into(),
            ..Default::default()
        }
    }

    pub fn plural(mut self, plural: impl Into<String>) -> Self {
        self.plural = Some(plural.into());
        self
    }

    pub fn base_path(mut self, base_path: impl Into<String>) -> Self {
        self.base_path = Some(base_path.into());
        self
    }

    pub fn find_by(mut self, find_by: impl Into<String>) -> Self {
        self.find_by = Some(find_by.into());
        self
    }

    pub fn extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_string_deserializes_to_name() {
        let spec: ResourceSpec = serde_json::from_value(serde_json::json!("user")).unwrap();
        let options = spec.into_options();
        assert_eq!(options.singular, "user");
        assert!(options.plural.is_none());
        assert!(options.extra.is_empty());
    }

    #[test]
    fn record_deserializes_with_extras_flattened() {
        let spec: ResourceSpec = serde_json::from_value(serde_json::json!({
            "singular": "user",
            "base_path": "/users",
            "page_size": 25
        }))
        .unwrap();
        let options = spec.into_options();
        assert_eq!(options.singular, "user");
        assert_eq!(options.base_path.as_deref(), Some("/users"));
        assert_eq!(options.extra["page_size"], serde_json::json!(25));
    }
}
