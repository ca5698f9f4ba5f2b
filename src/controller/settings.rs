//! The controller's settings store: derived conventions, verb toggles,
//! and the verbatim copy of unrecognized option keys.

use crate::controller::options::ControllerOptions;
use crate::inflect;
use crate::middleware::Verb;
use serde_json::Value;
use std::collections::HashMap;

#[derive(Clone, Debug)]
pub struct Settings {
    pub singular: String,
    pub plural: String,
    pub find_by: String,
    pub base_path: String,
    pub base_path_with_id: String,
    /// Convention marker only; axum has no optional path segments, so
    /// routing mounts the base and with-id variants separately.
    pub base_path_with_optional_id: String,
    disabled_verbs: Vec<Verb>,
    extra: HashMap<String, Value>,
}

impl Settings {
    /// Derive settings from validated options: inflected plural, lookup
    /// field default, path variants, and the extras copied as-is.
    pub(crate) fn derive(options: &ControllerOptions) -> Settings {
        let plural = options
            .plural
            .clone()
            .unwrap_or_else(|| inflect::pluralize(&options.singular));
        let base_path = options.base_path.clone().unwrap_or_else(|| "/".to_string());
        let separator = if base_path == "/" { "" } else { "/" };
        let base_path_with_id = format!("{}{}:id", base_path, separator);
        let base_path_with_optional_id = format!("{}{}:id?", base_path, separator);
        Settings {
            singular: options.singular.clone(),
            plural,
            find_by: options.find_by.clone().unwrap_or_else(|| "id".to_string()),
            base_path,
            base_path_with_id,
            base_path_with_optional_id,
            disabled_verbs: Vec::new(),
            extra: options.extra.clone(),
        }
    }

    /// The storage table name for this resource.
    pub fn collection(&self) -> &str {
        &self.plural
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.extra.insert(key.into(), value);
    }

    pub fn disable_verb(&mut self, verb: Verb) {
        if !self.disabled_verbs.contains(&verb) {
            self.disabled_verbs.push(verb);
        }
    }

    pub fn enable_verb(&mut self, verb: Verb) {
        self.disabled_verbs.retain(|v| *v != verb);
    }

    pub fn verb_enabled(&self, verb: Verb) -> bool {
        !self.disabled_verbs.contains(&verb)
    }

    /// Enabled verbs, in `head get post put delete` order.
    pub fn active_verbs(&self) -> Vec<Verb> {
        Verb::ALL
            .iter()
            .copied()
            .filter(|v| self.verb_enabled(*v))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_paths_for_root_base() {
        let settings = Settings::derive(&ControllerOptions::named("user"));
        assert_eq!(settings.base_path, "/");
        assert_eq!(settings.base_path_with_id, "/:id");
        assert_eq!(settings.base_path_with_optional_id, "/:id?");
    }

    #[test]
    fn derives_paths_for_nested_base() {
        let options = ControllerOptions::named("user").base_path("/accounts/users");
        let settings = Settings::derive(&options);
        assert_eq!(settings.base_path_with_id, "/accounts/users/:id");
        assert_eq!(settings.base_path_with_optional_id, "/accounts/users/:id?");
    }

    #[test]
    fn plural_and_find_by_defaults() {
        let settings = Settings::derive(&ControllerOptions::named("query"));
        assert_eq!(settings.plural, "queries");
        assert_eq!(settings.find_by, "id");
        assert_eq!(settings.collection(), "queries");
    }

    #[test]
    fn verb_toggles_filter_active_verbs() {
        let mut settings = Settings::derive(&ControllerOptions::named("user"));
        assert_eq!(settings.active_verbs().len(), 5);
        settings.disable_verb(Verb::Delete);
        settings.disable_verb(Verb::Put);
        let active = settings.active_verbs();
        assert_eq!(active, vec![Verb::Head, Verb::Get, Verb::Post]);
        settings.enable_verb(Verb::Put);
        assert!(settings.verb_enabled(Verb::Put));
    }
}
