//! Resource models: a named document type with a field schema. Models are
//! passed directly into `Controller::new`; there is no process-wide
//! model-by-name registry.

use crate::error::ConfigError;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Column names supplied by storage on every document. Schemas may not
/// declare fields with these names.
pub const RESERVED_FIELDS: &[&str] = &["id", "created_at", "updated_at"];

/// JSON-level type of a document field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Integer,
    Float,
    Boolean,
    Timestamp,
    Uuid,
    Json,
}

/// Per-field validation rule, applied to request bodies.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct FieldRule {
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub min_length: Option<u32>,
    #[serde(default)]
    pub max_length: Option<u32>,
    #[serde(default)]
    pub pattern: Option<String>,
    #[serde(default)]
    pub allowed: Option<Vec<Value>>,
    #[serde(default)]
    pub minimum: Option<f64>,
    #[serde(default)]
    pub maximum: Option<f64>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub unique: bool,
    #[serde(default)]
    pub rule: FieldRule,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        FieldDef {
            name: name.into(),
            field_type,
            required: false,
            unique: false,
            rule: FieldRule::default(),
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn rule(mut self, rule: FieldRule) -> Self {
        self.rule = rule;
        self
    }
}

fn valid_field_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// An ordered set of field definitions. Construction rejects duplicate,
/// reserved, and non-identifier field names.
#[derive(Clone, Debug, Serialize)]
pub struct Schema {
    fields: Vec<FieldDef>,
}

impl Schema {
    pub fn new(fields: Vec<FieldDef>) -> Result<Self, ConfigError> {
        let mut seen = std::collections::HashSet::new();
        for f in &fields {
            if !valid_field_name(&f.name) {
                return Err(ConfigError::InvalidFieldName(f.name.clone()));
            }
            if RESERVED_FIELDS.contains(&f.name.as_str()) {
                return Err(ConfigError::ReservedField(f.name.clone()));
            }
            if !seen.insert(f.name.as_str()) {
                return Err(ConfigError::DuplicateField(f.name.clone()));
            }
        }
        Ok(Schema { fields })
    }

    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    pub fn unique_fields(&self) -> impl Iterator<Item = &FieldDef> {
        self.fields.iter().filter(|f| f.unique)
    }
}

impl<'de> Deserialize<'de> for Schema {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let fields = Vec::<FieldDef>::deserialize(deserializer)?;
        Schema::new(fields).map_err(serde::de::Error::custom)
    }
}

/// A named resource model: the singular name plus its schema.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Model {
    name: String,
    schema: Schema,
}

impl Model {
    pub fn new(name: impl Into<String>, schema: Schema) -> Self {
        Model {
            name: name.into(),
            schema,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_rejects_duplicates_and_reserved() {
        let dup = Schema::new(vec![
            FieldDef::new("email", FieldType::Text),
            FieldDef::new("email", FieldType::Text),
        ]);
        assert!(matches!(dup, Err(ConfigError::DuplicateField(_))));

        for reserved in ["id", "created_at", "updated_at"] {
            let s = Schema::new(vec![FieldDef::new(reserved, FieldType::Text)]);
            assert!(matches!(s, Err(ConfigError::ReservedField(_))));
        }
    }

    #[test]
    fn schema_rejects_non_identifier_names() {
        for bad in ["", "1st", "e-mail", "a b", "x'y"] {
            let s = Schema::new(vec![FieldDef::new(bad, FieldType::Text)]);
            assert!(matches!(s, Err(ConfigError::InvalidFieldName(_))), "{bad}");
        }
    }

    #[test]
    fn schema_deserializes_from_field_list() {
        let json = serde_json::json!([
            { "name": "email", "type": "text", "required": true, "unique": true },
            { "name": "age", "type": "integer" }
        ]);
        let schema: Schema = serde_json::from_value(json).unwrap();
        assert!(schema.field("email").unwrap().unique);
        assert_eq!(schema.field("age").unwrap().field_type, FieldType::Integer);
        assert!(!schema.field("age").unwrap().required);
    }
}
