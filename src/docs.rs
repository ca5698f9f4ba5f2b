//! OpenAPI 3.0 document generation from a controller's settings and
//! model schema.

use crate::controller::Settings;
use crate::middleware::Verb;
use crate::model::{FieldType, Model};
use serde_json::{json, Map, Value};

/// Convert an axum-style path (`/users/:id`) to OpenAPI (`/users/{id}`).
fn openapi_path(path: &str) -> String {
    path.split('/')
        .map(|segment| match segment.strip_prefix(':') {
            Some(name) => format!("{{{}}}", name),
            None => segment.to_string(),
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn openapi_type(field_type: FieldType) -> Value {
    match field_type {
        FieldType::Text => json!({ "type": "string" }),
        FieldType::Integer => json!({ "type": "integer" }),
        FieldType::Float => json!({ "type": "number" }),
        FieldType::Boolean => json!({ "type": "boolean" }),
        FieldType::Timestamp => json!({ "type": "string", "format": "date-time" }),
        FieldType::Uuid => json!({ "type": "string", "format": "uuid" }),
        FieldType::Json => json!({}),
    }
}

fn component_schema(model: &Model) -> Value {
    let mut properties = Map::new();
    properties.insert("id".into(), json!({ "type": "string", "format": "uuid" }));
    for field in model.schema().fields() {
        properties.insert(field.name.clone(), openapi_type(field.field_type));
    }
    properties.insert(
        "created_at".into(),
        json!({ "type": "string", "format": "date-time" }),
    );
    properties.insert(
        "updated_at".into(),
        json!({ "type": "string", "format": "date-time" }),
    );
    let required: Vec<&str> = model
        .schema()
        .fields()
        .iter()
        .filter(|f| f.required)
        .map(|f| f.name.as_str())
        .collect();
    json!({
        "type": "object",
        "properties": Value::Object(properties),
        "required": required,
    })
}

fn operation(summary: String, schema_ref: &str, many: bool) -> Value {
    let data = if many {
        json!({ "type": "array", "items": { "$ref": schema_ref } })
    } else {
        json!({ "$ref": schema_ref })
    };
    json!({
        "summary": summary,
        "responses": {
            "default": {
                "description": "resource envelope",
                "content": {
                    "application/json": {
                        "schema": { "type": "object", "properties": { "data": data } }
                    }
                }
            }
        }
    })
}

/// Build the OpenAPI document for the mounted endpoints: one path item
/// per derived path, one operation per active verb.
pub fn openapi_document(settings: &Settings, model: &Model) -> Value {
    let schema_ref = format!("#/components/schemas/{}", settings.singular);
    let id_param = json!([{
        "name": "id",
        "in": "path",
        "required": true,
        "schema": { "type": "string" }
    }]);

    let mut collection_ops = Map::new();
    if settings.verb_enabled(Verb::Get) {
        collection_ops.insert(
            "get".into(),
            operation(format!("List {}", settings.plural), &schema_ref, true),
        );
    }
    if settings.verb_enabled(Verb::Post) {
        collection_ops.insert(
            "post".into(),
            operation(format!("Create a {}", settings.singular), &schema_ref, false),
        );
    }

    let mut instance_ops = Map::new();
    if settings.verb_enabled(Verb::Get) {
        instance_ops.insert(
            "get".into(),
            operation(format!("Get a {}", settings.singular), &schema_ref, false),
        );
    }
    if settings.verb_enabled(Verb::Put) {
        instance_ops.insert(
            "put".into(),
            operation(format!("Update a {}", settings.singular), &schema_ref, false),
        );
    }
    if settings.verb_enabled(Verb::Delete) {
        instance_ops.insert(
            "delete".into(),
            operation(format!("Delete a {}", settings.singular), &schema_ref, false),
        );
    }
    instance_ops.insert("parameters".into(), id_param);

    let mut paths = Map::new();
    if !collection_ops.is_empty() {
        paths.insert(
            openapi_path(&settings.base_path),
            Value::Object(collection_ops),
        );
    }
    if instance_ops.len() > 1 {
        paths.insert(
            openapi_path(&settings.base_path_with_id),
            Value::Object(instance_ops),
        );
    }

    let mut schemas = Map::new();
    schemas.insert(settings.singular.clone(), component_schema(model));

    json!({
        "openapi": "3.0.3",
        "info": {
            "title": settings.plural,
            "version": env!("CARGO_PKG_VERSION"),
        },
        "paths": Value::Object(paths),
        "components": {
            "schemas": Value::Object(schemas)
        }
    })
}
