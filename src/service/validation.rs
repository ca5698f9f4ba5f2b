//! Request-body validation against the resource schema.

use crate::error::AppError;
use crate::model::{FieldDef, FieldRule, FieldType, Schema};
use regex::Regex;
use serde_json::{Map, Value};

pub struct DocumentValidator;

impl DocumentValidator {
    /// Validate a full document (create): required fields must be
    /// present and non-null, unknown fields are rejected, every present
    /// field is type- and rule-checked.
    pub fn validate(body: &Map<String, Value>, schema: &Schema) -> Result<(), AppError> {
        Self::reject_unknown(body, schema)?;
        for field in schema.fields() {
            let value = body.get(&field.name);
            if field.required && value.map_or(true, Value::is_null) {
                return Err(AppError::Validation(format!("{} is required", field.name)));
            }
            if let Some(v) = value {
                validate_field(field, v)?;
            }
        }
        Ok(())
    }

    /// Validate only the fields present (update). Required is not
    /// enforced for absent fields, but a present required field may not
    /// be nulled out.
    pub fn validate_partial(body: &Map<String, Value>, schema: &Schema) -> Result<(), AppError> {
        Self::reject_unknown(body, schema)?;
        for (name, value) in body {
            if let Some(field) = schema.field(name) {
                if field.required && value.is_null() {
                    return Err(AppError::Validation(format!(
                        "{} is required and cannot be null",
                        name
                    )));
                }
                validate_field(field, value)?;
            }
        }
        Ok(())
    }

    fn reject_unknown(body: &Map<String, Value>, schema: &Schema) -> Result<(), AppError> {
        for name in body.keys() {
            if schema.field(name).is_none() {
                return Err(AppError::Validation(format!("unknown field '{}'", name)));
            }
        }
        Ok(())
    }
}

fn validate_field(field: &FieldDef, value: &Value) -> Result<(), AppError> {
    if value.is_null() {
        return Ok(());
    }
    check_type(field, value)?;
    check_rule(&field.name, value, &field.rule)
}

fn check_type(field: &FieldDef, value: &Value) -> Result<(), AppError> {
    let ok = match field.field_type {
        FieldType::Text => value.is_string(),
        FieldType::Integer => value.as_i64().is_some() || value.as_u64().is_some(),
        FieldType::Float => value.is_number(),
        FieldType::Boolean => value.is_boolean(),
        FieldType::Timestamp => value
            .as_str()
            .map(|s| chrono::DateTime::parse_from_rfc3339(s).is_ok())
            .unwrap_or(false),
        FieldType::Uuid => value
            .as_str()
            .map(|s| uuid::Uuid::parse_str(s).is_ok())
            .unwrap_or(false),
        FieldType::Json => value.is_object() || value.is_array(),
    };
    if ok {
        Ok(())
    } else {
        Err(AppError::Validation(format!(
            "{} must be of type {:?}",
            field.name, field.field_type
        )))
    }
}

fn check_rule(name: &str, value: &Value, rule: &FieldRule) -> Result<(), AppError> {
    if let Some(format) = &rule.format {
        check_format(name, value, format)?;
    }
    if let Some(min) = rule.min_length {
        if let Some(s) = value.as_str() {
            if s.len() < min as usize {
                return Err(AppError::Validation(format!(
                    "{} must be at least {} characters",
                    name, min
                )));
            }
        }
    }
    if let Some(max) = rule.max_length {
        if let Some(s) = value.as_str() {
            if s.len() > max as usize {
                return Err(AppError::Validation(format!(
                    "{} must be at most {} characters",
                    name, max
                )));
            }
        }
    }
    if let Some(pattern) = &rule.pattern {
        let re = Regex::new(pattern)
            .map_err(|_| AppError::Validation(format!("invalid pattern for {}", name)))?;
        if let Some(s) = value.as_str() {
            if !re.is_match(s) {
                return Err(AppError::Validation(format!(
                    "{} does not match required pattern",
                    name
                )));
            }
        }
    }
    if let Some(allowed) = &rule.allowed {
        if !allowed.iter().any(|a| value_eq(value, a)) {
            return Err(AppError::Validation(format!(
                "{} must be one of: {:?}",
                name,
                allowed.iter().take(5).collect::<Vec<_>>()
            )));
        }
    }
    if let Some(min) = rule.minimum {
        if let Some(n) = value.as_f64() {
            if n < min {
                return Err(AppError::Validation(format!(
                    "{} must be at least {}",
                    name, min
                )));
            }
        }
    }
    if let Some(max) = rule.maximum {
        if let Some(n) = value.as_f64() {
            if n > max {
                return Err(AppError::Validation(format!(
                    "{} must be at most {}",
                    name, max
                )));
            }
        }
    }
    Ok(())
}

fn value_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(n), Value::Number(m)) => n.as_f64() == m.as_f64(),
        _ => a == b,
    }
}

fn check_format(name: &str, value: &Value, format: &str) -> Result<(), AppError> {
    match format.to_lowercase().as_str() {
        "email" => {
            if let Some(s) = value.as_str() {
                if !s.contains('@') || s.len() < 3 {
                    return Err(AppError::Validation(format!(
                        "{} must be a valid email",
                        name
                    )));
                }
            }
        }
        "uuid" => {
            if let Some(s) = value.as_str() {
                if uuid::Uuid::parse_str(s).is_err() {
                    return Err(AppError::Validation(format!(
                        "{} must be a valid UUID",
                        name
                    )));
                }
            }
        }
        _ => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FieldDef, FieldType};

    fn schema() -> Schema {
        Schema::new(vec![
            FieldDef::new("email", FieldType::Text).required().rule(FieldRule {
                format: Some("email".into()),
                ..Default::default()
            }),
            FieldDef::new("age", FieldType::Integer).rule(FieldRule {
                minimum: Some(0.0),
                maximum: Some(150.0),
                ..Default::default()
            }),
            FieldDef::new("role", FieldType::Text).rule(FieldRule {
                allowed: Some(vec![serde_json::json!("admin"), serde_json::json!("member")]),
                ..Default::default()
            }),
        ])
        .unwrap()
    }

    fn body(v: Value) -> Map<String, Value> {
        v.as_object().unwrap().clone()
    }

    #[test]
    fn full_validation_enforces_required_and_unknown() {
        let schema = schema();
        let missing = body(serde_json::json!({ "age": 30 }));
        assert!(DocumentValidator::validate(&missing, &schema).is_err());

        let unknown = body(serde_json::json!({ "email": "a@b.c", "nickname": "x" }));
        assert!(DocumentValidator::validate(&unknown, &schema).is_err());

        let ok = body(serde_json::json!({ "email": "a@b.c", "age": 30, "role": "admin" }));
        assert!(DocumentValidator::validate(&ok, &schema).is_ok());
    }

    #[test]
    fn type_mismatches_fail() {
        let schema = schema();
        let wrong = body(serde_json::json!({ "email": "a@b.c", "age": "thirty" }));
        assert!(DocumentValidator::validate(&wrong, &schema).is_err());
    }

    #[test]
    fn rules_apply_to_present_fields() {
        let schema = schema();
        let out_of_range = body(serde_json::json!({ "email": "a@b.c", "age": 200 }));
        assert!(DocumentValidator::validate(&out_of_range, &schema).is_err());

        let bad_enum = body(serde_json::json!({ "email": "a@b.c", "role": "owner" }));
        assert!(DocumentValidator::validate(&bad_enum, &schema).is_err());

        let bad_email = body(serde_json::json!({ "email": "nope" }));
        assert!(DocumentValidator::validate(&bad_email, &schema).is_err());
    }

    #[test]
    fn partial_validation_skips_absent_required_fields() {
        let schema = schema();
        let patch = body(serde_json::json!({ "age": 31 }));
        assert!(DocumentValidator::validate_partial(&patch, &schema).is_ok());

        let null_required = body(serde_json::json!({ "email": null }));
        assert!(DocumentValidator::validate_partial(&null_required, &schema).is_err());
    }
}
