//! Bind values for built queries. Typed filter comparisons are expressed
//! as SQL casts over text parameters, so a bound value is one of: text,
//! a JSONB payload, or a UUID.

use serde_json::Value;

#[derive(Clone, Debug)]
pub enum BindValue {
    Text(String),
    Json(Value),
    Uuid(uuid::Uuid),
}

impl BindValue {
    /// Render a filter value as its text form for a cast comparison
    /// (`($n::bigint)` etc. on the SQL side).
    pub fn text_from(value: &Value) -> BindValue {
        let text = match value {
            Value::String(s) => s.clone(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => n.to_string(),
            other => other.to_string(),
        };
        BindValue::Text(text)
    }
}
