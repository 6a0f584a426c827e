//! Page context values.

use serde_json::{Map, Value};

/// Ordered string-keyed mapping passed to templates.
pub type Context = Map<String, Value>;

/// Shallow merge: `base` keys first, `overrides` win on collision.
///
/// Key order follows first insertion, so an overridden key keeps the
/// position it had in `base`.
pub fn merge(base: &Context, overrides: &Context) -> Context {
    let mut merged = base.clone();
    for (key, value) in overrides {
        merged.insert(key.clone(), value.clone());
    }
    merged
}

/// Display form of a scalar value, `None` for arrays, objects and null.
pub fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}
