//! Tolerant readers for the fields the duplicate detector looks at.
//!
//! Uploaded files are not schema-validated, so a stat stored as `"50"`, `50.0`
//! or `null` must still load. Anything that cannot be read as the target type
//! becomes `None` instead of failing.

use std::borrow::Cow;

use serde_json::Value;

/// Integer from a number, an integral float or a numeric string.
pub(crate) fn int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.is_finite())
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

/// Scalar rendered as text. Strings are borrowed.
pub(crate) fn text(value: &Value) -> Option<Cow<'_, str>> {
    match value {
        Value::String(s) => Some(Cow::Borrowed(s.as_str())),
        Value::Number(n) => Some(Cow::Owned(n.to_string())),
        Value::Bool(b) => Some(Cow::Owned(b.to_string())),
        _ => None,
    }
}

pub(crate) fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn int_accepts_numbers_and_numeric_strings() {
        assert_eq!(int(&json!(42)), Some(42));
        assert_eq!(int(&json!(42.0)), Some(42));
        assert_eq!(int(&json!(" 7 ")), Some(7));
    }

    #[test]
    fn int_rejects_everything_else() {
        assert_eq!(int(&json!(4.5)), None);
        assert_eq!(int(&json!("fast")), None);
        assert_eq!(int(&json!(null)), None);
        assert_eq!(int(&json!([1])), None);
    }

    #[test]
    fn text_renders_scalars_only() {
        assert_eq!(text(&json!("Mew")).as_deref(), Some("Mew"));
        assert_eq!(text(&json!(151)).as_deref(), Some("151"));
        assert_eq!(text(&json!(true)).as_deref(), Some("true"));
        assert_eq!(text(&json!(null)), None);
        assert_eq!(text(&json!({"a": 1})), None);
    }
}
